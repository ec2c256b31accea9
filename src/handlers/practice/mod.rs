// Practice-scoped endpoints. Every handler here takes an AccessGrant, so
// the tenant guard has already run by the time any of this code executes.
pub mod badges;
pub mod dashboard;
pub mod team;
