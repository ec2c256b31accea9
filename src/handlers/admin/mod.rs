// Super-admin surface. Tier is checked per request via RequireSuperAdmin;
// these routes are not practice-scoped and see soft-deleted tenants.
pub mod practices;
pub mod users;
