// Route handlers, grouped by required authorization:
// auth      - public login + session echo
// practice  - tenant-scoped, behind the AccessGrant guard
// admin     - super-admin only
pub mod admin;
pub mod auth;
pub mod practice;
