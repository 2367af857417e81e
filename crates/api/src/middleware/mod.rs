//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`]: the `admin` role.
//! - [`rbac::RequireUnrestricted`]: any role in the configured unrestricted group.
//! - [`rbac::RequireTimetableManager`]: `admin`, `hod` or `principal`.

pub mod auth;
pub mod rbac;
