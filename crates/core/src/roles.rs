//! Well-known role names carried in access-token claims.
//!
//! Users do not have a role column; the role is derived from `is_admin`
//! (or the configured admin e-mail) when a token is issued.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";

/// Resolve the role name for a user row.
pub fn role_for(is_admin: bool, email: &str, admin_email: Option<&str>) -> &'static str {
    let is_configured_admin = admin_email.is_some_and(|a| a.eq_ignore_ascii_case(email));
    if is_admin || is_configured_admin {
        ROLE_ADMIN
    } else {
        ROLE_CLIENT
    }
}
