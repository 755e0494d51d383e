//! Authentication primitives.
//!
//! - [`jwt`] -- access tokens, OAuth state tokens and refresh-token helpers.
//! - [`google`] -- Google OAuth configuration and code exchange.

pub mod google;
pub mod jwt;
