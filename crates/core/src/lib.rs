//! Domain logic for the agency site backend.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates load rows and hand plain facts to the functions here.

pub mod chatbot;
pub mod error;
pub mod money;
pub mod payment;
pub mod payment_code;
pub mod quote;
pub mod report;
pub mod roles;
pub mod stats;
pub mod subscription;
pub mod types;
pub mod validation;
