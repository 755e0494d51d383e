//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity supports partial updates

pub mod chat_message;
pub mod monthly_report;
pub mod payment;
pub mod payment_code;
pub mod project;
pub mod quote;
pub mod review;
pub mod session;
pub mod subscription;
pub mod user;
