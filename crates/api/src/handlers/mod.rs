pub mod admin;
pub mod auth;
pub mod chat;
pub mod checkout;
pub mod payment_code;
pub mod profile;
pub mod project;
pub mod quote;
pub mod review;
