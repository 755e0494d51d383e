//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Writes that also run inside a
//! transaction take any `PgExecutor` instead.

pub mod chat_message_repo;
pub mod monthly_report_repo;
pub mod payment_code_repo;
pub mod payment_repo;
pub mod project_repo;
pub mod quote_repo;
pub mod review_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod user_repo;

pub use chat_message_repo::ChatMessageRepo;
pub use monthly_report_repo::MonthlyReportRepo;
pub use payment_code_repo::PaymentCodeRepo;
pub use payment_repo::PaymentRepo;
pub use project_repo::ProjectRepo;
pub use quote_repo::QuoteRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_repo::UserRepo;
