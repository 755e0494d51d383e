//! Small acknowledgement bodies shared by several handlers.
//!
//! Resource endpoints return the resource itself as JSON; these types cover
//! the endpoints that only confirm an action.

use serde::Serialize;

/// `{ "success": true }`, returned by logout and by deletes that report success.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// `{ "received": true }`, the webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct ReceivedResponse {
    pub received: bool,
}
