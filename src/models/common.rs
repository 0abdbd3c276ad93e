use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable error code carried in the `error` field of a failed
/// response envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
}
