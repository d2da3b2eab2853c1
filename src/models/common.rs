use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload inside the `{success: false, error: {...}}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
