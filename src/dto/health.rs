use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/health` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status (always "healthy" while the process serves requests).
    pub status: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}
