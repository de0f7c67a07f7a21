//! Healthcheck Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::envelope::{ApiResult, Envelope};

/// Liveness payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HealthResponse {
    pub status: String,
    /// Crate version of the running server
    pub version: String,
}

/// Liveness probe. Does not touch the database.
#[endpoint(
    tags("health"),
    summary = "Health check endpoint",
    responses((status_code = StatusCode::OK, description = "Server is up"))
)]
pub(crate) async fn handler() -> ApiResult<HealthResponse> {
    Ok(Envelope::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
