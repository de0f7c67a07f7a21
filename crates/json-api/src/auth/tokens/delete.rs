//! Revoke Token Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    auth::{into_status_error, tokens::TokenResponse},
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
};

/// Revoke Token Handler
#[endpoint(
    tags("auth"),
    summary = "Revoke API Token",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Token revoked"),
        (status_code = StatusCode::NOT_FOUND, description = "Token not found or already revoked"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(token: PathParam<Uuid>, depot: &mut Depot) -> ApiResult<TokenResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let revoked = state
        .app
        .auth
        .revoke_api_token(principal.user_uuid, token.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(revoked.into()))
}
