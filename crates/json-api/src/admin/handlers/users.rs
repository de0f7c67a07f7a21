//! Admin List Users Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
    users::{self, UserResponse},
};

/// Admin List Users Handler
#[endpoint(
    tags("admin"),
    summary = "List Users",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Users"),
        (status_code = StatusCode::FORBIDDEN, description = "Not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<Vec<UserResponse>> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;

    let users = state
        .app
        .users
        .list_users(admin)
        .await
        .map_err(users::into_status_error)?;

    Ok(Envelope::ok(users.into_iter().map(Into::into).collect()))
}
