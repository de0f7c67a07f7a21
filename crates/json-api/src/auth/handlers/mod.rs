//! Auth Handlers

pub(crate) mod login;
pub(crate) mod me;
pub(crate) mod register;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use crate::{auth::tokens::TokenResponse, users::UserResponse};

/// Session Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SessionResponse {
    pub user: UserResponse,

    /// Bearer token for the new session. It is only ever shown here.
    pub token: String,

    pub metadata: TokenResponse,
}
