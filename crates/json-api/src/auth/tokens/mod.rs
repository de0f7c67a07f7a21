//! API Token Handlers

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod index;

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::auth::ApiTokenMetadata;

/// API Token Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TokenResponse {
    /// The unique identifier of the token
    pub uuid: Uuid,

    /// Token format version
    pub version: String,

    pub created_at: String,

    pub last_used_at: Option<String>,

    pub expires_at: Option<String>,

    pub revoked_at: Option<String>,
}

impl From<ApiTokenMetadata> for TokenResponse {
    fn from(token: ApiTokenMetadata) -> Self {
        TokenResponse {
            uuid: token.uuid,
            version: token.version.segment().to_string(),
            created_at: token.created_at.to_string(),
            last_used_at: token.last_used_at.as_ref().map(ToString::to_string),
            expires_at: token.expires_at.as_ref().map(ToString::to_string),
            revoked_at: token.revoked_at.as_ref().map(ToString::to_string),
        }
    }
}
