//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        ApiTokenMetadata, AuthServiceError, BearerToken, IssuedApiToken, NewApiToken, Principal,
        TokenVerifier, repository::PgAuthRepository,
    },
    domain::users::records::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
    verifier: TokenVerifier,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool, verifier: TokenVerifier) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
            verifier,
        }
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let presented = bearer_token
            .parse::<BearerToken>()
            .map_err(|_| AuthServiceError::NotFound)?;

        let stored = self
            .repository
            .find_active_api_token(presented.uuid, presented.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if stored.version != presented.version {
            return Err(AuthServiceError::NotFound);
        }

        let verifier_input = presented.verifier_input(stored.user_uuid);

        if !self.verifier.verify(&verifier_input, &stored.token_hash)? {
            return Err(AuthServiceError::NotFound);
        }

        // Auth success does not depend on this write.
        if let Err(error) = self
            .repository
            .touch_api_token_last_used(presented.uuid)
            .await
        {
            warn!(error = %error, "failed to record api token use");
        }

        Ok(Principal::new(stored.user_uuid, stored.role))
    }

    #[tracing::instrument(
        name = "auth.service.issue_api_token",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn issue_api_token(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        if expires_at.is_some_and(|expires_at| expires_at <= Timestamp::now()) {
            return Err(AuthServiceError::InvalidExpiry);
        }

        let minted = BearerToken::generate();
        let token_hash = self.verifier.sign(&minted.verifier_input(user))?;

        let metadata = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: minted.uuid,
                user_uuid: user,
                version: minted.version,
                token_hash,
                expires_at,
            })
            .await?;

        info!(token_uuid = %metadata.uuid, "issued api token");

        Ok(IssuedApiToken {
            token: minted.to_string(),
            metadata,
        })
    }

    async fn list_api_tokens(
        &self,
        user: UserUuid,
    ) -> Result<Vec<ApiTokenMetadata>, AuthServiceError> {
        Ok(self.repository.list_api_tokens_by_user(user).await?)
    }

    #[tracing::instrument(
        name = "auth.service.revoke_api_token",
        skip(self),
        fields(user_uuid = %user, token_uuid = %token),
        err
    )]
    async fn revoke_api_token(
        &self,
        user: UserUuid,
        token: Uuid,
    ) -> Result<ApiTokenMetadata, AuthServiceError> {
        self.repository
            .revoke_api_token(user, token)
            .await?
            .ok_or(AuthServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the principal it was issued for.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;

    /// Issue a new API token for the given user. The raw token is only returned here.
    async fn issue_api_token(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError>;

    /// List all tokens owned by the given user, newest first.
    async fn list_api_tokens(&self, user: UserUuid)
    -> Result<Vec<ApiTokenMetadata>, AuthServiceError>;

    /// Revoke one of the user's active tokens.
    async fn revoke_api_token(
        &self,
        user: UserUuid,
        token: Uuid,
    ) -> Result<ApiTokenMetadata, AuthServiceError>;
}
