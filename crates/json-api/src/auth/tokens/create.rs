//! Issue Token Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{into_status_error, tokens::TokenResponse},
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
};

/// Issue Token Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct IssueTokenRequest {
    /// RFC 3339 expiry; tokens without one never expire
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Issued Token Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IssuedTokenResponse {
    /// The raw bearer token. It is only ever shown here.
    pub token: String,

    /// Stored token details
    pub metadata: TokenResponse,
}

/// Issue Token Handler
#[endpoint(
    tags("auth"),
    summary = "Issue API Token",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Token issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<IssueTokenRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> ApiResult<IssuedTokenResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let expires_at = json
        .into_inner()
        .expires_at
        .map(|value| value.parse::<Timestamp>())
        .transpose()
        .or_400("could not parse \"expires_at\"")?;

    let issued = state
        .app
        .auth
        .issue_api_token(principal.user_uuid, expires_at)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Envelope::ok(IssuedTokenResponse {
        token: issued.token,
        metadata: issued.metadata.into(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use emporium_app::auth::{AuthServiceError, IssuedApiToken, MockAuthService};

    use crate::{
        auth::tokens::tests::make_token,
        test_helpers::{Mocks, TEST_USER_UUID, customer, service_as},
    };

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        service_as(
            customer(),
            Mocks { auth, ..Mocks::default() },
            Router::with_path("auth/tokens").post(handler),
        )
    }

    #[tokio::test]
    async fn test_issue_returns_raw_token_once() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut auth = MockAuthService::new();

        auth.expect_issue_api_token()
            .once()
            .withf(|user, expires_at| *user == TEST_USER_UUID && expires_at.is_none())
            .return_once(move |_, _| {
                Ok(IssuedApiToken {
                    token: "em_v1_raw".to_string(),
                    metadata: make_token(uuid),
                })
            });

        let mut res = TestClient::post("http://example.com/auth/tokens")
            .json(&json!({}))
            .send(&make_service(auth))
            .await;

        let body: Envelope<IssuedTokenResponse> = res.take_json().await?;
        let issued = body.data.ok_or("missing data")?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(issued.token, "em_v1_raw");
        assert_eq!(issued.metadata.uuid, uuid);

        Ok(())
    }

    #[tokio::test]
    async fn test_issue_forwards_expiry() -> TestResult {
        let uuid = Uuid::now_v7();
        let expiry: Timestamp = "2030-01-01T00:00:00Z".parse()?;
        let mut auth = MockAuthService::new();

        auth.expect_issue_api_token()
            .once()
            .withf(move |_, expires_at| *expires_at == Some(expiry))
            .return_once(move |_, _| {
                Ok(IssuedApiToken {
                    token: "em_v1_raw".to_string(),
                    metadata: make_token(uuid),
                })
            });

        let res = TestClient::post("http://example.com/auth/tokens")
            .json(&json!({ "expires_at": "2030-01-01T00:00:00Z" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_unparseable_expiry_returns_400() -> TestResult {
        let res = TestClient::post("http://example.com/auth/tokens")
            .json(&json!({ "expires_at": "next tuesday" }))
            .send(&make_service(MockAuthService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_past_expiry_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_issue_api_token()
            .once()
            .return_once(|_, _| Err(AuthServiceError::InvalidExpiry));

        let res = TestClient::post("http://example.com/auth/tokens")
            .json(&json!({ "expires_at": "2001-01-01T00:00:00Z" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
