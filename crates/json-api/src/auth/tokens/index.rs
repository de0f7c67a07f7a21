//! Token Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{into_status_error, tokens::TokenResponse},
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
};

/// Token Index Handler
///
/// Lists the caller's API tokens, newest first.
#[endpoint(
    tags("auth"),
    summary = "List API Tokens",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<Vec<TokenResponse>> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let tokens = state
        .app
        .auth
        .list_api_tokens(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(tokens.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use uuid::Uuid;

    use emporium_app::auth::MockAuthService;

    use crate::{
        auth::tokens::tests::make_token,
        test_helpers::{Mocks, TEST_USER_UUID, customer, service_as},
    };

    use super::*;

    #[tokio::test]
    async fn test_index_lists_own_tokens() -> TestResult {
        let uuid = Uuid::now_v7();
        let mut auth = MockAuthService::new();

        auth.expect_list_api_tokens()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(vec![make_token(uuid)]));

        let body: Envelope<Vec<TokenResponse>> = TestClient::get("http://example.com/auth/tokens")
            .send(&service_as(
                customer(),
                Mocks { auth, ..Mocks::default() },
                Router::with_path("auth/tokens").get(handler),
            ))
            .await
            .take_json()
            .await?;

        let tokens = body.data.unwrap_or_default();

        assert_eq!(tokens.len(), 1, "expected one token");
        assert_eq!(tokens[0].uuid, uuid);
        assert_eq!(tokens[0].version, "v1");

        Ok(())
    }
}
