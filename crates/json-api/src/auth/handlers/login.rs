//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{self, SessionResponse},
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
    users,
};

/// Login Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login Handler
///
/// Exchanges an email and password for a new bearer token.
#[endpoint(
    tags("auth"),
    summary = "Login",
    responses(
        (status_code = StatusCode::OK, description = "Signed in"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid email or password"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> ApiResult<SessionResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let LoginRequest { email, password } = json.into_inner();

    let user = state
        .app
        .users
        .authenticate(&email, &password)
        .await
        .map_err(users::into_status_error)?;

    let issued = state
        .app
        .auth
        .issue_api_token(user.uuid, None)
        .await
        .map_err(auth::into_status_error)?;

    Ok(Envelope::ok(SessionResponse {
        user: user.into(),
        token: issued.token,
        metadata: issued.metadata.into(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use emporium_app::{
        auth::{IssuedApiToken, MockAuthService},
        domain::users::{
            MockUsersService, UsersServiceError,
            records::{Role, UserRecord},
        },
    };

    use crate::{
        auth::tokens::tests::make_token,
        test_helpers::{Mocks, TEST_USER_UUID, anonymous_service},
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        anonymous_service(mocks, Router::with_path("auth/login").post(handler))
    }

    #[tokio::test]
    async fn test_login_issues_a_token() -> TestResult {
        let mut users = MockUsersService::new();
        let mut auth = MockAuthService::new();

        users
            .expect_authenticate()
            .once()
            .withf(|email, password| email == "ada@example.com" && password == "engine-1843")
            .return_once(|email, _| {
                Ok(UserRecord {
                    uuid: TEST_USER_UUID,
                    name: "Ada Lovelace".to_string(),
                    email: email.to_string(),
                    role: Role::User,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        auth.expect_issue_api_token()
            .once()
            .withf(|user, _| *user == TEST_USER_UUID)
            .return_once(|_, _| {
                Ok(IssuedApiToken {
                    token: "em_v1_login".to_string(),
                    metadata: make_token(Uuid::now_v7()),
                })
            });

        let mut res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "engine-1843" }))
            .send(&make_service(Mocks { users, auth, ..Mocks::default() }))
            .await;

        let session: Envelope<SessionResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(session.data.map(|session| session.token).as_deref(), Some("em_v1_login"));

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_credentials_return_401() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_authenticate()
            .once()
            .return_once(|_, _| Err(UsersServiceError::InvalidCredentials));

        let res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "wrong" }))
            .send(&make_service(Mocks { users, ..Mocks::default() }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
