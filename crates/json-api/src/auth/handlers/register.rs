//! Register Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use emporium_app::domain::users::data::Registration;

use crate::{
    auth::{self, SessionResponse},
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
    users,
};

/// Register Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Register Handler
///
/// Creates a customer account and signs it in.
#[endpoint(
    tags("auth"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "Account created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing fields or password too short"),
        (status_code = StatusCode::CONFLICT, description = "Email already registered"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> ApiResult<SessionResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let RegisterRequest {
        name,
        email,
        password,
    } = json.into_inner();

    let user = state
        .app
        .users
        .register(Registration {
            name,
            email,
            password,
        })
        .await
        .map_err(users::into_status_error)?;

    let issued = state
        .app
        .auth
        .issue_api_token(user.uuid, None)
        .await
        .map_err(auth::into_status_error)?;

    res.status_code(StatusCode::CREATED);

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
        anonymous_service(mocks, Router::with_path("auth/register").post(handler))
    }

    fn body() -> serde_json::Value {
        json!({ "name": "Grace", "email": "grace@example.com", "password": "hopper-1906" })
    }

    #[tokio::test]
    async fn test_register_signs_the_new_user_in() -> TestResult {
        let token_uuid = Uuid::now_v7();
        let mut users = MockUsersService::new();
        let mut auth = MockAuthService::new();

        users
            .expect_register()
            .once()
            .withf(|registration| {
                registration.email == "grace@example.com" && registration.password == "hopper-1906"
            })
            .return_once(|registration| {
                Ok(UserRecord {
                    uuid: TEST_USER_UUID,
                    name: registration.name,
                    email: registration.email,
                    role: Role::User,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        auth.expect_issue_api_token()
            .once()
            .withf(|user, expires_at| *user == TEST_USER_UUID && expires_at.is_none())
            .return_once(move |_, _| {
                Ok(IssuedApiToken {
                    token: "em_v1_session".to_string(),
                    metadata: make_token(token_uuid),
                })
            });

        let mut res = TestClient::post("http://example.com/auth/register")
            .json(&body())
            .send(&make_service(Mocks { users, auth, ..Mocks::default() }))
            .await;

        let session: Envelope<SessionResponse> = res.take_json().await?;
        let session = session.data.ok_or("missing data")?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(session.token, "em_v1_session");
        assert_eq!(session.user.role, "user");
        assert_eq!(session.metadata.uuid, token_uuid);

        Ok(())
    }

    #[tokio::test]
    async fn test_short_password_returns_400() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_register()
            .once()
            .return_once(|_| Err(UsersServiceError::WeakPassword));

        let res = TestClient::post("http://example.com/auth/register")
            .json(&body())
            .send(&make_service(Mocks { users, ..Mocks::default() }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_taken_email_returns_409() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_register()
            .once()
            .return_once(|_| Err(UsersServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/auth/register")
            .json(&body())
            .send(&make_service(Mocks { users, ..Mocks::default() }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
