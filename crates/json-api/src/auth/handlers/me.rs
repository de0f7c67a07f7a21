//! Current User Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiResult, Envelope},
    extensions::*,
    state::State,
    users::{UserResponse, into_status_error},
};

/// Current User Handler
///
/// Returns the user the bearer token was issued for.
#[endpoint(
    tags("auth"),
    summary = "Current User",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> ApiResult<UserResponse> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let user = state
        .app
        .users
        .get_user(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Envelope::ok(user.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::users::{
        MockUsersService, UsersServiceError,
        records::{Role, UserRecord},
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, anonymous_service, customer, service_as};

    use super::*;

    fn route() -> Router {
        Router::with_path("auth/me").get(handler)
    }

    #[tokio::test]
    async fn test_me_returns_current_user() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_get_user()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|uuid| {
                Ok(UserRecord {
                    uuid,
                    name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    role: Role::User,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::get("http://example.com/auth/me")
            .send(&service_as(customer(), Mocks { users, ..Mocks::default() }, route()))
            .await;

        let body: Envelope<UserResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success);
        assert_eq!(
            body.data.map(|user| (user.email, user.role)),
            Some(("ada@example.com".to_string(), "user".to_string()))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_me_for_deleted_user_returns_404() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_get_user()
            .once()
            .return_once(|_| Err(UsersServiceError::NotFound));

        let res = TestClient::get("http://example.com/auth/me")
            .send(&service_as(customer(), Mocks { users, ..Mocks::default() }, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_me_without_principal_returns_401() -> TestResult {
        let res = TestClient::get("http://example.com/auth/me")
            .send(&anonymous_service(Mocks::default(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
