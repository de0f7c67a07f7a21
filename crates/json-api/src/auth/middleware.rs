//! Auth middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use emporium_app::auth::{AuthServiceError, Principal};

use crate::{extensions::*, state::State};

/// Resolve the bearer token to a [`Principal`] and inject it, or stop the chain.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match authenticate(req, depot).await {
        Ok(principal) => {
            depot.insert_principal(principal);
            ctrl.call_next(req, depot, res).await;
        }
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();
        }
    }
}

async fn authenticate(req: &Request, depot: &Depot) -> Result<Principal, StatusError> {
    let token = bearer_token(req)
        .ok_or_else(|| StatusError::unauthorized().brief("Not authorized, no token"))?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(into_status_error)
}

fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::NotFound | AuthServiceError::Token(_) => {
            StatusError::unauthorized().brief("Not authorized, token failed")
        }
        AuthServiceError::InvalidExpiry => {
            StatusError::unauthorized().brief("Not authorized, token expired")
        }
        AuthServiceError::Sql(source) => {
            error!("failed to validate api token: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Verifier(source) => {
            error!("token verifier error during authentication: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    let (scheme, token) = req
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_once(' ')?;

    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use emporium_app::{auth::MockAuthService, domain::users::records::Role};

    use crate::test_helpers::{Mocks, TEST_USER_UUID, storage_error};

    use super::*;

    #[salvo::handler]
    async fn echo_principal(depot: &mut Depot, res: &mut Response) {
        let principal = depot.principal_or_401().ok().map_or_else(
            || "missing".to_string(),
            |principal| format!("{}:{}", principal.user_uuid, principal.role),
        );

        res.render(principal);
    }

    fn make_service(auth: MockAuthService) -> Service {
        let state = Mocks {
            auth,
            ..Mocks::default()
        }
        .into_state();

        let router = Router::new()
            .hoop(inject(state))
            .hoop(handler)
            .push(Router::new().get(echo_principal));

        Service::new(router)
    }

    #[tokio::test]
    async fn unusable_authorization_headers_never_reach_the_service() -> TestResult {
        for header in [None, Some("Basic abc123"), Some("Bearer"), Some("Bearer    ")] {
            let mut auth = MockAuthService::new();

            auth.expect_authenticate_bearer().never();

            let mut request = TestClient::get("http://example.com");

            if let Some(value) = header {
                request = request.add_header(AUTHORIZATION, value, true);
            }

            let res = request.send(&make_service(auth)).await;

            assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED), "header {header:?}");
        }

        Ok(())
    }

    #[test]
    fn auth_errors_map_to_status_codes() {
        let cases: [(fn() -> AuthServiceError, StatusCode); 3] = [
            (|| AuthServiceError::NotFound, StatusCode::UNAUTHORIZED),
            (|| AuthServiceError::InvalidExpiry, StatusCode::UNAUTHORIZED),
            (|| AuthServiceError::Sql(storage_error()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (make_error, expected) in cases {
            assert_eq!(into_status_error(make_error()).code, expected);
        }
    }

    #[tokio::test]
    async fn scheme_is_case_insensitive() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "abc123")
            .return_once(|_| Ok(Principal::new(TEST_USER_UUID, Role::Admin)));

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "bearer abc123", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.take_string().await?, format!("{TEST_USER_UUID}:admin"));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_token_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "abc123")
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_storage_failure_returns_500() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::Sql(storage_error())));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }

    #[tokio::test]
    async fn test_valid_token_injects_principal() -> TestResult {
        let principal = Principal::new(TEST_USER_UUID, Role::User);

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "abc123")
            .return_once(move |_| Ok(principal));

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, format!("{TEST_USER_UUID}:user"));

        Ok(())
    }
}
