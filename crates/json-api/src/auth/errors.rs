//! Auth Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::auth::AuthServiceError;

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::NotFound => StatusError::not_found().brief("Token not found"),
        AuthServiceError::InvalidExpiry => {
            StatusError::bad_request().brief("Token expiry must be in the future")
        }
        AuthServiceError::Sql(source) => {
            error!("auth storage error: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Token(source) => {
            error!("failed to process api token: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Verifier(source) => {
            error!("token verifier error: {source}");

            StatusError::internal_server_error()
        }
    }
}
