//! User Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::{auth::MIN_PASSWORD_LEN, domain::users::UsersServiceError};

pub(crate) fn into_status_error(error: UsersServiceError) -> StatusError {
    match error {
        UsersServiceError::AlreadyExists => StatusError::conflict().brief("User already exists"),
        UsersServiceError::NotFound => StatusError::not_found().brief("User not found"),
        UsersServiceError::MissingRequiredData | UsersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid user payload")
        }
        UsersServiceError::WeakPassword => StatusError::bad_request().brief(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )),
        UsersServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid email or password")
        }
        UsersServiceError::Password(source) => {
            error!("password hashing error: {source}");

            StatusError::internal_server_error()
        }
        UsersServiceError::Sql(source) => {
            error!("users storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
