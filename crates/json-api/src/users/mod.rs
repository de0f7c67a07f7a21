//! Users

mod errors;
mod models;

pub(crate) use errors::into_status_error;
pub(crate) use models::UserResponse;
