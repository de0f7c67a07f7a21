//! Authentication

mod errors;
mod handlers;
pub(crate) mod middleware;
pub(crate) mod tokens;

pub(crate) use errors::into_status_error;
pub(crate) use handlers::*;
