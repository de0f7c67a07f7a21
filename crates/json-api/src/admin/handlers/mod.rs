//! Admin Handlers

pub(crate) mod dashboard;
pub(crate) mod orders;
pub(crate) mod users;
