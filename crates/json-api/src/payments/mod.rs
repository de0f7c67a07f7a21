//! Payments

pub(crate) mod webhook;
