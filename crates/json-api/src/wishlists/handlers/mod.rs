//! Wishlist Handlers

pub(crate) mod clear;
pub(crate) mod contains;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod index;
