//! Emporium Domain Concerns

pub mod carts;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;
pub mod wishlists;
