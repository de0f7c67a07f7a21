//! Payment gateway integration.

mod gateway;
mod stripe;
pub mod webhook;

pub use gateway::*;
pub use stripe::{StripeConfig, StripeGateway};
