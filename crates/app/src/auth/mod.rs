//! Authentication

mod errors;
mod models;
mod password;
mod principal;
mod repository;
mod service;
mod token;
mod verifier;

pub use errors::*;
pub use models::*;
pub use password::{MIN_PASSWORD_LEN, PasswordError, hash_password, verify_password};
pub use principal::{AdminCapability, Principal};
pub use service::*;
pub use token::*;
pub use verifier::{TokenVerifier, TokenVerifierError};
