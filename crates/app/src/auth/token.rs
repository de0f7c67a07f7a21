//! Bearer token wire format.
//!
//! A token reads `em_v1_<token uuid>.<secret hex>`. The uuid locates the stored
//! row; the secret never leaves the caller, only its keyed verifier is kept.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::domain::users::records::UserUuid;

/// API token identifier prefix.
pub const API_TOKEN_PREFIX: &str = "em";

/// Number of secret bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    pub const CURRENT: Self = Self::V1;

    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

impl From<ApiTokenVersion> for i16 {
    fn from(value: ApiTokenVersion) -> Self {
        value.as_i16()
    }
}

/// Random token secret, wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiTokenSecret([u8; API_TOKEN_SECRET_BYTES]);

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self(bytes)
    }

    fn random() -> Self {
        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self(bytes)
    }

    fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

/// A bearer token as presented by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub uuid: Uuid,
    pub version: ApiTokenVersion,
    pub secret: ApiTokenSecret,
}

impl BearerToken {
    /// Mint a fresh token with a random secret.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            uuid: Uuid::now_v7(),
            version: ApiTokenVersion::CURRENT,
            secret: ApiTokenSecret::random(),
        }
    }

    /// HMAC input binding this token to its owner.
    ///
    /// Format: `{token_uuid}:{version}:{user_uuid}:{secret_hex}`, uuids in simple form.
    #[must_use]
    pub fn verifier_input(&self, owner: UserUuid) -> Vec<u8> {
        format!(
            "{}:{}:{}:{}",
            self.uuid.simple(),
            self.version.as_i16(),
            owner.into_uuid().simple(),
            self.secret.to_hex(),
        )
        .into_bytes()
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{API_TOKEN_PREFIX}_{}_{}.{}",
            self.version.segment(),
            self.uuid.simple(),
            self.secret.to_hex()
        )
    }
}

impl FromStr for BearerToken {
    type Err = ApiTokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (id, secret) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

        let rest = id
            .strip_prefix(API_TOKEN_PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or(ApiTokenError::InvalidFormat)?;

        let (version, uuid) = rest.split_once('_').ok_or(ApiTokenError::InvalidFormat)?;

        let version = match version {
            "v1" => ApiTokenVersion::V1,
            _ => return Err(ApiTokenError::UnsupportedVersion),
        };

        let uuid = Uuid::try_parse(uuid).map_err(|_| ApiTokenError::InvalidFormat)?;

        let secret: [u8; API_TOKEN_SECRET_BYTES] = hex::decode(secret)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(ApiTokenError::InvalidSecretEncoding)?;

        Ok(Self {
            uuid,
            version,
            secret: ApiTokenSecret::from_bytes(secret),
        })
    }
}
