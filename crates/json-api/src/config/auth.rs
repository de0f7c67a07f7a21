//! Auth Config

use clap::Args;

/// API token verification settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Server-side pepper keying the stored API token verifiers
    #[arg(long, env = "AUTH_TOKEN_PEPPER", hide_env_values = true)]
    pub auth_token_pepper: String,
}
