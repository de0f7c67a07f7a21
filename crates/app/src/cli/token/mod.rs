use std::fmt::Display;

use clap::{Args, Subcommand};
use emporium_app::{
    auth::{PgAuthService, TokenVerifier},
    database,
};

mod create;
mod list;
mod revoke;

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    Create(create::CreateTokenArgs),
    List(list::ListTokensArgs),
    Revoke(revoke::RevokeTokenArgs),
}

/// Connection settings shared by every token command.
#[derive(Debug, Args)]
pub(crate) struct TokenStoreArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Server-side pepper keying the stored token verifiers
    #[arg(long, env = "AUTH_TOKEN_PEPPER", hide_env_values = true)]
    auth_token_pepper: String,
}

impl TokenStoreArgs {
    pub(crate) async fn service(self) -> Result<PgAuthService, String> {
        let verifier = TokenVerifier::new(self.auth_token_pepper.into_bytes())
            .map_err(|error| format!("invalid auth token pepper: {error}"))?;

        let pool = database::connect(&self.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        Ok(PgAuthService::new(pool, verifier))
    }
}

/// Print one aligned key and value per line.
fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    for (key, value) in fields {
        println!("{key:<width$}  {value}");
    }
}

fn or<T: Display>(value: Option<T>, fallback: &str) -> String {
    value.map_or_else(|| fallback.to_string(), |value| value.to_string())
}

pub(crate) async fn run(command: TokenCommand) -> Result<(), String> {
    match command.command {
        TokenSubcommand::Create(args) => create::run(args).await,
        TokenSubcommand::List(args) => list::run(args).await,
        TokenSubcommand::Revoke(args) => revoke::run(args).await,
    }
}
