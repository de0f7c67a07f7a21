//! Operator commands for provisioning users, tokens and the schema.

use clap::{Parser, Subcommand};

mod db;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "emporium-app", about = "Emporium CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create customer and admin accounts
    User(user::UserCommand),

    /// Issue, list and revoke API bearer tokens
    Token(token::TokenCommand),

    /// Apply database migrations
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommands_are_registered() {
        let command = Cli::command();
        let names: Vec<&str> = command.get_subcommands().map(|sub| sub.get_name()).collect();

        assert_eq!(names, ["user", "token", "db"]);
    }
}
