use clap::Args;
use emporium_app::{auth::AuthService, domain::users::records::UserUuid};
use uuid::Uuid;

use super::{TokenStoreArgs, or, print_fields};

#[derive(Debug, Args)]
pub(crate) struct ListTokensArgs {
    #[command(flatten)]
    store: TokenStoreArgs,

    /// User UUID whose tokens should be listed
    #[arg(long)]
    user_uuid: Uuid,
}

pub(crate) async fn run(args: ListTokensArgs) -> Result<(), String> {
    let service = args.store.service().await?;

    let tokens = service
        .list_api_tokens(UserUuid::from_uuid(args.user_uuid))
        .await
        .map_err(|error| format!("failed to list tokens: {error}"))?;

    if tokens.is_empty() {
        println!("no tokens found for user {}", args.user_uuid);
    }

    for token in tokens {
        print_fields(&[
            ("token_uuid", token.uuid.to_string()),
            ("version", token.version.segment().to_string()),
            ("created_at", token.created_at.to_string()),
            ("last_used_at", or(token.last_used_at, "never")),
            ("expires_at", or(token.expires_at, "never")),
            ("revoked_at", or(token.revoked_at, "active")),
        ]);

        println!();
    }

    Ok(())
}
