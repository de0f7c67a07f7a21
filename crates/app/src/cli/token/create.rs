use clap::Args;
use emporium_app::{auth::AuthService, domain::users::records::UserUuid};
use jiff::Timestamp;
use uuid::Uuid;

use super::{TokenStoreArgs, or, print_fields};

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    #[command(flatten)]
    store: TokenStoreArgs,

    /// User UUID that should own the token
    #[arg(long)]
    user_uuid: Uuid,

    /// Optional expiry as an RFC 3339 timestamp, e.g. 2027-01-01T00:00:00Z
    #[arg(long)]
    expires_at: Option<Timestamp>,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    if args.expires_at.is_some_and(|expires_at| expires_at <= Timestamp::now()) {
        return Err("--expires-at must be in the future".to_string());
    }

    let service = args.store.service().await?;

    let issued = service
        .issue_api_token(UserUuid::from_uuid(args.user_uuid), args.expires_at)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    print_fields(&[
        ("token_uuid", issued.metadata.uuid.to_string()),
        ("user_uuid", issued.metadata.user_uuid.to_string()),
        ("created_at", issued.metadata.created_at.to_string()),
        ("expires_at", or(issued.metadata.expires_at, "never")),
        ("api_token", issued.token),
    ]);

    println!("store this token now; it is only shown once");

    Ok(())
}
