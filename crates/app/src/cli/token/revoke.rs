use clap::Args;
use emporium_app::{
    auth::{AuthService, AuthServiceError},
    domain::users::records::UserUuid,
};
use uuid::Uuid;

use super::TokenStoreArgs;

#[derive(Debug, Args)]
pub(crate) struct RevokeTokenArgs {
    #[command(flatten)]
    store: TokenStoreArgs,

    /// User UUID that owns the token
    #[arg(long)]
    user_uuid: Uuid,

    /// Token UUID to revoke
    #[arg(long)]
    token_uuid: Uuid,
}

pub(crate) async fn run(args: RevokeTokenArgs) -> Result<(), String> {
    let service = args.store.service().await?;

    match service
        .revoke_api_token(UserUuid::from_uuid(args.user_uuid), args.token_uuid)
        .await
    {
        Ok(_) => println!("revoked token {}", args.token_uuid),
        Err(AuthServiceError::NotFound) => println!("token {} was not active", args.token_uuid),
        Err(error) => return Err(format!("failed to revoke token: {error}")),
    }

    Ok(())
}
