//! Users service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::{
    auth::{AdminCapability, MIN_PASSWORD_LEN, hash_password, verify_password},
    domain::users::{
        data::{NewUser, Registration},
        errors::UsersServiceError,
        records::{Role, UserRecord, UserUuid},
        repository::PgUsersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgUsersRepository::new(pool),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    #[tracing::instrument(
        name = "users.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid, role = %user.role),
        err
    )]
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        if user.name.trim().is_empty() || user.email.trim().is_empty() {
            return Err(UsersServiceError::MissingRequiredData);
        }

        let created = self.repository.create_user(&user).await?;

        info!(user_uuid = %created.uuid, "created user");

        Ok(created)
    }

    #[tracing::instrument(name = "users.service.register", skip(self, registration), err)]
    async fn register(&self, registration: Registration) -> Result<UserRecord, UsersServiceError> {
        let Registration {
            name,
            email,
            password,
        } = registration;

        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(UsersServiceError::MissingRequiredData);
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UsersServiceError::WeakPassword);
        }

        let password_hash = hash_password(password).await?;

        let user = NewUser {
            uuid: UserUuid::new(),
            name,
            email,
            role: Role::User,
        };

        let created = self.repository.register_user(&user, &password_hash).await?;

        info!(user_uuid = %created.uuid, "registered user");

        Ok(created)
    }

    #[tracing::instrument(name = "users.service.authenticate", skip_all, err)]
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, UsersServiceError> {
        // Users created without a password cannot log in with one.
        let Some((user, Some(password_hash))) = self.repository.find_credentials(email).await?
        else {
            return Err(UsersServiceError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), password_hash).await? {
            return Err(UsersServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        Ok(self.repository.get_user(user).await?)
    }

    async fn list_users(&self, _admin: AdminCapability) -> Result<Vec<UserRecord>, UsersServiceError> {
        Ok(self.repository.list_users().await?)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Creates a new user.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Register a customer with a password.
    async fn register(&self, registration: Registration) -> Result<UserRecord, UsersServiceError>;

    /// The user whose email and password match.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Lists every user, newest first.
    async fn list_users(&self, admin: AdminCapability) -> Result<Vec<UserRecord>, UsersServiceError>;
}
