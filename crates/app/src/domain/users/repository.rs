//! Users Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::users::{
    data::NewUser,
    records::{Role, UserRecord, UserUuid},
};

const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const LIST_USERS_SQL: &str = include_str!("sql/list_users.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const REGISTER_USER_SQL: &str = include_str!("sql/register_user.sql");
const FIND_CREDENTIALS_SQL: &str = include_str!("sql/find_credentials.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn get_user(&self, user: UserUuid) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn list_users(&self) -> Result<Vec<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(LIST_USERS_SQL)
            .fetch_all(&self.pool)
            .await
    }

    pub(crate) async fn create_user(&self, user: &NewUser) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.name.trim())
            .bind(user.email.trim())
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn register_user(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(REGISTER_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.name.trim())
            .bind(user.email.trim())
            .bind(user.role.as_str())
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
    }

    /// The user with this email and their password hash, if one was ever set.
    pub(crate) async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(UserRecord, Option<String>)>, sqlx::Error> {
        let Some(row) = query(FIND_CREDENTIALS_SQL)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some((UserRecord::from_row(&row)?, row.try_get("password_hash")?)))
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: try_get_role(row, "role")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

pub(crate) fn try_get_role(row: &PgRow, col: &str) -> Result<Role, sqlx::Error> {
    let role: String = row.try_get(col)?;

    role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
