//! SQLite implementation of the UserRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewUser, User};
use crate::domain::ports::UserRepository;

const USER_COLUMNS: &str = "id, email, hashed_password, first_name, last_name, display_name, country, \
                            favorite_f1_team, is_active, is_superuser, tier, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &NewUser) -> DomainResult<User> {
        let id = sqlx::query(
            r#"INSERT INTO users (email, hashed_password, first_name, last_name, is_active, is_superuser, tier, created_at)
               VALUES (?, ?, ?, ?, 1, 0, ?, ?)"#,
        )
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.tier)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.try_into()).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    hashed_password: String,
    first_name: Option<String>,
    last_name: Option<String>,
    display_name: Option<String>,
    country: Option<String>,
    favorite_f1_team: Option<String>,
    is_active: bool,
    is_superuser: bool,
    tier: String,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            hashed_password: row.hashed_password,
            first_name: row.first_name,
            last_name: row.last_name,
            display_name: row.display_name,
            country: row.country,
            favorite_f1_team: row.favorite_f1_team,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            tier: row.tier,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}
