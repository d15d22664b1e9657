//! SQLite implementation of the DriverRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Driver, NewDriver};
use crate::domain::ports::DriverRepository;

const DRIVER_COLUMNS: &str =
    "id, driver_number, code, first_name, last_name, team, country, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteDriverRepository {
    pool: SqlitePool,
}

impl SqliteDriverRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl DriverRepository for SqliteDriverRepository {
    async fn create(&self, driver: &NewDriver) -> DomainResult<Driver> {
        driver.validate().map_err(DomainError::ValidationFailed)?;

        let id = sqlx::query(
            r#"INSERT INTO drivers (driver_number, code, first_name, last_name, team, country, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(driver.driver_number)
        .bind(&driver.code)
        .bind(&driver.first_name)
        .bind(&driver.last_name)
        .bind(&driver.team)
        .bind(&driver.country)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::DriverNotFound(id.to_string()))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Driver>> {
        let row: Option<DriverRow> = sqlx::query_as(&format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn get_by_number(&self, number: i64) -> DomainResult<Option<Driver>> {
        let row: Option<DriverRow> =
            sqlx::query_as(&format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE driver_number = ?"))
                .bind(number)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn get_by_code(&self, code: &str) -> DomainResult<Option<Driver>> {
        let row: Option<DriverRow> = sqlx::query_as(&format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE code = ?"))
            .bind(code.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list(&self, limit: Option<u32>) -> DomainResult<Vec<Driver>> {
        let mut query = format!("SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY driver_number");
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let rows: Vec<DriverRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn list_by_team(&self, team: &str) -> DomainResult<Vec<Driver>> {
        let rows: Vec<DriverRow> = sqlx::query_as(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE team = ? COLLATE NOCASE ORDER BY driver_number"
        ))
        .bind(team)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn search(&self, query: &str, limit: u32) -> DomainResult<Vec<Driver>> {
        let pattern = like_pattern(query.trim());
        let rows: Vec<DriverRow> = sqlx::query_as(&format!(
            r#"SELECT {DRIVER_COLUMNS} FROM drivers
               WHERE first_name LIKE ?1 ESCAPE '\' OR last_name LIKE ?1 ESCAPE '\' OR code LIKE ?1 ESCAPE '\'
               ORDER BY driver_number
               LIMIT ?2"#
        ))
        .bind(&pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: i64,
    driver_number: i64,
    code: String,
    first_name: String,
    last_name: String,
    team: String,
    country: Option<String>,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = DomainError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        Ok(Driver {
            id: row.id,
            driver_number: row.driver_number,
            code: row.code,
            first_name: row.first_name,
            last_name: row.last_name,
            team: row.team,
            country: row.country,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteDriverRepository {
        let repo = SqliteDriverRepository::new(create_migrated_test_pool().await.unwrap());
        for driver in [
            NewDriver::new(1, "VER", "Max", "Verstappen", "Red Bull Racing").with_country("Netherlands"),
            NewDriver::new(11, "PER", "Sergio", "Perez", "Red Bull Racing"),
            NewDriver::new(16, "LEC", "Charles", "Leclerc", "Ferrari"),
            NewDriver::new(44, "HAM", "Lewis", "Hamilton", "Mercedes"),
        ] {
            repo.create(&driver).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_lookup_by_code_is_case_insensitive() {
        let repo = setup_test_repo().await;
        let driver = repo.get_by_code("ver").await.unwrap().unwrap();
        assert_eq!(driver.full_name(), "Max Verstappen");
        assert_eq!(driver.country.as_deref(), Some("Netherlands"));

        let by_number = repo.get_by_number(44).await.unwrap().unwrap();
        assert_eq!(by_number.code, "HAM");
        assert!(repo.get_by_code("XXX").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_number_is_conflict() {
        let repo = setup_test_repo().await;
        let err = repo
            .create(&NewDriver::new(1, "BOT", "Valtteri", "Bottas", "Sauber"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_code_is_rejected() {
        let repo = setup_test_repo().await;
        let err = repo
            .create(&NewDriver::new(77, "BOTT", "Valtteri", "Bottas", "Sauber"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_search_matches_names_and_code() {
        let repo = setup_test_repo().await;

        let by_last = repo.search("verst", 10).await.unwrap();
        assert_eq!(by_last.len(), 1);

        let by_code = repo.search("lec", 10).await.unwrap();
        assert_eq!(by_code[0].last_name, "Leclerc");

        let limited = repo.search("e", 2).await.unwrap();
        assert_eq!(limited.len(), 2);

        let wildcard = repo.search("%", 10).await.unwrap();
        assert!(wildcard.is_empty());
    }

    #[tokio::test]
    async fn test_list_and_team() {
        let repo = setup_test_repo().await;
        let all = repo.list(None).await.unwrap();
        let numbers: Vec<i64> = all.iter().map(|d| d.driver_number).collect();
        assert_eq!(numbers, vec![1, 11, 16, 44]);

        assert_eq!(repo.list(Some(2)).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_team("red bull racing").await.unwrap().len(), 2);
    }
}
