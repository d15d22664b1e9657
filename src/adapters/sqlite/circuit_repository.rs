//! SQLite implementation of the CircuitRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Circuit, NewCircuit};
use crate::domain::ports::CircuitRepository;

const CIRCUIT_COLUMNS: &str =
    "id, name, country, length_km, turns, track_map_data, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteCircuitRepository {
    pool: SqlitePool,
}

impl SqliteCircuitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CircuitRepository for SqliteCircuitRepository {
    async fn create(&self, circuit: &NewCircuit) -> DomainResult<Circuit> {
        let id = sqlx::query(
            r#"INSERT INTO circuits (name, country, length_km, turns, track_map_data, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&circuit.name)
        .bind(&circuit.country)
        .bind(circuit.length_km)
        .bind(circuit.turns)
        .bind(&circuit.track_map_data)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::CircuitNotFound(id.to_string()))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Circuit>> {
        let row: Option<CircuitRow> =
            sqlx::query_as(&format!("SELECT {CIRCUIT_COLUMNS} FROM circuits WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn get_by_name(&self, name: &str) -> DomainResult<Option<Circuit>> {
        let row: Option<CircuitRow> =
            sqlx::query_as(&format!("SELECT {CIRCUIT_COLUMNS} FROM circuits WHERE name = ?"))
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Circuit>> {
        let rows: Vec<CircuitRow> =
            sqlx::query_as(&format!("SELECT {CIRCUIT_COLUMNS} FROM circuits ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<Circuit>> {
        let rows: Vec<CircuitRow> = sqlx::query_as(&format!(
            "SELECT {CIRCUIT_COLUMNS} FROM circuits WHERE country = ? COLLATE NOCASE ORDER BY name"
        ))
        .bind(country)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CircuitRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) country: String,
    pub(crate) length_km: f64,
    pub(crate) turns: i64,
    pub(crate) track_map_data: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: Option<String>,
}

impl TryFrom<CircuitRow> for Circuit {
    type Error = DomainError;

    fn try_from(row: CircuitRow) -> Result<Self, Self::Error> {
        Ok(Circuit {
            id: row.id,
            name: row.name,
            country: row.country,
            length_km: row.length_km,
            turns: row.turns,
            track_map_data: row.track_map_data,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteCircuitRepository {
        SqliteCircuitRepository::new(create_migrated_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_get_circuit() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&NewCircuit::new("Bahrain International Circuit", "Bahrain", 5.412, 15))
            .await
            .unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Bahrain International Circuit");
        assert_eq!(fetched.turns, 15);
        assert!(fetched.updated_at.is_none());

        let by_name = repo.get_by_name("Bahrain International Circuit").await.unwrap();
        assert_eq!(by_name.map(|c| c.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let repo = setup_test_repo().await;
        let circuit = NewCircuit::new("Albert Park Circuit", "Australia", 5.278, 14);
        repo.create(&circuit).await.unwrap();

        let err = repo.create(&circuit).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_by_country_ignores_case() {
        let repo = setup_test_repo().await;
        repo.create(&NewCircuit::new("Jeddah Corniche Circuit", "Saudi Arabia", 6.174, 27))
            .await
            .unwrap();
        repo.create(&NewCircuit::new("Suzuka Circuit", "Japan", 5.807, 18))
            .await
            .unwrap();

        let saudi = repo.list_by_country("saudi arabia").await.unwrap();
        assert_eq!(saudi.len(), 1);
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
