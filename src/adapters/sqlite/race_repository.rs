//! SQLite implementation of the RaceRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::circuit_repository::CircuitRow;
use super::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Circuit, NewRace, Race, RaceStatus, RaceWithCircuit, Season};
use crate::domain::ports::{RaceFilter, RaceRepository};

const RACE_COLUMNS: &str = "id, season, round, name, circuit_id, country, date, status, \
                            data_imported, imported_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteRaceRepository {
    pool: SqlitePool,
}

impl SqliteRaceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RaceRepository for SqliteRaceRepository {
    async fn create(&self, race: &NewRace) -> DomainResult<Race> {
        let id = sqlx::query(
            r#"INSERT INTO races (season, round, name, circuit_id, country, date, status, data_imported, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)"#,
        )
        .bind(race.season)
        .bind(race.round)
        .bind(&race.name)
        .bind(race.circuit_id)
        .bind(&race.country)
        .bind(race.date.to_rfc3339())
        .bind(race.status.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::RaceNotFound(id.to_string()))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Race>> {
        let row: Option<RaceRow> = sqlx::query_as(&format!("SELECT {RACE_COLUMNS} FROM races WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn get_with_circuit(&self, id: i64) -> DomainResult<Option<RaceWithCircuit>> {
        let Some(race) = self.get(id).await? else {
            return Ok(None);
        };

        let circuit_row: Option<CircuitRow> = sqlx::query_as(
            "SELECT id, name, country, length_km, turns, track_map_data, created_at, updated_at FROM circuits WHERE id = ?",
        )
        .bind(race.circuit_id)
        .fetch_optional(&self.pool)
        .await?;
        let circuit = circuit_row.map(Circuit::try_from).transpose()?;

        Ok(Some(RaceWithCircuit { race, circuit }))
    }

    async fn get_by_season_round(&self, season: i64, round: i64) -> DomainResult<Option<Race>> {
        let row: Option<RaceRow> = sqlx::query_as(&format!(
            "SELECT {RACE_COLUMNS} FROM races WHERE season = ? AND round = ?"
        ))
        .bind(season)
        .bind(round)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list(&self, filter: RaceFilter) -> DomainResult<Vec<Race>> {
        let mut query = format!("SELECT {RACE_COLUMNS} FROM races WHERE 1=1");

        if filter.season.is_some() {
            query.push_str(" AND season = ?");
        }
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filter.imported.is_some() {
            query.push_str(" AND data_imported = ?");
        }
        query.push_str(" ORDER BY season, round");
        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let mut q = sqlx::query_as::<_, RaceRow>(&query);
        if let Some(season) = filter.season {
            q = q.bind(season);
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(imported) = filter.imported {
            q = q.bind(imported);
        }

        let rows: Vec<RaceRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn mark_imported(&self, id: i64, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE races SET data_imported = 1, imported_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RaceNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn season_summaries(&self) -> DomainResult<Vec<Season>> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"SELECT season,
                      COUNT(*),
                      COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0)
               FROM races
               GROUP BY season
               ORDER BY season DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(year, total_races, completed_races)| Season {
                year,
                total_races,
                completed_races,
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct RaceRow {
    id: i64,
    season: i64,
    round: i64,
    name: String,
    circuit_id: i64,
    country: String,
    date: String,
    status: String,
    data_imported: bool,
    imported_at: Option<String>,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<RaceRow> for Race {
    type Error = DomainError;

    fn try_from(row: RaceRow) -> Result<Self, Self::Error> {
        let status = RaceStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid race status: {}", row.status)))?;

        Ok(Race {
            id: row.id,
            season: row.season,
            round: row.round,
            name: row.name,
            circuit_id: row.circuit_id,
            country: row.country,
            date: parse_datetime(&row.date)?,
            status,
            data_imported: row.data_imported,
            imported_at: parse_optional_datetime(row.imported_at)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}
