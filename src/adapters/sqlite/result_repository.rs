//! SQLite implementation of the RaceResultRepository over `race_drivers`.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Driver, RaceResult, ResultWithDriver};
use crate::domain::ports::RaceResultRepository;

#[derive(Clone)]
pub struct SqliteRaceResultRepository {
    pool: SqlitePool,
}

impl SqliteRaceResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RaceResultRepository for SqliteRaceResultRepository {
    async fn race_results(&self, race_id: i64) -> DomainResult<Vec<RaceResult>> {
        let rows: Vec<ResultRow> = sqlx::query_as(
            r#"SELECT id, race_id, driver_id, final_position, grid_position, status
               FROM race_drivers
               WHERE race_id = ?
               ORDER BY final_position IS NULL, final_position, driver_id"#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RaceResult::from).collect())
    }

    async fn race_results_with_drivers(&self, race_id: i64) -> DomainResult<Vec<ResultWithDriver>> {
        let rows: Vec<ResultDriverRow> = sqlx::query_as(
            r#"SELECT rd.id, rd.race_id, rd.driver_id, rd.final_position, rd.grid_position, rd.status,
                      d.id AS d_id, d.driver_number AS d_driver_number, d.code AS d_code,
                      d.first_name AS d_first_name, d.last_name AS d_last_name, d.team AS d_team,
                      d.country AS d_country, d.created_at AS d_created_at, d.updated_at AS d_updated_at
               FROM race_drivers rd
               LEFT JOIN drivers d ON d.id = rd.driver_id
               WHERE rd.race_id = ?
               ORDER BY rd.final_position IS NULL, rd.final_position, rd.driver_id"#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResultWithDriver::try_from).collect()
    }

    async fn driver_results(&self, driver_id: i64) -> DomainResult<Vec<RaceResult>> {
        let rows: Vec<ResultRow> = sqlx::query_as(
            r#"SELECT id, race_id, driver_id, final_position, grid_position, status
               FROM race_drivers
               WHERE driver_id = ?
               ORDER BY race_id"#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RaceResult::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    id: i64,
    race_id: i64,
    driver_id: i64,
    final_position: Option<i64>,
    grid_position: Option<i64>,
    status: Option<String>,
}

impl From<ResultRow> for RaceResult {
    fn from(row: ResultRow) -> Self {
        RaceResult {
            id: row.id,
            race_id: row.race_id,
            driver_id: row.driver_id,
            final_position: row.final_position,
            grid_position: row.grid_position,
            status: row.status,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ResultDriverRow {
    #[sqlx(flatten)]
    result: ResultRow,
    d_id: Option<i64>,
    d_driver_number: Option<i64>,
    d_code: Option<String>,
    d_first_name: Option<String>,
    d_last_name: Option<String>,
    d_team: Option<String>,
    d_country: Option<String>,
    d_created_at: Option<String>,
    d_updated_at: Option<String>,
}

impl TryFrom<ResultDriverRow> for ResultWithDriver {
    type Error = crate::domain::errors::DomainError;

    fn try_from(row: ResultDriverRow) -> Result<Self, Self::Error> {
        let driver = match (row.d_id, row.d_created_at) {
            (Some(id), Some(created_at)) => Some(Driver {
                id,
                driver_number: row.d_driver_number.unwrap_or_default(),
                code: row.d_code.unwrap_or_default(),
                first_name: row.d_first_name.unwrap_or_default(),
                last_name: row.d_last_name.unwrap_or_default(),
                team: row.d_team.unwrap_or_default(),
                country: row.d_country,
                created_at: parse_datetime(&created_at)?,
                updated_at: parse_optional_datetime(row.d_updated_at)?,
            }),
            _ => None,
        };
        Ok(ResultWithDriver {
            result: row.result.into(),
            driver,
        })
    }
}
