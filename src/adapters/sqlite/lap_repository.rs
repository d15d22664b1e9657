//! SQLite implementation of the LapRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime, push_int_filters};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LapData, SectorTimes, TireCompound};
use crate::domain::ports::LapRepository;

const LAP_COLUMNS: &str = "id, race_id, driver_id, lap_number, position, lap_time_seconds, \
                           sector1_time, sector2_time, sector3_time, tire_compound, tire_age, \
                           gap_to_leader, gap_to_ahead, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteLapRepository {
    pool: SqlitePool,
}

impl SqliteLapRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LapRepository for SqliteLapRepository {
    async fn race_laps(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<LapData>> {
        let mut query = format!("SELECT {LAP_COLUMNS} FROM lap_data WHERE race_id = ?");
        let bindings = push_int_filters(&mut query, &[("driver_id", driver_id)]);
        query.push_str(" ORDER BY driver_id, lap_number");

        let mut q = sqlx::query_as::<_, LapRow>(&query).bind(race_id);
        for binding in bindings {
            q = q.bind(binding);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn driver_laps(&self, race_id: i64, driver_id: i64) -> DomainResult<Vec<LapData>> {
        let rows: Vec<LapRow> = sqlx::query_as(&format!(
            "SELECT {LAP_COLUMNS} FROM lap_data WHERE race_id = ? AND driver_id = ? ORDER BY lap_number"
        ))
        .bind(race_id)
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn fastest_lap(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Option<LapData>> {
        let mut query = format!("SELECT {LAP_COLUMNS} FROM lap_data WHERE race_id = ? AND lap_time_seconds > 0");
        let bindings = push_int_filters(&mut query, &[("driver_id", driver_id)]);
        query.push_str(" ORDER BY lap_time_seconds, lap_number LIMIT 1");

        let mut q = sqlx::query_as::<_, LapRow>(&query).bind(race_id);
        for binding in bindings {
            q = q.bind(binding);
        }

        let row = q.fetch_optional(&self.pool).await?;
        row.map(|r| r.try_into()).transpose()
    }

    async fn lap_by_number(&self, race_id: i64, driver_id: i64, lap_number: i64) -> DomainResult<Option<LapData>> {
        let row: Option<LapRow> = sqlx::query_as(&format!(
            "SELECT {LAP_COLUMNS} FROM lap_data WHERE race_id = ? AND driver_id = ? AND lap_number = ?"
        ))
        .bind(race_id)
        .bind(driver_id)
        .bind(lap_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn count_for_race(&self, race_id: i64) -> DomainResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lap_data WHERE race_id = ?")
            .bind(race_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct LapRow {
    id: i64,
    race_id: i64,
    driver_id: i64,
    lap_number: i64,
    position: i64,
    lap_time_seconds: f64,
    sector1_time: f64,
    sector2_time: f64,
    sector3_time: f64,
    tire_compound: String,
    tire_age: i64,
    gap_to_leader: Option<f64>,
    gap_to_ahead: Option<f64>,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<LapRow> for LapData {
    type Error = DomainError;

    fn try_from(row: LapRow) -> Result<Self, Self::Error> {
        Ok(LapData {
            id: row.id,
            race_id: row.race_id,
            driver_id: row.driver_id,
            lap_number: row.lap_number,
            position: row.position,
            lap_time_seconds: row.lap_time_seconds,
            sector_times: SectorTimes {
                sector1: row.sector1_time,
                sector2: row.sector2_time,
                sector3: row.sector3_time,
            },
            tire_compound: TireCompound::parse(&row.tire_compound),
            tire_age: row.tire_age,
            gap_to_leader: row.gap_to_leader,
            gap_to_ahead: row.gap_to_ahead,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}
