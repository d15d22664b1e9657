//! SQLite implementation of the PitStopRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime, push_int_filters};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PitStop, TireCompound};
use crate::domain::ports::PitStopRepository;

const PIT_STOP_COLUMNS: &str = "id, race_id, driver_id, stop_number, lap, duration_seconds, \
                                tire_compound_before, tire_compound_after, created_at, updated_at";

#[derive(Clone)]
pub struct SqlitePitStopRepository {
    pool: SqlitePool,
}

impl SqlitePitStopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PitStopRepository for SqlitePitStopRepository {
    async fn race_pit_stops(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<PitStop>> {
        let mut query = format!("SELECT {PIT_STOP_COLUMNS} FROM pit_stops WHERE race_id = ?");
        let bindings = push_int_filters(&mut query, &[("driver_id", driver_id)]);
        query.push_str(" ORDER BY lap, driver_id");

        let mut q = sqlx::query_as::<_, PitStopRow>(&query).bind(race_id);
        for binding in bindings {
            q = q.bind(binding);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn driver_pit_stops(&self, race_id: i64, driver_id: i64) -> DomainResult<Vec<PitStop>> {
        let rows: Vec<PitStopRow> = sqlx::query_as(&format!(
            "SELECT {PIT_STOP_COLUMNS} FROM pit_stops WHERE race_id = ? AND driver_id = ? ORDER BY stop_number"
        ))
        .bind(race_id)
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct PitStopRow {
    id: i64,
    race_id: i64,
    driver_id: i64,
    stop_number: i64,
    lap: i64,
    duration_seconds: f64,
    tire_compound_before: Option<String>,
    tire_compound_after: String,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<PitStopRow> for PitStop {
    type Error = DomainError;

    fn try_from(row: PitStopRow) -> Result<Self, Self::Error> {
        Ok(PitStop {
            id: row.id,
            race_id: row.race_id,
            driver_id: row.driver_id,
            stop_number: row.stop_number,
            lap: row.lap,
            duration_seconds: row.duration_seconds,
            tire_compound_before: row.tire_compound_before.as_deref().map(TireCompound::parse),
            tire_compound_after: TireCompound::parse(&row.tire_compound_after),
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}
