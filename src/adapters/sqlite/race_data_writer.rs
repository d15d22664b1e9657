//! Transactional writer for imported race telemetry.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::NormalizedRace;
use crate::domain::ports::RaceDataWriter;

#[derive(Clone)]
pub struct SqliteRaceDataWriter {
    pool: SqlitePool,
}

impl SqliteRaceDataWriter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RaceDataWriter for SqliteRaceDataWriter {
    async fn replace_race_data(&self, race_id: i64, data: &NormalizedRace) -> DomainResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM races WHERE id = ?")
            .bind(race_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DomainError::RaceNotFound(race_id.to_string()));
        }

        for table in ["lap_data", "pit_stops", "race_drivers"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE race_id = ?"))
                .bind(race_id)
                .execute(&mut *tx)
                .await?;
        }

        for lap in &data.laps {
            sqlx::query(
                r#"INSERT INTO lap_data (race_id, driver_id, lap_number, position, lap_time_seconds,
                       sector1_time, sector2_time, sector3_time, tire_compound, tire_age,
                       gap_to_leader, gap_to_ahead, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(race_id)
            .bind(lap.driver_id)
            .bind(lap.lap_number)
            .bind(lap.position)
            .bind(lap.lap_time_seconds)
            .bind(lap.sector_times.sector1)
            .bind(lap.sector_times.sector2)
            .bind(lap.sector_times.sector3)
            .bind(lap.tire_compound.as_str())
            .bind(lap.tire_age)
            .bind(lap.gap_to_leader)
            .bind(lap.gap_to_ahead)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        for stop in &data.pit_stops {
            sqlx::query(
                r#"INSERT INTO pit_stops (race_id, driver_id, stop_number, lap, duration_seconds,
                       tire_compound_before, tire_compound_after, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(race_id)
            .bind(stop.driver_id)
            .bind(stop.stop_number)
            .bind(stop.lap)
            .bind(stop.duration_seconds)
            .bind(stop.tire_compound_before.map(|c| c.as_str()))
            .bind(stop.tire_compound_after.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        for result in &data.results {
            sqlx::query(
                r#"INSERT INTO race_drivers (race_id, driver_id, final_position, grid_position, status)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(race_id)
            .bind(result.driver_id)
            .bind(result.final_position)
            .bind(result.grid_position)
            .bind(&result.status)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE races SET data_imported = 1, imported_at = ?, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&now)
            .bind(race_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            race_id,
            laps = data.laps.len(),
            pit_stops = data.pit_stops.len(),
            results = data.results.len(),
            "replaced race data"
        );
        Ok(())
    }
}
