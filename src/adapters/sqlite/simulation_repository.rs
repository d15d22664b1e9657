//! SQLite implementation of the SimulationRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{parse_datetime, parse_optional_datetime, push_int_filters};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewSimulation, Simulation, TireCompound};
use crate::domain::ports::SimulationRepository;

const SIMULATION_COLUMNS: &str = "id, race_id, driver_id, user_id, alternative_stop_lap, \
                                  alternative_tire_compound, predicted_position, predicted_gap, \
                                  actual_position, actual_gap, position_delta, gap_delta, \
                                  calculation_time_ms, traffic_affected, confidence_score, \
                                  created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSimulationRepository {
    pool: SqlitePool,
}

impl SqliteSimulationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, base: &str, first: i64, filters: &[(&str, Option<i64>)], order: &str) -> DomainResult<Vec<Simulation>> {
        let mut query = format!("SELECT {SIMULATION_COLUMNS} FROM simulations WHERE {base} = ?");
        let bindings = push_int_filters(&mut query, filters);
        query.push_str(order);

        let mut q = sqlx::query_as::<_, SimulationRow>(&query).bind(first);
        for binding in bindings {
            q = q.bind(binding);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[async_trait]
impl SimulationRepository for SqliteSimulationRepository {
    async fn create(&self, simulation: &NewSimulation) -> DomainResult<Simulation> {
        if !(0.0..=1.0).contains(&simulation.confidence_score) {
            return Err(DomainError::ValidationFailed(format!(
                "confidence score {} outside [0, 1]",
                simulation.confidence_score
            )));
        }

        let id = sqlx::query(
            r#"INSERT INTO simulations (race_id, driver_id, user_id, alternative_stop_lap,
                   alternative_tire_compound, predicted_position, predicted_gap, actual_position,
                   actual_gap, position_delta, gap_delta, calculation_time_ms, traffic_affected,
                   confidence_score, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(simulation.race_id)
        .bind(simulation.driver_id)
        .bind(simulation.user_id)
        .bind(simulation.alternative_stop_lap)
        .bind(simulation.alternative_tire_compound.as_str())
        .bind(simulation.predicted_position)
        .bind(simulation.predicted_gap)
        .bind(simulation.actual_position)
        .bind(simulation.actual_gap)
        .bind(simulation.position_delta)
        .bind(simulation.gap_delta)
        .bind(simulation.calculation_time_ms)
        .bind(simulation.traffic_affected)
        .bind(simulation.confidence_score)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id).await?.ok_or(DomainError::SimulationNotFound(id))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Simulation>> {
        let row: Option<SimulationRow> =
            sqlx::query_as(&format!("SELECT {SIMULATION_COLUMNS} FROM simulations WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list_for_user(&self, user_id: i64, race_id: Option<i64>) -> DomainResult<Vec<Simulation>> {
        self.list_where("user_id", user_id, &[("race_id", race_id)], " ORDER BY created_at DESC, id DESC")
            .await
    }

    async fn list_for_race(&self, race_id: i64, driver_id: Option<i64>) -> DomainResult<Vec<Simulation>> {
        self.list_where("race_id", race_id, &[("driver_id", driver_id)], " ORDER BY created_at DESC, id DESC")
            .await
    }
}

#[derive(sqlx::FromRow)]
struct SimulationRow {
    id: i64,
    race_id: i64,
    driver_id: i64,
    user_id: i64,
    alternative_stop_lap: i64,
    alternative_tire_compound: String,
    predicted_position: i64,
    predicted_gap: f64,
    actual_position: Option<i64>,
    actual_gap: Option<f64>,
    position_delta: Option<i64>,
    gap_delta: Option<f64>,
    calculation_time_ms: i64,
    traffic_affected: bool,
    confidence_score: f64,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<SimulationRow> for Simulation {
    type Error = DomainError;

    fn try_from(row: SimulationRow) -> Result<Self, Self::Error> {
        Ok(Simulation {
            id: row.id,
            race_id: row.race_id,
            driver_id: row.driver_id,
            user_id: row.user_id,
            alternative_stop_lap: row.alternative_stop_lap,
            alternative_tire_compound: TireCompound::parse(&row.alternative_tire_compound),
            predicted_position: row.predicted_position,
            predicted_gap: row.predicted_gap,
            actual_position: row.actual_position,
            actual_gap: row.actual_gap,
            position_delta: row.position_delta,
            gap_delta: row.gap_delta,
            calculation_time_ms: row.calculation_time_ms,
            traffic_affected: row.traffic_affected,
            confidence_score: row.confidence_score,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(row.updated_at)?,
        })
    }
}
