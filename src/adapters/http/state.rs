use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::cache::CachedDriverRepository;
use crate::adapters::sqlite::{
    SqliteCircuitRepository, SqliteDriverRepository, SqliteLapRepository, SqlitePitStopRepository,
    SqliteRaceDataWriter, SqliteRaceRepository, SqliteRaceResultRepository, SqliteSimulationRepository,
    SqliteUserRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{
    CircuitRepository, DriverRepository, LapRepository, PitStopRepository, RaceRepository, TimingSource,
};
use crate::services::{
    AuthService, CircuitService, DriverService, RaceImportService, RaceService, SimulationService, StrategyService,
};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub races: Arc<RaceService>,
    pub drivers: Arc<DriverService>,
    pub circuits: Arc<CircuitService>,
    pub auth: Arc<AuthService>,
    pub strategy: Arc<StrategyService>,
    pub simulations: Arc<SimulationService>,
    pub importer: Arc<RaceImportService>,
}

impl AppState {
    /// Wire the services over one SQLite pool and a timing source.
    pub fn new(pool: SqlitePool, config: &Config, timing: Arc<dyn TimingSource>) -> Self {
        let races: Arc<dyn RaceRepository> = Arc::new(SqliteRaceRepository::new(pool.clone()));
        let circuits: Arc<dyn CircuitRepository> = Arc::new(SqliteCircuitRepository::new(pool.clone()));
        let drivers: Arc<dyn DriverRepository> = Arc::new(CachedDriverRepository::new(Arc::new(
            SqliteDriverRepository::new(pool.clone()),
        )));
        let laps: Arc<dyn LapRepository> = Arc::new(SqliteLapRepository::new(pool.clone()));
        let pit_stops: Arc<dyn PitStopRepository> = Arc::new(SqlitePitStopRepository::new(pool.clone()));

        Self {
            races: Arc::new(RaceService::new(
                races.clone(),
                laps.clone(),
                pit_stops.clone(),
                Arc::new(SqliteRaceResultRepository::new(pool.clone())),
            )),
            drivers: Arc::new(DriverService::new(drivers.clone())),
            circuits: Arc::new(CircuitService::new(circuits.clone())),
            auth: Arc::new(AuthService::new(
                Arc::new(SqliteUserRepository::new(pool.clone())),
                config.auth.clone(),
            )),
            strategy: Arc::new(StrategyService::new(laps.clone(), pit_stops.clone())),
            simulations: Arc::new(SimulationService::new(
                races.clone(),
                drivers.clone(),
                laps,
                pit_stops,
                Arc::new(SqliteSimulationRepository::new(pool.clone())),
            )),
            importer: Arc::new(RaceImportService::new(
                races,
                circuits,
                drivers,
                Arc::new(SqliteRaceDataWriter::new(pool)),
                timing,
            )),
        }
    }
}
