//! Race import pipeline: fetch, normalize, store.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::calendar::{self, CalendarEntry};
use super::normalize::normalize_session;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DriverEntry, NewDriver, NewRace, Race, RaceStatus, SessionKey, SessionTelemetry};
use crate::domain::ports::{CircuitRepository, DriverRepository, RaceDataWriter, RaceFilter, RaceRepository, TimingSource};

/// First number handed to drivers the provider lists without a usable one.
const SYNTHETIC_NUMBER_START: i64 = 100;

/// Outcome of one race import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub race_id: i64,
    pub season: i64,
    pub round: i64,
    pub race_name: String,
    pub laps: usize,
    pub pit_stops: usize,
    pub drivers: usize,
    pub created_drivers: usize,
    /// Cache tier or provider the telemetry came from.
    pub source: String,
}

pub struct RaceImportService {
    races: Arc<dyn RaceRepository>,
    circuits: Arc<dyn CircuitRepository>,
    drivers: Arc<dyn DriverRepository>,
    writer: Arc<dyn RaceDataWriter>,
    source: Arc<dyn TimingSource>,
}

/// A race either already stored or only known from the calendar.
enum ResolvedRace {
    Stored(Race),
    Calendar(&'static CalendarEntry),
}

impl ResolvedRace {
    fn name(&self) -> &str {
        match self {
            Self::Stored(race) => &race.name,
            Self::Calendar(entry) => entry.name,
        }
    }
}

impl RaceImportService {
    pub fn new(
        races: Arc<dyn RaceRepository>,
        circuits: Arc<dyn CircuitRepository>,
        drivers: Arc<dyn DriverRepository>,
        writer: Arc<dyn RaceDataWriter>,
        source: Arc<dyn TimingSource>,
    ) -> Self {
        Self {
            races,
            circuits,
            drivers,
            writer,
            source,
        }
    }

    /// Import the race session of `season`/`round`, replacing any data
    /// stored for it before.
    #[instrument(skip(self))]
    pub async fn import_race(&self, season: i64, round: i64) -> DomainResult<ImportReport> {
        let resolved = match self.races.get_by_season_round(season, round).await? {
            Some(race) => ResolvedRace::Stored(race),
            None => calendar::lookup(season, round)
                .map(ResolvedRace::Calendar)
                .ok_or_else(|| DomainError::RaceNotFound(format!("season {season} round {round}")))?,
        };

        let key = SessionKey::race(season, resolved.name());
        let (telemetry, origin) = self.source.load_session_with_origin(&key).await?;
        if telemetry.is_empty() {
            return Err(DomainError::TimingUnavailable(format!("no laps for {}", resolved.name())));
        }

        let race = match resolved {
            ResolvedRace::Stored(race) => race,
            ResolvedRace::Calendar(entry) => self.create_race(entry).await?,
        };

        let (driver_ids, created_drivers) = self.ensure_drivers(&telemetry).await?;
        let data = normalize_session(&telemetry, &driver_ids);
        self.writer.replace_race_data(race.id, &data).await?;

        let report = ImportReport {
            race_id: race.id,
            season: race.season,
            round: race.round,
            race_name: race.name,
            laps: data.laps.len(),
            pit_stops: data.pit_stops.len(),
            drivers: data.results.len(),
            created_drivers,
            source: origin.to_string(),
        };
        info!(
            race_id = report.race_id,
            laps = report.laps,
            pit_stops = report.pit_stops,
            drivers = report.drivers,
            created_drivers = report.created_drivers,
            source = %report.source,
            "race imported"
        );
        Ok(report)
    }

    /// Import the first completed, not yet imported race (in calendar order)
    /// that imports successfully. `None` when nothing is pending or every
    /// pending race failed.
    #[instrument(skip(self))]
    pub async fn import_next_pending(&self) -> DomainResult<Option<ImportReport>> {
        let pending = self.races.list(RaceFilter::pending_import()).await?;
        if pending.is_empty() {
            info!("no races pending import");
            return Ok(None);
        }

        for race in pending {
            match self.import_race(race.season, race.round).await {
                Ok(report) => return Ok(Some(report)),
                Err(e) => warn!(season = race.season, round = race.round, error = %e, "import failed, trying next race"),
            }
        }
        Ok(None)
    }

    async fn create_race(&self, entry: &CalendarEntry) -> DomainResult<Race> {
        let circuit = match self.circuits.get_by_name(entry.circuit).await? {
            Some(circuit) => circuit,
            None => self.circuits.create(&entry.new_circuit()).await?,
        };

        let race = self
            .races
            .create(&NewRace {
                season: entry.season,
                round: entry.round,
                name: entry.name.to_string(),
                circuit_id: circuit.id,
                country: entry.country.to_string(),
                date: entry.date()?,
                status: RaceStatus::Completed,
            })
            .await?;
        info!(race_id = race.id, name = %race.name, "created race from calendar");
        Ok(race)
    }

    /// Map every driver code of the session to a driver id, creating the
    /// drivers that are not stored yet. Codes that cannot be stored are left
    /// out, which drops their laps.
    async fn ensure_drivers(&self, telemetry: &SessionTelemetry) -> DomainResult<(HashMap<String, i64>, usize)> {
        let mut entries: BTreeMap<String, DriverEntry> = BTreeMap::new();
        for entry in &telemetry.drivers {
            entries.entry(entry.code.trim().to_uppercase()).or_insert_with(|| entry.clone());
        }
        for lap in &telemetry.laps {
            let code = lap.driver_code.trim().to_uppercase();
            entries.entry(code.clone()).or_insert_with(|| DriverEntry::from_code(code));
        }

        let mut ids = HashMap::with_capacity(entries.len());
        let mut created = 0;
        for (code, entry) in entries {
            if let Some(driver) = self.drivers.get_by_code(&code).await? {
                ids.insert(code, driver.id);
                continue;
            }

            let number = self.free_number(entry.number).await?;
            let new_driver = NewDriver::new(
                number,
                &code,
                entry.first_name.unwrap_or_default(),
                entry.last_name.unwrap_or_else(|| code.clone()),
                entry.team.unwrap_or_else(|| "Unknown".to_string()),
            );
            if let Err(reason) = new_driver.validate() {
                warn!(code = %code, %reason, "skipping driver that cannot be stored");
                continue;
            }

            let driver = self.drivers.create(&new_driver).await?;
            info!(code = %driver.code, number = driver.driver_number, "created driver from session data");
            ids.insert(code, driver.id);
            created += 1;
        }
        Ok((ids, created))
    }

    async fn free_number(&self, wanted: Option<i64>) -> DomainResult<i64> {
        if let Some(number) = wanted.filter(|n| *n >= 0) {
            if self.drivers.get_by_number(number).await?.is_none() {
                return Ok(number);
            }
        }
        let mut number = SYNTHETIC_NUMBER_START;
        while self.drivers.get_by_number(number).await?.is_some() {
            number += 1;
        }
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteCircuitRepository, SqliteDriverRepository, SqliteLapRepository,
        SqliteRaceDataWriter, SqliteRaceRepository,
    };
    use crate::domain::models::RawLap;
    use crate::domain::ports::LapRepository;
    use async_trait::async_trait;
    use sqlx::SqlitePool;

    struct FixedSource {
        telemetry: Option<SessionTelemetry>,
    }

    #[async_trait]
    impl TimingSource for FixedSource {
        async fn load_session(&self, key: &SessionKey) -> DomainResult<SessionTelemetry> {
            self.telemetry
                .clone()
                .map(|mut t| {
                    t.key = key.clone();
                    t
                })
                .ok_or_else(|| DomainError::TimingUnavailable(key.event_name.clone()))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn telemetry() -> SessionTelemetry {
        let lap = |code: &str, n: i64, pos: i64| RawLap {
            driver_code: code.to_string(),
            lap_number: n,
            position: Some(pos),
            lap_time: Some(95.0 + pos as f64),
            compound: Some("SOFT".to_string()),
            stint: Some(1),
            ..Default::default()
        };
        SessionTelemetry {
            key: SessionKey::race(2024, "Bahrain Grand Prix"),
            drivers: vec![DriverEntry {
                code: "VER".to_string(),
                number: Some(1),
                first_name: Some("Max".to_string()),
                last_name: Some("Verstappen".to_string()),
                team: Some("Red Bull Racing".to_string()),
            }],
            laps: vec![lap("VER", 1, 1), lap("VER", 2, 1), lap("BEA", 1, 2), lap("BEA", 2, 2)],
        }
    }

    fn service(pool: &SqlitePool, telemetry: Option<SessionTelemetry>) -> RaceImportService {
        RaceImportService::new(
            Arc::new(SqliteRaceRepository::new(pool.clone())),
            Arc::new(SqliteCircuitRepository::new(pool.clone())),
            Arc::new(SqliteDriverRepository::new(pool.clone())),
            Arc::new(SqliteRaceDataWriter::new(pool.clone())),
            Arc::new(FixedSource { telemetry }),
        )
    }

    #[tokio::test]
    async fn test_import_creates_race_and_unknown_drivers() {
        let pool = create_migrated_test_pool().await.unwrap();
        let report = service(&pool, Some(telemetry())).import_race(2024, 1).await.unwrap();

        assert_eq!(report.race_name, "Bahrain Grand Prix");
        assert_eq!(report.laps, 4);
        assert_eq!(report.drivers, 2);
        assert_eq!(report.created_drivers, 2);
        assert_eq!(report.source, "fixed");

        let drivers = SqliteDriverRepository::new(pool.clone());
        let bea = drivers.get_by_code("BEA").await.unwrap().unwrap();
        assert_eq!(bea.driver_number, SYNTHETIC_NUMBER_START);
        assert_eq!(bea.team, "Unknown");

        let race = SqliteRaceRepository::new(pool.clone()).get(report.race_id).await.unwrap().unwrap();
        assert!(race.data_imported);
        assert_eq!(race.status, RaceStatus::Completed);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let pool = create_migrated_test_pool().await.unwrap();
        let service = service(&pool, Some(telemetry()));
        let first = service.import_race(2024, 1).await.unwrap();
        let second = service.import_race(2024, 1).await.unwrap();

        assert_eq!(first.race_id, second.race_id);
        assert_eq!(second.created_drivers, 0);
        let count = SqliteLapRepository::new(pool.clone()).count_for_race(first.race_id).await.unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_unknown_round_is_race_not_found() {
        let pool = create_migrated_test_pool().await.unwrap();
        let result = service(&pool, Some(telemetry())).import_race(2024, 99).await;
        assert!(matches!(result, Err(DomainError::RaceNotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_stores_nothing() {
        let pool = create_migrated_test_pool().await.unwrap();
        let result = service(&pool, None).import_race(2024, 2).await;
        assert!(matches!(result, Err(DomainError::TimingUnavailable(_))));

        let stored = SqliteRaceRepository::new(pool.clone()).get_by_season_round(2024, 2).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_import_next_pending_without_pending_races() {
        let pool = create_migrated_test_pool().await.unwrap();
        let report = service(&pool, Some(telemetry())).import_next_pending().await.unwrap();
        assert!(report.is_none());
    }
}
