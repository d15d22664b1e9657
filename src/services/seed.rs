//! Reference data for a fresh database: the 2024 calendar and driver grid.
//!
//! Every insert is preceded by a lookup, so seeding twice is a no-op.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::ingestion::CALENDAR_2024;
use crate::domain::errors::DomainResult;
use crate::domain::models::{NewDriver, NewRace};
use crate::domain::ports::{CircuitRepository, DriverRepository, RaceRepository};

/// (number, code, first name, last name, team, country)
const GRID_2024: [(i64, &str, &str, &str, &str, &str); 20] = [
    (1, "VER", "Max", "Verstappen", "Red Bull Racing", "NED"),
    (11, "PER", "Sergio", "Pérez", "Red Bull Racing", "MEX"),
    (16, "LEC", "Charles", "Leclerc", "Ferrari", "MON"),
    (55, "SAI", "Carlos", "Sainz", "Ferrari", "ESP"),
    (4, "NOR", "Lando", "Norris", "McLaren", "GBR"),
    (81, "PIA", "Oscar", "Piastri", "McLaren", "AUS"),
    (44, "HAM", "Lewis", "Hamilton", "Mercedes", "GBR"),
    (63, "RUS", "George", "Russell", "Mercedes", "GBR"),
    (14, "ALO", "Fernando", "Alonso", "Aston Martin", "ESP"),
    (18, "STR", "Lance", "Stroll", "Aston Martin", "CAN"),
    (27, "HUL", "Nico", "Hulkenberg", "Haas F1 Team", "GER"),
    (20, "MAG", "Kevin", "Magnussen", "Haas F1 Team", "DEN"),
    (10, "GAS", "Pierre", "Gasly", "Alpine", "FRA"),
    (31, "OCO", "Esteban", "Ocon", "Alpine", "FRA"),
    (23, "ALB", "Alexander", "Albon", "Williams", "THA"),
    (2, "SAR", "Logan", "Sargeant", "Williams", "USA"),
    (22, "TSU", "Yuki", "Tsunoda", "RB", "JPN"),
    (3, "RIC", "Daniel", "Ricciardo", "RB", "AUS"),
    (77, "BOT", "Valtteri", "Bottas", "Kick Sauber", "FIN"),
    (24, "ZHO", "Guanyu", "Zhou", "Kick Sauber", "CHN"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub circuits_created: usize,
    pub races_created: usize,
    pub drivers_created: usize,
}

pub struct SeedService {
    circuits: Arc<dyn CircuitRepository>,
    races: Arc<dyn RaceRepository>,
    drivers: Arc<dyn DriverRepository>,
}

impl SeedService {
    pub fn new(
        circuits: Arc<dyn CircuitRepository>,
        races: Arc<dyn RaceRepository>,
        drivers: Arc<dyn DriverRepository>,
    ) -> Self {
        Self { circuits, races, drivers }
    }

    /// Insert whatever part of the 2024 reference data is missing.
    pub async fn seed_2024(&self) -> DomainResult<SeedReport> {
        let mut report = SeedReport::default();

        for entry in &CALENDAR_2024 {
            let circuit = match self.circuits.get_by_name(entry.circuit).await? {
                Some(circuit) => circuit,
                None => {
                    report.circuits_created += 1;
                    self.circuits.create(&entry.new_circuit()).await?
                }
            };

            if self.races.get_by_season_round(entry.season, entry.round).await?.is_some() {
                debug!(round = entry.round, "race already seeded");
                continue;
            }
            self.races
                .create(&NewRace {
                    season: entry.season,
                    round: entry.round,
                    name: entry.name.to_string(),
                    circuit_id: circuit.id,
                    country: entry.country.to_string(),
                    date: entry.date()?,
                    status: entry.seeded_status(),
                })
                .await?;
            report.races_created += 1;
        }

        for (number, code, first, last, team, country) in GRID_2024 {
            if self.drivers.get_by_code(code).await?.is_some() {
                continue;
            }
            self.drivers
                .create(&NewDriver::new(number, code, first, last, team).with_country(country))
                .await?;
            report.drivers_created += 1;
        }

        info!(
            circuits = report.circuits_created,
            races = report.races_created,
            drivers = report.drivers_created,
            "seeded 2024 reference data"
        );
        Ok(report)
    }
}
