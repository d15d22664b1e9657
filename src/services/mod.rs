pub mod auth_service;
pub mod driver_service;
pub mod ingestion;
pub mod race_service;
pub mod seed;
pub mod strategy;

pub use auth_service::{AuthService, AuthSession, Claims};
pub use driver_service::{CircuitService, DriverService, Team};
pub use ingestion::{ImportReport, RaceImportService};
pub use race_service::RaceService;
pub use seed::{SeedReport, SeedService};
pub use strategy::{SimulationService, StrategyService};
