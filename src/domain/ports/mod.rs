//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces implemented by the adapters:
//! - repositories over the relational store
//! - `TimingSource` for the external telemetry provider
//! - `SessionCache` for the cache tiers in front of it

pub mod circuit_repository;
pub mod driver_repository;
pub mod race_data_repository;
pub mod race_repository;
pub mod simulation_repository;
pub mod timing_source;
pub mod user_repository;

pub use circuit_repository::CircuitRepository;
pub use driver_repository::{DriverRepository, DEFAULT_SEARCH_LIMIT};
pub use race_data_repository::{LapRepository, PitStopRepository, RaceDataWriter, RaceResultRepository};
pub use race_repository::{RaceFilter, RaceRepository};
pub use simulation_repository::SimulationRepository;
pub use timing_source::{SessionCache, TimingSource};
pub use user_repository::UserRepository;
