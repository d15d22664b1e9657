pub mod circuit;
pub mod config;
pub mod driver;
pub mod lap;
pub mod pit_stop;
pub mod race;
pub mod season;
pub mod simulation;
pub mod telemetry;
pub mod user;

pub use circuit::{Circuit, NewCircuit};
pub use config::{
    AuthConfig, CacheConfig, Config, DatabaseConfig, LoggingConfig, RetryConfig, ServerConfig,
    TimingConfig,
};
pub use driver::{Driver, NewDriver};
pub use lap::{LapData, NewLap, SectorTimes, TireCompound};
pub use pit_stop::{NewPitStop, NewRaceResult, PitStop, RaceResult, ResultWithDriver};
pub use race::{NewRace, Race, RaceStatus, RaceWithCircuit};
pub use season::Season;
pub use simulation::{NewSimulation, Simulation, SimulationRequest};
pub use telemetry::{DriverEntry, NormalizedRace, RawLap, SessionKey, SessionTelemetry};
pub use user::{NewUser, User};
