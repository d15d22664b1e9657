//! Telemetry ingestion: fetch a session through the (cached) timing source,
//! normalize it into rows and store them in one transaction.

pub mod calendar;
pub mod import;
pub mod normalize;

pub use calendar::{CalendarEntry, CALENDAR_2024};
pub use import::{ImportReport, RaceImportService};
pub use normalize::normalize_session;
