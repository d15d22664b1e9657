//! Built-in race calendar.
//!
//! Used to seed a fresh database and to resolve a race that is not stored
//! yet when an import is requested. Race names double as the provider's event
//! folder names.

use chrono::{DateTime, Utc};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewCircuit, RaceStatus};

/// Rounds of the built-in calendar that have already been run.
pub const COMPLETED_ROUNDS_2024: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarEntry {
    pub season: i64,
    pub round: i64,
    pub name: &'static str,
    pub country: &'static str,
    pub circuit: &'static str,
    pub length_km: f64,
    pub turns: i64,
    /// Race start, RFC 3339.
    pub date: &'static str,
}

impl CalendarEntry {
    pub fn date(&self) -> DomainResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.date)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| DomainError::SerializationError(format!("calendar date {}: {e}", self.date)))
    }

    pub fn new_circuit(&self) -> NewCircuit {
        NewCircuit::new(self.circuit, self.country, self.length_km, self.turns)
    }

    pub fn seeded_status(&self) -> RaceStatus {
        if self.season == 2024 && self.round <= COMPLETED_ROUNDS_2024 {
            RaceStatus::Completed
        } else {
            RaceStatus::Scheduled
        }
    }
}

macro_rules! entry {
    ($round:expr, $name:expr, $country:expr, $circuit:expr, $length:expr, $turns:expr, $date:expr) => {
        CalendarEntry {
            season: 2024,
            round: $round,
            name: $name,
            country: $country,
            circuit: $circuit,
            length_km: $length,
            turns: $turns,
            date: $date,
        }
    };
}

pub const CALENDAR_2024: [CalendarEntry; 24] = [
    entry!(1, "Bahrain Grand Prix", "Bahrain", "Sakhir", 5.412, 15, "2024-03-02T15:00:00Z"),
    entry!(2, "Saudi Arabian Grand Prix", "Saudi Arabia", "Jeddah", 6.174, 27, "2024-03-09T17:00:00Z"),
    entry!(3, "Australian Grand Prix", "Australia", "Melbourne", 5.278, 14, "2024-03-24T04:00:00Z"),
    entry!(4, "Japanese Grand Prix", "Japan", "Suzuka", 5.807, 18, "2024-04-07T05:00:00Z"),
    entry!(5, "Chinese Grand Prix", "China", "Shanghai", 5.451, 16, "2024-04-21T07:00:00Z"),
    entry!(6, "Miami Grand Prix", "United States", "Miami", 5.412, 19, "2024-05-05T20:00:00Z"),
    entry!(7, "Emilia Romagna Grand Prix", "Italy", "Imola", 4.909, 19, "2024-05-19T13:00:00Z"),
    entry!(8, "Monaco Grand Prix", "Monaco", "Monaco", 3.337, 19, "2024-05-26T13:00:00Z"),
    entry!(9, "Canadian Grand Prix", "Canada", "Montréal", 4.361, 14, "2024-06-09T18:00:00Z"),
    entry!(10, "Spanish Grand Prix", "Spain", "Barcelona", 4.657, 14, "2024-06-23T13:00:00Z"),
    entry!(11, "Austrian Grand Prix", "Austria", "Spielberg", 4.318, 10, "2024-06-30T13:00:00Z"),
    entry!(12, "British Grand Prix", "United Kingdom", "Silverstone", 5.891, 18, "2024-07-07T14:00:00Z"),
    entry!(13, "Hungarian Grand Prix", "Hungary", "Budapest", 4.381, 14, "2024-07-21T13:00:00Z"),
    entry!(14, "Belgian Grand Prix", "Belgium", "Spa-Francorchamps", 7.004, 19, "2024-07-28T13:00:00Z"),
    entry!(15, "Dutch Grand Prix", "Netherlands", "Zandvoort", 4.259, 14, "2024-08-25T13:00:00Z"),
    entry!(16, "Italian Grand Prix", "Italy", "Monza", 5.793, 11, "2024-09-01T13:00:00Z"),
    entry!(17, "Azerbaijan Grand Prix", "Azerbaijan", "Baku", 6.003, 20, "2024-09-15T11:00:00Z"),
    entry!(18, "Singapore Grand Prix", "Singapore", "Marina Bay", 4.940, 19, "2024-09-22T12:00:00Z"),
    entry!(19, "United States Grand Prix", "United States", "Austin", 5.513, 20, "2024-10-20T19:00:00Z"),
    entry!(20, "Mexico City Grand Prix", "Mexico", "Mexico City", 4.304, 17, "2024-10-27T20:00:00Z"),
    entry!(21, "São Paulo Grand Prix", "Brazil", "São Paulo", 4.309, 15, "2024-11-03T15:30:00Z"),
    entry!(22, "Las Vegas Grand Prix", "United States", "Las Vegas", 6.201, 17, "2024-11-24T06:00:00Z"),
    entry!(23, "Qatar Grand Prix", "Qatar", "Lusail", 5.419, 16, "2024-12-01T16:00:00Z"),
    entry!(24, "Abu Dhabi Grand Prix", "United Arab Emirates", "Yas Marina", 5.281, 16, "2024-12-08T13:00:00Z"),
];

/// Calendar entry for a round, if the season is built in.
pub fn lookup(season: i64, round: i64) -> Option<&'static CalendarEntry> {
    CALENDAR_2024.iter().find(|e| e.season == season && e.round == round)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_dates_parse_and_rounds_are_ordered() {
        for (i, entry) in CALENDAR_2024.iter().enumerate() {
            assert_eq!(entry.round, i as i64 + 1);
            assert!(entry.date().is_ok(), "bad date for round {}", entry.round);
        }
        let dates: Vec<_> = CALENDAR_2024.iter().map(|e| e.date().unwrap()).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(2024, 1).unwrap().name, "Bahrain Grand Prix");
        assert!(lookup(2024, 25).is_none());
        assert!(lookup(2023, 1).is_none());
        assert_eq!(lookup(2024, 3).unwrap().seeded_status(), RaceStatus::Completed);
        assert_eq!(lookup(2024, 4).unwrap().seeded_status(), RaceStatus::Scheduled);
    }
}
