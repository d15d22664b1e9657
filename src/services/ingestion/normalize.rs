//! Turn raw session telemetry into stored rows.
//!
//! Missing provider values default the way the importer always has: times to
//! `0.0`, positions to `1`, tire age to `0`, compounds to `UNKNOWN`.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::domain::models::{
    NewLap, NewPitStop, NewRaceResult, NormalizedRace, RawLap, SectorTimes, SessionTelemetry, TireCompound,
};

pub const STATUS_FINISHED: &str = "Finished";

/// Normalize every lap of drivers present in `driver_ids` (code -> id).
/// Laps of other drivers are dropped.
pub fn normalize_session(telemetry: &SessionTelemetry, driver_ids: &HashMap<String, i64>) -> NormalizedRace {
    let by_driver = group_laps(&telemetry.laps, driver_ids);
    let cumulative: HashMap<&str, BTreeMap<i64, f64>> = by_driver
        .iter()
        .map(|(code, laps)| (code.as_str(), cumulative_times(laps)))
        .collect();
    let order = running_order(&by_driver);

    let mut laps = Vec::with_capacity(telemetry.laps.len());
    let mut pit_stops = Vec::new();
    let mut results = Vec::with_capacity(by_driver.len());
    let leader_laps = by_driver
        .values()
        .filter_map(|laps| laps.last().map(|l| l.lap_number))
        .max()
        .unwrap_or(0);

    for (code, driver_laps) in &by_driver {
        let Some(&driver_id) = driver_ids.get(code) else {
            continue;
        };

        for lap in driver_laps {
            let (gap_to_leader, gap_to_ahead) = gaps(code, lap.lap_number, &order, &cumulative);
            laps.push(NewLap {
                driver_id,
                lap_number: lap.lap_number,
                position: lap.position.unwrap_or(1),
                lap_time_seconds: lap.lap_time.unwrap_or(0.0),
                sector_times: SectorTimes {
                    sector1: lap.sector1.unwrap_or(0.0),
                    sector2: lap.sector2.unwrap_or(0.0),
                    sector3: lap.sector3.unwrap_or(0.0),
                },
                tire_compound: compound_of(lap),
                tire_age: lap.tyre_life.unwrap_or(0),
                gap_to_leader,
                gap_to_ahead,
            });
        }

        pit_stops.extend(detect_pit_stops(driver_id, driver_laps));
        results.push(classify(driver_id, driver_laps, leader_laps));
    }

    results.sort_by_key(|r| (r.final_position.unwrap_or(i64::MAX), r.driver_id));
    debug!(laps = laps.len(), pit_stops = pit_stops.len(), results = results.len(), "normalized session");

    NormalizedRace { laps, pit_stops, results }
}

/// Laps per known driver, sorted by lap number, first report of a lap wins.
fn group_laps<'a>(laps: &'a [RawLap], driver_ids: &HashMap<String, i64>) -> BTreeMap<String, Vec<&'a RawLap>> {
    let mut grouped: BTreeMap<String, Vec<&RawLap>> = BTreeMap::new();
    for lap in laps {
        let code = lap.driver_code.trim().to_uppercase();
        if lap.lap_number < 1 || !driver_ids.contains_key(&code) {
            continue;
        }
        grouped.entry(code).or_default().push(lap);
    }
    for driver_laps in grouped.values_mut() {
        driver_laps.sort_by_key(|l| l.lap_number);
        driver_laps.dedup_by_key(|l| l.lap_number);
    }
    grouped
}

/// Race time at the end of each lap, known only while every lap from lap 1
/// onward has a time.
fn cumulative_times(laps: &[&RawLap]) -> BTreeMap<i64, f64> {
    let mut times = BTreeMap::new();
    let mut total = 0.0;
    for (expected, lap) in (1..).zip(laps) {
        match lap.lap_time {
            Some(t) if lap.lap_number == expected && t > 0.0 => {
                total += t;
                times.insert(lap.lap_number, total);
            }
            _ => break,
        }
    }
    times
}

/// Drivers in track order for each lap, from reported positions.
fn running_order(by_driver: &BTreeMap<String, Vec<&RawLap>>) -> BTreeMap<i64, Vec<String>> {
    let mut placed: BTreeMap<i64, Vec<(i64, String)>> = BTreeMap::new();
    for (code, laps) in by_driver {
        for lap in laps {
            if let Some(position) = lap.position {
                placed.entry(lap.lap_number).or_default().push((position, code.clone()));
            }
        }
    }
    placed
        .into_iter()
        .map(|(lap, mut cars)| {
            cars.sort();
            (lap, cars.into_iter().map(|(_, code)| code).collect())
        })
        .collect()
}

fn gaps(
    code: &str,
    lap_number: i64,
    order: &BTreeMap<i64, Vec<String>>,
    cumulative: &HashMap<&str, BTreeMap<i64, f64>>,
) -> (Option<f64>, Option<f64>) {
    let Some(cars) = order.get(&lap_number) else {
        return (None, None);
    };
    let Some(index) = cars.iter().position(|c| c == code) else {
        return (None, None);
    };
    let time_of = |driver: &str| cumulative.get(driver).and_then(|t| t.get(&lap_number)).copied();
    let Some(own) = time_of(code) else {
        return (None, None);
    };

    let to_leader = time_of(&cars[0]).map(|leader| round3(own - leader));
    let to_ahead = index
        .checked_sub(1)
        .and_then(|ahead| time_of(&cars[ahead]))
        .map(|ahead| round3(own - ahead));
    (to_leader, to_ahead)
}

fn compound_of(lap: &RawLap) -> TireCompound {
    lap.compound.as_deref().map(TireCompound::parse).unwrap_or_default()
}

/// A stop happens between two consecutive laps when the stint number
/// changes, or, without stint data, when the compound changes.
fn detect_pit_stops(driver_id: i64, laps: &[&RawLap]) -> Vec<NewPitStop> {
    let median = median_lap_time(laps);
    let mut stops = Vec::new();

    for pair in laps.windows(2) {
        let (in_lap, out_lap) = (pair[0], pair[1]);
        let changed = match (in_lap.stint, out_lap.stint) {
            (Some(a), Some(b)) => a != b,
            _ => match (&in_lap.compound, &out_lap.compound) {
                (Some(a), Some(b)) => !a.trim().eq_ignore_ascii_case(b.trim()),
                _ => false,
            },
        };
        if !changed {
            continue;
        }

        stops.push(NewPitStop {
            driver_id,
            stop_number: stops.len() as i64 + 1,
            lap: in_lap.lap_number,
            duration_seconds: stop_duration(in_lap, out_lap, median),
            tire_compound_before: in_lap.compound.as_deref().map(TireCompound::parse),
            tire_compound_after: compound_of(out_lap),
        });
    }
    stops
}

/// Pit lane time when both timestamps are known, otherwise the time the
/// in-lap and out-lap lost against two median laps.
fn stop_duration(in_lap: &RawLap, out_lap: &RawLap, median: Option<f64>) -> f64 {
    if let (Some(pit_in), Some(pit_out)) = (in_lap.pit_in_time, out_lap.pit_out_time) {
        if pit_out >= pit_in {
            return round3(pit_out - pit_in);
        }
    }
    match (in_lap.lap_time, out_lap.lap_time, median) {
        (Some(a), Some(b), Some(m)) => round3((a + b - 2.0 * m).max(0.0)),
        _ => 0.0,
    }
}

pub fn median_lap_time(laps: &[&RawLap]) -> Option<f64> {
    let mut times: Vec<f64> = laps.iter().filter_map(|l| l.lap_time).filter(|t| *t > 0.0).collect();
    if times.is_empty() {
        return None;
    }
    times.sort_by(f64::total_cmp);
    let mid = times.len() / 2;
    Some(if times.len() % 2 == 0 {
        (times[mid - 1] + times[mid]) / 2.0
    } else {
        times[mid]
    })
}

fn classify(driver_id: i64, laps: &[&RawLap], leader_laps: i64) -> NewRaceResult {
    let grid_position = laps.first().filter(|l| l.lap_number == 1).and_then(|l| l.position);
    let final_position = laps.last().and_then(|l| l.position);
    let completed = laps.last().map_or(0, |l| l.lap_number);

    let status = match leader_laps - completed {
        down if down <= 0 => STATUS_FINISHED.to_string(),
        1 => "+1 Lap".to_string(),
        down => format!("+{down} Laps"),
    };

    NewRaceResult {
        driver_id,
        final_position,
        grid_position,
        status: Some(status),
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{DriverEntry, SessionKey};

    fn lap(code: &str, n: i64, pos: i64, time: f64, compound: &str, stint: i64) -> RawLap {
        RawLap {
            driver_code: code.to_string(),
            lap_number: n,
            position: Some(pos),
            lap_time: Some(time),
            sector1: Some(time / 3.0),
            sector2: Some(time / 3.0),
            sector3: Some(time / 3.0),
            compound: Some(compound.to_string()),
            tyre_life: Some(n),
            stint: Some(stint),
            pit_in_time: None,
            pit_out_time: None,
        }
    }

    fn session(laps: Vec<RawLap>) -> SessionTelemetry {
        SessionTelemetry {
            key: SessionKey::race(2024, "Bahrain Grand Prix"),
            drivers: vec![DriverEntry::from_code("VER"), DriverEntry::from_code("LEC")],
            laps,
        }
    }

    fn ids() -> HashMap<String, i64> {
        HashMap::from([("VER".to_string(), 1), ("LEC".to_string(), 16)])
    }

    #[test]
    fn test_gaps_from_cumulative_time() {
        let data = normalize_session(
            &session(vec![
                lap("VER", 1, 1, 95.0, "SOFT", 1),
                lap("VER", 2, 1, 94.0, "SOFT", 1),
                lap("LEC", 1, 2, 95.5, "SOFT", 1),
                lap("LEC", 2, 2, 94.25, "SOFT", 1),
            ]),
            &ids(),
        );

        let lec2 = data.laps.iter().find(|l| l.driver_id == 16 && l.lap_number == 2).unwrap();
        assert_eq!(lec2.gap_to_leader, Some(0.75));
        assert_eq!(lec2.gap_to_ahead, Some(0.75));

        let ver2 = data.laps.iter().find(|l| l.driver_id == 1 && l.lap_number == 2).unwrap();
        assert_eq!(ver2.gap_to_leader, Some(0.0));
        assert_eq!(ver2.gap_to_ahead, None);
    }

    #[test]
    fn test_gap_unknown_after_missing_lap_time() {
        let mut missing = lap("LEC", 1, 2, 95.5, "SOFT", 1);
        missing.lap_time = None;
        let data = normalize_session(
            &session(vec![
                lap("VER", 1, 1, 95.0, "SOFT", 1),
                lap("VER", 2, 1, 94.0, "SOFT", 1),
                missing,
                lap("LEC", 2, 2, 94.25, "SOFT", 1),
            ]),
            &ids(),
        );

        let lec = data.laps.iter().filter(|l| l.driver_id == 16).collect::<Vec<_>>();
        assert!(lec.iter().all(|l| l.gap_to_leader.is_none()));
        assert_eq!(lec[0].lap_time_seconds, 0.0);
    }

    #[test]
    fn test_missing_values_get_defaults() {
        let raw = RawLap {
            driver_code: "ver".to_string(),
            lap_number: 1,
            ..Default::default()
        };
        let data = normalize_session(&session(vec![raw]), &ids());

        let lap = &data.laps[0];
        assert_eq!(lap.position, 1);
        assert_eq!(lap.lap_time_seconds, 0.0);
        assert_eq!(lap.sector_times.total(), 0.0);
        assert_eq!(lap.tire_age, 0);
        assert_eq!(lap.tire_compound, TireCompound::Unknown);
    }

    #[test]
    fn test_pit_stop_from_pit_timestamps() {
        let mut in_lap = lap("VER", 2, 1, 110.0, "SOFT", 1);
        in_lap.pit_in_time = Some(5000.0);
        let mut out_lap = lap("VER", 3, 2, 115.0, "HARD", 2);
        out_lap.pit_out_time = Some(5022.4);

        let data = normalize_session(
            &session(vec![lap("VER", 1, 1, 95.0, "SOFT", 1), in_lap, out_lap, lap("VER", 4, 2, 96.0, "HARD", 2)]),
            &ids(),
        );

        assert_eq!(data.pit_stops.len(), 1);
        let stop = &data.pit_stops[0];
        assert_eq!(stop.lap, 2);
        assert_eq!(stop.stop_number, 1);
        assert_eq!(stop.duration_seconds, 22.4);
        assert_eq!(stop.tire_compound_before, Some(TireCompound::Soft));
        assert_eq!(stop.tire_compound_after, TireCompound::Hard);
    }

    #[test]
    fn test_pit_stop_duration_from_lap_excess() {
        let mut laps = vec![
            lap("VER", 1, 1, 95.0, "MEDIUM", 0),
            lap("VER", 2, 1, 110.0, "MEDIUM", 0),
            lap("VER", 3, 1, 105.0, "HARD", 0),
            lap("VER", 4, 1, 95.0, "HARD", 0),
            lap("VER", 5, 1, 95.0, "HARD", 0),
        ];
        for l in &mut laps {
            l.stint = None;
        }
        let data = normalize_session(&session(laps), &ids());

        assert_eq!(data.pit_stops.len(), 1);
        // median 95.0: 110 + 105 - 190
        assert_eq!(data.pit_stops[0].duration_seconds, 25.0);
    }

    #[test]
    fn test_results_grid_final_and_status() {
        let data = normalize_session(
            &session(vec![
                lap("VER", 1, 2, 95.0, "SOFT", 1),
                lap("VER", 2, 1, 94.0, "SOFT", 1),
                lap("VER", 3, 1, 94.0, "SOFT", 1),
                lap("LEC", 1, 1, 95.5, "SOFT", 1),
                lap("LEC", 2, 2, 96.0, "SOFT", 1),
            ]),
            &ids(),
        );

        assert_eq!(data.results.len(), 2);
        let ver = &data.results[0];
        assert_eq!(ver.driver_id, 1);
        assert_eq!(ver.grid_position, Some(2));
        assert_eq!(ver.final_position, Some(1));
        assert_eq!(ver.status.as_deref(), Some(STATUS_FINISHED));

        let lec = &data.results[1];
        assert_eq!(lec.grid_position, Some(1));
        assert_eq!(lec.status.as_deref(), Some("+1 Lap"));
    }

    #[test]
    fn test_unknown_drivers_and_duplicate_laps_are_dropped() {
        let data = normalize_session(
            &session(vec![
                lap("VER", 1, 1, 95.0, "SOFT", 1),
                lap("VER", 1, 1, 99.0, "SOFT", 1),
                lap("XXX", 1, 3, 97.0, "SOFT", 1),
            ]),
            &ids(),
        );

        assert_eq!(data.laps.len(), 1);
        assert_eq!(data.laps[0].lap_time_seconds, 95.0);
        assert_eq!(data.results.len(), 1);
    }
}
