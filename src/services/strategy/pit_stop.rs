//! Alternative pit stop lap.
//!
//! Stopping costs a fixed loss plus the pit-lane share of a lap and, in
//! traffic, two places; fresh tires then win one place back.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{average_lap_time, pit_stop_loss, round2, StrategyService};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LapData, PitStop, TireCompound};

const PLACES_LOST_AT_STOP: i64 = 2;
const PLACES_GAINED_ON_FRESH_TIRES: i64 = 1;
const GRID_SIZE: i64 = 20;
const FRESH_TIRE_GAIN_SHARE: f64 = 0.025;
const FRESH_TIRE_LAPS: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireDegradation {
    pub first_lap_time: f64,
    pub last_lap_time: f64,
    pub degradation_seconds: f64,
    pub degradation_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStopAnalysis {
    pub total_laps: i64,
    pub original_tire_strategy: String,
    pub alternative_tire_strategy: String,
    pub tire_degradation: Option<TireDegradation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStopSimulation {
    pub driver_id: i64,
    pub race_id: i64,
    pub scenario_name: String,
    /// First actual stop, 0 when the driver never pitted.
    pub original_stop_lap: i64,
    pub alternative_stop_lap: i64,
    pub original_position_final: i64,
    pub alternative_position_final: i64,
    pub position_gain: i64,
    pub time_loss_at_stop: f64,
    pub time_gain_after_stop: f64,
    /// 0 to 100.
    pub confidence_score: f64,
    pub recommendation: String,
    pub detailed_analysis: PitStopAnalysis,
}

impl StrategyService {
    /// How the driver's result changes when stopping on `alternative_stop_lap`.
    #[instrument(skip(self))]
    pub async fn calculate_alternative_strategy(
        &self,
        race_id: i64,
        driver_id: i64,
        alternative_stop_lap: i64,
    ) -> DomainResult<PitStopSimulation> {
        let laps = self.require_laps(race_id, driver_id).await?;
        let stops = self.pit_stops.driver_pit_stops(race_id, driver_id).await?;
        simulate_pit_stop(race_id, driver_id, &laps, &stops, alternative_stop_lap, None)
    }
}

/// Run the model over a driver's laps (ordered by lap number). With
/// `compound` set, the alternative strategy fits that compound at the stop.
pub fn simulate_pit_stop(
    race_id: i64,
    driver_id: i64,
    laps: &[LapData],
    stops: &[PitStop],
    alternative_stop_lap: i64,
    compound: Option<TireCompound>,
) -> DomainResult<PitStopSimulation> {
    let total_laps = laps.len() as i64;
    if total_laps == 0 {
        return Err(DomainError::InvalidInput(format!(
            "no lap data for driver {driver_id} in race {race_id}"
        )));
    }
    if alternative_stop_lap < 1 || alternative_stop_lap > total_laps {
        return Err(DomainError::InvalidInput(format!(
            "alternative stop lap must be between 1 and {total_laps}, got {alternative_stop_lap}"
        )));
    }

    let original_stop_lap = stops.first().map(|s| s.lap);
    let original_position_final = position_at_lap(laps, total_laps);
    let alternative_position_final = simulate_position_after_stop(laps, alternative_stop_lap);
    let position_gain = original_position_final - alternative_position_final;

    let avg_lap = average_lap_time(laps);
    let time_loss_at_stop = round2(pit_stop_loss(avg_lap));
    let time_gain_after_stop = round2(avg_lap * FRESH_TIRE_GAIN_SHARE * FRESH_TIRE_LAPS);
    let confidence_score = round2(confidence(position_gain, time_loss_at_stop, time_gain_after_stop));

    Ok(PitStopSimulation {
        driver_id,
        race_id,
        scenario_name: "Pit Stop Strategy".to_string(),
        original_stop_lap: original_stop_lap.unwrap_or(0),
        alternative_stop_lap,
        original_position_final,
        alternative_position_final,
        position_gain,
        time_loss_at_stop,
        time_gain_after_stop,
        confidence_score,
        recommendation: recommendation(position_gain, alternative_stop_lap, confidence_score),
        detailed_analysis: PitStopAnalysis {
            total_laps,
            original_tire_strategy: original_stop_lap
                .map(|lap| tire_strategy(laps, lap, None))
                .unwrap_or_else(|| "Unknown".to_string()),
            alternative_tire_strategy: tire_strategy(laps, alternative_stop_lap, compound),
            tire_degradation: tire_degradation(laps),
        },
    })
}

/// Position at the latest recorded lap not after `target_lap`.
pub(crate) fn position_at_lap(laps: &[LapData], target_lap: i64) -> i64 {
    laps.iter()
        .rev()
        .find(|l| l.lap_number <= target_lap)
        .or_else(|| laps.first())
        .map_or(GRID_SIZE, |l| l.position)
}

fn simulate_position_after_stop(laps: &[LapData], stop_lap: i64) -> i64 {
    let after_stop = (position_at_lap(laps, stop_lap) + PLACES_LOST_AT_STOP).min(GRID_SIZE);
    (after_stop - PLACES_GAINED_ON_FRESH_TIRES).max(1)
}

fn confidence(position_gain: i64, time_loss: f64, time_gain: f64) -> f64 {
    let position_confidence = (position_gain as f64 * 25.0).min(100.0);
    let time_confidence = if time_loss > 0.0 { time_gain / time_loss * 100.0 } else { 50.0 };
    ((position_confidence + time_confidence) / 2.0).clamp(0.0, 100.0)
}

fn recommendation(position_gain: i64, stop_lap: i64, confidence: f64) -> String {
    match position_gain {
        gain if gain > 0 => format!(
            "Pit stop at lap {stop_lap} could gain {gain} positions (confidence: {confidence:.0}%). Recommended timing."
        ),
        0 => format!(
            "Pit stop at lap {stop_lap} offers similar results to the current strategy. Consider race circumstances."
        ),
        loss => format!(
            "Pit stop at lap {stop_lap} could cost {} positions. Current strategy preferred.",
            loss.abs()
        ),
    }
}

/// `"{compound before} → {compound after}"` around a stop lap.
fn tire_strategy(laps: &[LapData], stop_lap: i64, fitted: Option<TireCompound>) -> String {
    let before = laps
        .iter()
        .rev()
        .find(|l| l.lap_number <= stop_lap)
        .map_or("Unknown", |l| l.tire_compound.as_str());
    let after = fitted
        .or_else(|| laps.iter().find(|l| l.lap_number > stop_lap).map(|l| l.tire_compound))
        .map_or("Unknown", |c| c.as_str());
    format!("{before} → {after}")
}

fn tire_degradation(laps: &[LapData]) -> Option<TireDegradation> {
    let (first, last) = (laps.first()?, laps.last()?);
    if laps.len() < 2 || first.lap_time_seconds <= 0.0 {
        return None;
    }
    let degradation = last.lap_time_seconds - first.lap_time_seconds;
    Some(TireDegradation {
        first_lap_time: first.lap_time_seconds,
        last_lap_time: last.lap_time_seconds,
        degradation_seconds: round2(degradation),
        degradation_percentage: round2(degradation / first.lap_time_seconds * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::strategy::test_lap;
    use chrono::Utc;

    fn laps() -> Vec<LapData> {
        (1..=10)
            .map(|n| {
                let compound = if n <= 5 { TireCompound::Medium } else { TireCompound::Hard };
                test_lap(1, n, if n <= 5 { 6 } else { 4 }, 90.0 + n as f64 * 0.1, compound, n)
            })
            .collect()
    }

    fn stop(lap: i64) -> PitStop {
        PitStop {
            id: 1,
            race_id: 1,
            driver_id: 1,
            stop_number: 1,
            lap,
            duration_seconds: 23.0,
            tire_compound_before: Some(TireCompound::Medium),
            tire_compound_after: TireCompound::Hard,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_positions_and_time_model() {
        let sim = simulate_pit_stop(1, 1, &laps(), &[stop(5)], 3, None).unwrap();
        assert_eq!(sim.original_stop_lap, 5);
        assert_eq!(sim.original_position_final, 4);
        // P6 at lap 3, +2 in the pit, -1 on fresh tires
        assert_eq!(sim.alternative_position_final, 7);
        assert_eq!(sim.position_gain, -3);

        let avg = average_lap_time(&laps());
        assert_eq!(sim.time_loss_at_stop, round2(22.0 + avg * 0.15));
        assert_eq!(sim.time_gain_after_stop, round2(avg * 0.025 * 15.0));
        assert!(sim.recommendation.contains("could cost 3 positions"));
        assert!((0.0..=100.0).contains(&sim.confidence_score));
    }

    #[test]
    fn test_detailed_analysis() {
        let sim = simulate_pit_stop(1, 1, &laps(), &[stop(5)], 7, Some(TireCompound::Soft)).unwrap();
        let analysis = &sim.detailed_analysis;
        assert_eq!(analysis.total_laps, 10);
        assert_eq!(analysis.original_tire_strategy, "MEDIUM → HARD");
        assert_eq!(analysis.alternative_tire_strategy, "HARD → SOFT");

        let degradation = analysis.tire_degradation.as_ref().unwrap();
        assert_eq!(degradation.degradation_seconds, 0.9);
    }

    #[test]
    fn test_no_stop_reports_unknown_strategy() {
        let sim = simulate_pit_stop(1, 1, &laps(), &[], 2, None).unwrap();
        assert_eq!(sim.original_stop_lap, 0);
        assert_eq!(sim.detailed_analysis.original_tire_strategy, "Unknown");
    }

    #[test]
    fn test_invalid_stop_laps() {
        assert!(matches!(
            simulate_pit_stop(1, 1, &laps(), &[], 0, None),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            simulate_pit_stop(1, 1, &laps(), &[], 11, None),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            simulate_pit_stop(1, 1, &[], &[], 1, None),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_front_runner_is_floored_at_p1() {
        let laps: Vec<LapData> = (1..=5).map(|n| test_lap(1, n, 1, 90.0, TireCompound::Soft, n)).collect();
        let sim = simulate_pit_stop(1, 1, &laps, &[], 2, None).unwrap();
        assert_eq!(sim.alternative_position_final, 2);
        assert!(sim.recommendation.contains("could cost 1 positions"));
    }
}
