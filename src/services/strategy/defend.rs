//! Holding position against an attacking car.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::{round2, StrategyService};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LapData, PitStop};

const BASE_HOLD: f64 = 0.85;
/// Hold probability lost per second per lap the attacker is quicker.
const PACE_WEIGHT: f64 = 0.2;
/// Hold probability lost per lap of extra tire age on the defender.
const TIRE_AGE_WEIGHT: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseSimulation {
    pub driver_id: i64,
    pub race_id: i64,
    pub scenario_name: String,
    pub defending_against_driver_id: i64,
    /// 0 to 100.
    pub position_hold_probability: f64,
    pub recommended_tactic: String,
    /// 0 to 100.
    pub confidence_score: f64,
    pub recommendation: String,
    /// Seconds per lap the attacker was quicker; negative when slower.
    pub pace_delta: f64,
    /// Laps of extra wear on the defender's tires.
    pub tire_age_delta: f64,
    pub laps_compared: usize,
}

impl StrategyService {
    #[instrument(skip(self))]
    pub async fn calculate_defense_strategy(
        &self,
        race_id: i64,
        driver_id: i64,
        attacking_driver_id: i64,
    ) -> DomainResult<DefenseSimulation> {
        if driver_id == attacking_driver_id {
            return Err(DomainError::InvalidInput("a driver cannot defend against themselves".to_string()));
        }
        let defender = self.require_laps(race_id, driver_id).await?;
        let attacker = self.require_laps(race_id, attacking_driver_id).await?;
        let stops = self.pit_stops.driver_pit_stops(race_id, driver_id).await?;
        Ok(analyze_defense(race_id, driver_id, attacking_driver_id, &defender, &attacker, &stops))
    }
}

/// Compare both cars over the defender's final stint.
pub fn analyze_defense(
    race_id: i64,
    driver_id: i64,
    attacking_driver_id: i64,
    defender: &[LapData],
    attacker: &[LapData],
    defender_stops: &[PitStop],
) -> DefenseSimulation {
    let stint_start = defender_stops.iter().map(|s| s.lap).max().unwrap_or(0);
    let attacker_by_lap: BTreeMap<i64, &LapData> = attacker.iter().map(|l| (l.lap_number, l)).collect();

    let pairs: Vec<(&LapData, &LapData)> = defender
        .iter()
        .filter(|l| l.lap_number > stint_start && l.lap_time_seconds > 0.0)
        .filter_map(|l| {
            attacker_by_lap
                .get(&l.lap_number)
                .filter(|a| a.lap_time_seconds > 0.0)
                .map(|a| (l, *a))
        })
        .collect();

    let laps_compared = pairs.len();
    let (pace_delta, tire_age_delta) = if pairs.is_empty() {
        (0.0, 0.0)
    } else {
        let n = laps_compared as f64;
        let pace = pairs.iter().map(|(d, a)| d.lap_time_seconds - a.lap_time_seconds).sum::<f64>() / n;
        let age = pairs.iter().map(|(d, a)| (d.tire_age - a.tire_age) as f64).sum::<f64>() / n;
        (pace, age)
    };

    let hold = (BASE_HOLD - PACE_WEIGHT * pace_delta - TIRE_AGE_WEIGHT * tire_age_delta).clamp(0.05, 0.95);
    let (tactic, recommendation) = if hold >= 0.75 {
        (
            "Conservative tire management and line defense",
            "Pace is on your side; protect the tires and cover the inside only when the attacker commits.",
        )
    } else if hold >= 0.5 {
        (
            "Defend the inside into heavy braking zones and deploy battery on corner exits",
            "The attacker is close on pace; prioritise exits onto the DRS straights.",
        )
    } else {
        (
            "Pit early to undercut the attacker",
            "The attacker is clearly quicker on fresher tires; holding position on track is unlikely.",
        )
    };

    DefenseSimulation {
        driver_id,
        race_id,
        scenario_name: "Defense Position".to_string(),
        defending_against_driver_id: attacking_driver_id,
        position_hold_probability: round2(hold * 100.0),
        recommended_tactic: tactic.to_string(),
        confidence_score: (40.0 + laps_compared as f64 * 5.0).min(95.0),
        recommendation: recommendation.to_string(),
        pace_delta: round2(pace_delta),
        tire_age_delta: round2(tire_age_delta),
        laps_compared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TireCompound;
    use crate::services::strategy::test_lap;

    fn laps(driver_id: i64, time: f64, age_offset: i64) -> Vec<LapData> {
        (1..=10)
            .map(|n| test_lap(driver_id, n, 1, time, TireCompound::Hard, n + age_offset))
            .collect()
    }

    #[test]
    fn test_evenly_matched_cars_hold_comfortably() {
        let sim = analyze_defense(1, 1, 2, &laps(1, 90.0, 0), &laps(2, 90.0, 0), &[]);
        assert_eq!(sim.position_hold_probability, 85.0);
        assert_eq!(sim.recommended_tactic, "Conservative tire management and line defense");
        assert_eq!(sim.laps_compared, 10);
        assert_eq!(sim.confidence_score, 90.0);
    }

    #[test]
    fn test_quicker_attacker_on_fresher_tires() {
        let sim = analyze_defense(1, 1, 2, &laps(1, 91.0, 10), &laps(2, 89.5, 0), &[]);
        assert_eq!(sim.pace_delta, 1.5);
        assert_eq!(sim.tire_age_delta, 10.0);
        assert!(sim.position_hold_probability < 50.0);
        assert_eq!(sim.recommended_tactic, "Pit early to undercut the attacker");
    }

    #[test]
    fn test_only_final_stint_is_compared() {
        let stop = PitStop {
            id: 1,
            race_id: 1,
            driver_id: 1,
            stop_number: 1,
            lap: 7,
            duration_seconds: 22.0,
            tire_compound_before: Some(TireCompound::Medium),
            tire_compound_after: TireCompound::Hard,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        let sim = analyze_defense(1, 1, 2, &laps(1, 90.0, 0), &laps(2, 90.0, 0), &[stop]);
        assert_eq!(sim.laps_compared, 3);
    }
}
