//! Overtaking windows against a target car.
//!
//! The gap on each lap is the difference in race time. Laps where the
//! attacker runs behind within DRS range are opportunities; the chance of
//! making one stick rises with the attacker's recent pace advantage and falls
//! with the gap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::{round2, StrategyService};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LapData;

/// Gap, in seconds, at which DRS opens.
pub const DRS_WINDOW: f64 = 1.0;

/// DRS is enabled from this lap on.
pub const DRS_ENABLED_FROM_LAP: i64 = 3;

/// Laps used to judge recent pace.
pub const PACE_WINDOW: usize = 5;

/// Success probability at which a pass is counted as a gained place.
pub const LIKELY_PASS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertakeOpportunity {
    pub lap_number: i64,
    pub gap_seconds: f64,
    pub drs_eligible: bool,
    /// Seconds per lap the attacker was quicker over the pace window.
    pub pace_advantage: f64,
    /// 0 to 1.
    pub success_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertakeSimulation {
    pub driver_id: i64,
    pub target_driver_id: i64,
    pub race_id: i64,
    pub scenario_name: String,
    pub best_lap: Option<i64>,
    pub position_gain: i64,
    /// 0 to 100.
    pub confidence_score: f64,
    pub recommendation: String,
    pub opportunities: Vec<OvertakeOpportunity>,
}

impl StrategyService {
    #[instrument(skip(self))]
    pub async fn analyze_overtake_opportunities(
        &self,
        race_id: i64,
        driver_id: i64,
        target_driver_id: i64,
    ) -> DomainResult<OvertakeSimulation> {
        if driver_id == target_driver_id {
            return Err(DomainError::InvalidInput("a driver cannot overtake themselves".to_string()));
        }
        let attacker = self.require_laps(race_id, driver_id).await?;
        let target = self.require_laps(race_id, target_driver_id).await?;
        Ok(analyze_overtakes(race_id, driver_id, target_driver_id, &attacker, &target))
    }
}

pub fn analyze_overtakes(
    race_id: i64,
    driver_id: i64,
    target_driver_id: i64,
    attacker: &[LapData],
    target: &[LapData],
) -> OvertakeSimulation {
    let attacker_time = race_time(attacker);
    let target_time = race_time(target);
    let attacker_laps: BTreeMap<i64, f64> = attacker.iter().map(|l| (l.lap_number, l.lap_time_seconds)).collect();
    let target_laps: BTreeMap<i64, f64> = target.iter().map(|l| (l.lap_number, l.lap_time_seconds)).collect();

    let mut opportunities = Vec::new();
    for (&lap, &own) in &attacker_time {
        let Some(&theirs) = target_time.get(&lap) else {
            continue;
        };
        let gap = own - theirs;
        if gap <= 0.0 || gap > DRS_WINDOW {
            continue;
        }

        let pace_advantage = recent_pace(&target_laps, lap) - recent_pace(&attacker_laps, lap);
        let drs_eligible = lap >= DRS_ENABLED_FROM_LAP;
        opportunities.push(OvertakeOpportunity {
            lap_number: lap,
            gap_seconds: round2(gap),
            drs_eligible,
            pace_advantage: round2(pace_advantage),
            success_probability: round2(success_probability(gap, pace_advantage, drs_eligible)),
        });
    }

    let best = opportunities
        .iter()
        .max_by(|a, b| a.success_probability.total_cmp(&b.success_probability));
    let best_lap = best.map(|o| o.lap_number);
    let best_probability = best.map_or(0.0, |o| o.success_probability);
    let position_gain = i64::from(best_probability >= LIKELY_PASS);

    let recommendation = match best {
        None => "No laps within DRS range of the target; focus on closing the gap first.".to_string(),
        Some(o) if o.success_probability >= LIKELY_PASS => format!(
            "Attack on lap {} with a {:.2}s gap ({:.0}% chance of completing the pass).",
            o.lap_number,
            o.gap_seconds,
            o.success_probability * 100.0
        ),
        Some(o) => format!(
            "Closest window on lap {} ({:.2}s) is unlikely to stick; build tire advantage before attacking.",
            o.lap_number, o.gap_seconds
        ),
    };

    OvertakeSimulation {
        driver_id,
        target_driver_id,
        race_id,
        scenario_name: "Overtake Analysis".to_string(),
        best_lap,
        position_gain,
        confidence_score: round2(best_probability * 100.0),
        recommendation,
        opportunities,
    }
}

/// Race time at the end of each lap while every lap from lap 1 has a time.
pub(crate) fn race_time(laps: &[LapData]) -> BTreeMap<i64, f64> {
    let mut times = BTreeMap::new();
    let mut total = 0.0;
    for (expected, lap) in (1..).zip(laps) {
        if lap.lap_number != expected || lap.lap_time_seconds <= 0.0 {
            break;
        }
        total += lap.lap_time_seconds;
        times.insert(lap.lap_number, total);
    }
    times
}

/// Mean lap time over the pace window ending at `lap`.
fn recent_pace(laps: &BTreeMap<i64, f64>, lap: i64) -> f64 {
    let window: Vec<f64> = laps
        .range(..=lap)
        .rev()
        .take(PACE_WINDOW)
        .map(|(_, t)| *t)
        .filter(|t| *t > 0.0)
        .collect();
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

fn success_probability(gap: f64, pace_advantage: f64, drs: bool) -> f64 {
    let base = 0.55 + 0.5 * pace_advantage - 0.35 * gap;
    let base = if drs { base } else { base * 0.6 };
    base.clamp(0.05, 0.95)
}
