//! Tire choice for changing track conditions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

use super::{average_lap_time, pit_stop_loss, round2, StrategyService};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LapData, TireCompound};

/// Laps over which staying out is compared with pitting.
const HORIZON_LAPS: f64 = 10.0;
/// Seconds of race time worth one position.
const SECONDS_PER_POSITION: f64 = 2.0;
const MAX_POSITION_IMPACT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Dry,
    Damp,
    Wet,
    Storm,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Damp => "damp",
            Self::Wet => "wet",
            Self::Storm => "storm",
        }
    }

    /// Compound to run in this condition, keeping a slick already fitted in the dry.
    pub fn recommended_compound(&self, current: TireCompound) -> TireCompound {
        match self {
            Self::Dry if current.is_slick() => current,
            Self::Dry => TireCompound::Medium,
            Self::Damp => TireCompound::Intermediate,
            Self::Wet | Self::Storm => TireCompound::Wet,
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherCondition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dry" => Ok(Self::Dry),
            "damp" => Ok(Self::Damp),
            "wet" => Ok(Self::Wet),
            "storm" => Ok(Self::Storm),
            other => Err(DomainError::InvalidInput(format!(
                "unknown weather condition '{other}', expected dry, damp, wet or storm"
            ))),
        }
    }
}

/// Seconds per lap lost running `compound` in `condition`.
fn lap_penalty(compound: TireCompound, condition: WeatherCondition) -> f64 {
    use WeatherCondition::{Damp, Dry, Storm, Wet};
    match compound {
        TireCompound::Intermediate => match condition {
            Dry => 3.0,
            Damp => 0.0,
            Wet => 3.0,
            Storm => 8.0,
        },
        TireCompound::Wet => match condition {
            Dry => 6.0,
            Damp => 2.0,
            Wet => 0.0,
            Storm => 2.0,
        },
        _ => match condition {
            Dry => 0.0,
            Damp => 4.0,
            Wet => 10.0,
            Storm => 20.0,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSimulation {
    pub driver_id: i64,
    pub race_id: i64,
    pub scenario_name: String,
    pub current_weather: WeatherCondition,
    pub expected_weather: WeatherCondition,
    pub current_compound: TireCompound,
    pub recommended_compound: TireCompound,
    /// Positions gained (positive) by following the recommendation.
    pub position_impact: i64,
    pub recommended_adjustment: String,
    /// 0 to 100.
    pub confidence_score: f64,
    pub recommendation: String,
}

impl StrategyService {
    #[instrument(skip(self))]
    pub async fn calculate_weather_strategy(
        &self,
        race_id: i64,
        driver_id: i64,
        current_weather: &str,
        expected_weather: &str,
    ) -> DomainResult<WeatherSimulation> {
        let current: WeatherCondition = current_weather.parse()?;
        let expected: WeatherCondition = expected_weather.parse()?;
        let laps = self.require_laps(race_id, driver_id).await?;
        Ok(simulate_weather_change(race_id, driver_id, &laps, current, expected))
    }
}

pub fn simulate_weather_change(
    race_id: i64,
    driver_id: i64,
    laps: &[LapData],
    current: WeatherCondition,
    expected: WeatherCondition,
) -> WeatherSimulation {
    let current_compound = laps
        .iter()
        .rev()
        .map(|l| l.tire_compound)
        .find(|c| *c != TireCompound::Unknown)
        .unwrap_or(TireCompound::Medium);
    let recommended = expected.recommended_compound(current_compound);

    let stay_out_cost = lap_penalty(current_compound, expected) * HORIZON_LAPS;
    let switch_cost = lap_penalty(recommended, expected) * HORIZON_LAPS + pit_stop_loss(average_lap_time(laps));
    let benefit = if recommended == current_compound {
        0.0
    } else {
        stay_out_cost - switch_cost
    };

    let position_impact = ((benefit / SECONDS_PER_POSITION).round() as i64)
        .clamp(-MAX_POSITION_IMPACT, MAX_POSITION_IMPACT);

    let (adjustment, recommendation) = if recommended == current_compound {
        (
            format!("Stay out on {current_compound}"),
            format!("{current_compound} tires suit {expected} conditions"),
        )
    } else if benefit > 0.0 {
        (
            format!("Pit for {recommended}"),
            format!(
                "Switching to {recommended} saves about {:.1}s over {HORIZON_LAPS} laps of {expected} running",
                benefit
            ),
        )
    } else {
        (
            format!("Stay out on {current_compound}"),
            format!("A stop for {recommended} costs more than it recovers over {HORIZON_LAPS} laps"),
        )
    };

    let confidence_score = if current == expected {
        85.0
    } else {
        // Forecast changes are less certain the further apart the conditions are.
        let steps = (condition_rank(expected) - condition_rank(current)).abs() as f64;
        (75.0 - steps * 10.0).max(40.0)
    };

    WeatherSimulation {
        driver_id,
        race_id,
        scenario_name: "Weather Adaptation".to_string(),
        current_weather: current,
        expected_weather: expected,
        current_compound,
        recommended_compound: recommended,
        position_impact,
        recommended_adjustment: adjustment,
        confidence_score: round2(confidence_score),
        recommendation,
    }
}

fn condition_rank(condition: WeatherCondition) -> i64 {
    match condition {
        WeatherCondition::Dry => 0,
        WeatherCondition::Damp => 1,
        WeatherCondition::Wet => 2,
        WeatherCondition::Storm => 3,
    }
}
