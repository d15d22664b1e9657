//! Wire types of the TracingInsights archive.
//!
//! The archive is produced by scripts that dump pandas frames, so values are
//! loosely typed: numbers may arrive as strings, and missing values as
//! `null`, `"None"`, `"NaN"` or an empty string.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::models::{DriverEntry, RawLap};

/// `drivers.json` in either of its published shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DriversFile {
    Listed { drivers: Vec<DriverRecord> },
    ByCode(BTreeMap<String, Value>),
}

#[derive(Debug, Deserialize)]
pub struct DriverRecord {
    pub driver: String,
    #[serde(default)]
    pub dn: Value,
    #[serde(default, rename = "fn")]
    pub first_name: Option<String>,
    #[serde(default, rename = "ln")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl DriversFile {
    pub fn into_entries(self) -> Vec<DriverEntry> {
        match self {
            DriversFile::Listed { drivers } => drivers
                .into_iter()
                .filter(|d| !d.driver.trim().is_empty())
                .map(|d| DriverEntry {
                    code: d.driver.trim().to_uppercase(),
                    number: as_i64(&d.dn),
                    first_name: d.first_name,
                    last_name: d.last_name,
                    team: d.team,
                })
                .collect(),
            DriversFile::ByCode(map) => map
                .into_iter()
                .map(|(code, value)| {
                    let mut entry = DriverEntry::from_code(code.trim().to_uppercase());
                    if let Some(name) = value.as_str() {
                        let (first, last) = split_name(name);
                        entry.first_name = first;
                        entry.last_name = last;
                    }
                    entry
                })
                .collect(),
        }
    }
}

fn split_name(name: &str) -> (Option<String>, Option<String>) {
    let name = name.trim();
    match name.split_once(' ') {
        Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
        None if name.is_empty() => (None, None),
        None => (None, Some(name.to_string())),
    }
}

/// `laptimes.json`: parallel columns, one element per lap.
#[derive(Debug, Default, Deserialize)]
pub struct LapTimesFile {
    #[serde(default)]
    pub lap: Vec<Value>,
    #[serde(default)]
    pub time: Vec<Value>,
    #[serde(default)]
    pub s1: Vec<Value>,
    #[serde(default)]
    pub s2: Vec<Value>,
    #[serde(default)]
    pub s3: Vec<Value>,
    #[serde(default)]
    pub compound: Vec<Value>,
    #[serde(default)]
    pub life: Vec<Value>,
    #[serde(default)]
    pub pos: Vec<Value>,
    #[serde(default)]
    pub stint: Vec<Value>,
    #[serde(default)]
    pub pin: Vec<Value>,
    #[serde(default)]
    pub pout: Vec<Value>,
}

impl LapTimesFile {
    /// Turn the columns into laps for `driver_code`. Rows without a lap
    /// number are dropped.
    pub fn into_laps(self, driver_code: &str) -> Vec<RawLap> {
        let cell = |column: &[Value], i: usize| column.get(i).cloned().unwrap_or(Value::Null);

        (0..self.lap.len())
            .filter_map(|i| {
                let lap_number = as_i64(&self.lap[i])?;
                Some(RawLap {
                    driver_code: driver_code.to_string(),
                    lap_number,
                    position: as_i64(&cell(&self.pos, i)),
                    lap_time: as_seconds(&cell(&self.time, i)),
                    sector1: as_seconds(&cell(&self.s1, i)),
                    sector2: as_seconds(&cell(&self.s2, i)),
                    sector3: as_seconds(&cell(&self.s3, i)),
                    compound: as_text(&cell(&self.compound, i)),
                    tyre_life: as_i64(&cell(&self.life, i)),
                    stint: as_i64(&cell(&self.stint, i)),
                    pit_in_time: as_seconds(&cell(&self.pin, i)),
                    pit_out_time: as_seconds(&cell(&self.pout, i)),
                })
            })
            .collect()
    }
}

fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null")
}

/// A time in seconds: a number, a numeric string, or `m:ss.fff`.
pub fn as_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) if is_missing(s) => None,
        Value::String(s) => {
            let s = s.trim();
            if let Some((minutes, seconds)) = s.split_once(':') {
                let minutes: f64 = minutes.parse().ok()?;
                let seconds: f64 = seconds.parse().ok()?;
                Some(minutes * 60.0 + seconds)
            } else {
                s.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
        _ => None,
    }
}

pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64)),
        Value::String(s) if is_missing(s) => None,
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.round() as i64),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if is_missing(s) => None,
        Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}
