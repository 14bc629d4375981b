//! Classification of raw fixes into accepted points and noise.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::TrackerError,
    geo_sample::{haversine_distance, GeoSample},
    track_point::TrackPoint,
};

/// Shortest time step used when turning a distance into a speed, in seconds.
pub const MIN_STEP_SECONDS: f64 = 0.5;

/// Thresholds for the sample filter and pace smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub max_acceptable_accuracy_m: f64,
    pub min_step_distance_m: f64,
    pub min_plausible_speed_mps: f64,
    pub max_plausible_speed_mps: f64,
    pub pace_smoothing_window_s: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_acceptable_accuracy_m: 25.0,
            min_step_distance_m: 3.0,
            min_plausible_speed_mps: 0.3,
            max_plausible_speed_mps: 7.0,
            pace_smoothing_window_s: 20.0,
        }
    }
}

/// A partial [`FilterConfig`], only the fields that were given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterOverrides {
    pub max_acceptable_accuracy_m: Option<f64>,
    pub min_step_distance_m: Option<f64>,
    pub min_plausible_speed_mps: Option<f64>,
    pub max_plausible_speed_mps: Option<f64>,
    pub pace_smoothing_window_s: Option<f64>,
}

impl FilterConfig {
    /// Parses `key = value` lines. Blank lines and `#` comments are skipped,
    /// unknown keys are logged and ignored.
    pub fn parse(text: &str) -> Result<FilterOverrides, TrackerError> {
        let mut overrides = FilterOverrides::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(TrackerError::InvalidConfig(format!("expected key = value, got {line:?}")));
            };
            let key = key.trim();
            let value = value.trim();

            let slot = match key {
                "max_acceptable_accuracy_m" | "accMax" => &mut overrides.max_acceptable_accuracy_m,
                "min_step_distance_m" | "minStepM" => &mut overrides.min_step_distance_m,
                "min_plausible_speed_mps" | "vMin" => &mut overrides.min_plausible_speed_mps,
                "max_plausible_speed_mps" | "vMax" => &mut overrides.max_plausible_speed_mps,
                "pace_smoothing_window_s" | "windowS" => &mut overrides.pace_smoothing_window_s,
                _ => {
                    tracing::warn!("Unknown filter config key: {}", key);
                    continue;
                }
            };

            let parsed: f64 = value
                .parse()
                .map_err(|_| TrackerError::InvalidConfig(format!("{key}: {value:?} is not a number")))?;
            if !parsed.is_finite() || parsed < 0.0 {
                return Err(TrackerError::InvalidConfig(format!("{key} must be a non-negative number")));
            }
            *slot = Some(parsed);
        }

        Ok(overrides)
    }

    /// Merges the given overrides on top of this config.
    pub fn apply(&mut self, overrides: FilterOverrides) -> Result<(), TrackerError> {
        let mut merged = *self;
        if let Some(v) = overrides.max_acceptable_accuracy_m {
            merged.max_acceptable_accuracy_m = v;
        }
        if let Some(v) = overrides.min_step_distance_m {
            merged.min_step_distance_m = v;
        }
        if let Some(v) = overrides.min_plausible_speed_mps {
            merged.min_plausible_speed_mps = v;
        }
        if let Some(v) = overrides.max_plausible_speed_mps {
            merged.max_plausible_speed_mps = v;
        }
        if let Some(v) = overrides.pace_smoothing_window_s {
            merged.pace_smoothing_window_s = v;
        }

        if merged.min_plausible_speed_mps > merged.max_plausible_speed_mps {
            return Err(TrackerError::InvalidConfig(format!(
                "speed window is empty: {} > {}",
                merged.min_plausible_speed_mps, merged.max_plausible_speed_mps
            )));
        }

        *self = merged;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidPosition,
    LowAccuracy,
    OutOfOrder,
    Jitter,
    ImplausibleSpeed,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidPosition => "invalid_position",
            RejectReason::LowAccuracy => "low_accuracy",
            RejectReason::OutOfOrder => "out_of_order",
            RejectReason::Jitter => "jitter",
            RejectReason::ImplausibleSpeed => "implausible_speed",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Keep the sample. `distance_m` is the step from the previous point,
    /// zero for the first point of a session.
    Accepted { distance_m: f64 },
    Rejected(RejectReason),
}

/// Seconds between two timestamps, floored at [`MIN_STEP_SECONDS`].
pub fn step_seconds(from_ms: i64, to_ms: i64) -> f64 {
    f64::max(MIN_STEP_SECONDS, (to_ms - from_ms) as f64 / 1000.)
}

/// Decides whether `candidate` extends the trajectory ending in `last_accepted`.
///
/// A fix without a usable position never gets in. Past that, the first
/// point of a session is accepted without looking at its accuracy.
pub fn accept(candidate: &GeoSample, last_accepted: Option<&TrackPoint>, cfg: &FilterConfig) -> Verdict {
    if !candidate.has_valid_position() {
        return Verdict::Rejected(RejectReason::InvalidPosition);
    }

    let Some(last) = last_accepted else {
        return Verdict::Accepted { distance_m: 0.0 };
    };

    if let Some(accuracy) = candidate.accuracy_m {
        if accuracy > cfg.max_acceptable_accuracy_m {
            return Verdict::Rejected(RejectReason::LowAccuracy);
        }
    }

    if candidate.timestamp_ms < last.timestamp_ms {
        return Verdict::Rejected(RejectReason::OutOfOrder);
    }

    let distance_m = haversine_distance(last, candidate);
    let dt = step_seconds(last.timestamp_ms, candidate.timestamp_ms);
    let speed = distance_m / dt;

    if distance_m < cfg.min_step_distance_m {
        return Verdict::Rejected(RejectReason::Jitter);
    }

    if speed < cfg.min_plausible_speed_mps || speed > cfg.max_plausible_speed_mps {
        return Verdict::Rejected(RejectReason::ImplausibleSpeed);
    }

    Verdict::Accepted { distance_m }
}
