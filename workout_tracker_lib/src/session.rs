use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{distance::DistanceAccumulator, error::LocationError, track_point::TrackPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Active,
    Paused,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Active => "active",
            SessionState::Paused => "paused",
            SessionState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Live measurements of one workout attempt.
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    pub elapsed_active_s: u64,
    pub distance: DistanceAccumulator,
    pub trajectory: Vec<TrackPoint>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rejected_samples: u64,
    pub last_location_error: Option<LocationError>,
}

impl SessionMetrics {
    pub fn last_point(&self) -> Option<&TrackPoint> {
        self.trajectory.last()
    }

    pub fn distance_m(&self) -> f64 {
        self.distance.total_m()
    }
}

/// Read-only view of the engine, for logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_s: u64,
    pub distance_m: u64,
    pub avg_pace_sec_per_km: u32,
    pub inst_pace_sec_per_km: u32,
    pub points: usize,
    pub rejected: u64,
    pub last_location_error: Option<String>,
}
