use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::track_point::TrackPoint;

/// Where in the training plan the finished session belongs, and to whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub user_id: i64,
    pub season_order: u32,
    pub week_number: u32,
    pub session_number: u32,
}

/// The summary of a finished session, as handed to the persistence endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: i64,
    pub season_order: u32,
    pub week_number: u32,
    pub session_number: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub distance_meters: u64,
    #[serde(rename = "avgPaceSecPerKm")]
    pub average_pace_sec_per_km: u32,
    #[serde(rename = "track")]
    pub trajectory: Vec<TrackPoint>,
}

/// Identifier the remote store gave the created run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSessionId {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedSession {
    pub id: StoredSessionId,
    pub record: SessionRecord,
}

#[test]
fn record_wire_format() {
    let started_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let finished_at = DateTime::from_timestamp(1_700_000_030, 0).unwrap();
    let record = SessionRecord {
        user_id: 7,
        season_order: 1,
        week_number: 2,
        session_number: 3,
        started_at,
        finished_at,
        duration_seconds: 30,
        distance_meters: 11,
        average_pace_sec_per_km: 2727,
        trajectory: vec![TrackPoint::new(48.0, 2.0, Some(5.0), 1_700_000_000_000)],
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["userId"], 7);
    assert_eq!(json["seasonOrder"], 1);
    assert_eq!(json["weekNumber"], 2);
    assert_eq!(json["sessionNumber"], 3);
    assert_eq!(json["startedAt"], "2023-11-14T22:13:20Z");
    assert_eq!(json["finishedAt"], "2023-11-14T22:13:50Z");
    assert_eq!(json["durationSeconds"], 30);
    assert_eq!(json["distanceMeters"], 11);
    assert_eq!(json["avgPaceSecPerKm"], 2727);
    assert_eq!(json["track"][0]["lat"], 48.0);
    assert_eq!(json.as_object().unwrap().len(), 10);
}
