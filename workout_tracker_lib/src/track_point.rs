use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::geo_sample::{GeoSample, LatLon};

/// An accepted sample, kept in the session trajectory.
///
/// Serializes as `{ "lat", "lon", "acc", "t" }`, which is the shape the
/// runs collection stores in `track`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "acc")]
    pub accuracy_m: Option<f64>,
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: Option<f64>, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            timestamp_ms,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<GeoSample> for TrackPoint {
    fn from(sample: GeoSample) -> Self {
        Self::new(sample.latitude, sample.longitude, sample.accuracy_m, sample.timestamp_ms)
    }
}

impl LatLon for TrackPoint {
    fn lat_lon(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

#[test]
fn wire_names() {
    let point = TrackPoint::new(48.85, 2.35, None, 1_700_000_000_000);
    let json = serde_json::to_value(point).unwrap();
    assert_eq!(json, serde_json::json!({ "lat": 48.85, "lon": 2.35, "acc": null, "t": 1_700_000_000_000i64 }));

    let back: TrackPoint = serde_json::from_value(json).unwrap();
    assert_eq!(back, point);
}
