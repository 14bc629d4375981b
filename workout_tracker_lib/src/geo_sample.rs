use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Mean earth radius used for every distance in the engine, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A raw position fix as delivered by the location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in meters, when the source reports one.
    pub accuracy_m: Option<f64>,
    pub timestamp_ms: i64,
}

impl GeoSample {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: Option<f64>, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            timestamp_ms,
        }
    }

    /// Finite, with latitude within ±90° and longitude within ±180°.
    pub fn has_valid_position(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }

    /// Builds a sample from a geo point, where x is the longitude and y the latitude.
    pub fn from_point(point: Point, accuracy_m: Option<f64>, timestamp_ms: i64) -> Self {
        Self::new(point.y(), point.x(), accuracy_m, timestamp_ms)
    }
}

/// Anything that sits somewhere on the globe.
pub trait LatLon {
    fn lat_lon(&self) -> (f64, f64);
}

impl LatLon for GeoSample {
    fn lat_lon(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl LatLon for (f64, f64) {
    fn lat_lon(&self) -> (f64, f64) {
        *self
    }
}

/// Great-circle distance in meters between two positions.
pub fn haversine_distance(a: &impl LatLon, b: &impl LatLon) -> f64 {
    let (lat1, lon1) = a.lat_lon();
    let (lat2, lon2) = b.lat_lon();

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let h = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);

    2. * EARTH_RADIUS_M * f64::asin(f64::sqrt(h))
}
