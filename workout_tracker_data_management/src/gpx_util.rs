use std::{io::Read, path::Path};

use chrono::DateTime;
use workout_tracker_lib::GeoSample;

use crate::DataManagerError;

/// Fixes read from a GPX file, in file order.
pub struct GpxTrack {
    pub title: String,
    pub samples: Vec<GeoSample>,
    /// Points dropped because they carry no usable timestamp.
    pub skipped: usize,
}

pub fn read_gpx_file(path: &Path) -> Result<GpxTrack, DataManagerError> {
    let file = std::fs::File::open(path).map_err(|_| DataManagerError::Io(format!("{}", path.display())))?;
    read_gpx(std::io::BufReader::new(file))
}

/// GPX carries no accuracy radius, so every sample has `accuracy_m = None`.
pub fn read_gpx(reader: impl Read) -> Result<GpxTrack, DataManagerError> {
    let gpx = gpx::read(reader).map_err(|e| DataManagerError::Gpx(e.to_string()))?;

    let mut title = "Unnamed".to_string();
    if let Some(name) = gpx.metadata.and_then(|meta| meta.name) {
        title = name;
    }

    let mut samples = Vec::new();
    let mut skipped = 0;
    for track in gpx.tracks {
        if title == "Unnamed" {
            if let Some(name) = track.name {
                title = name;
            }
        }

        for segment in track.segments {
            for point in segment.points {
                let timestamp_ms = point
                    .time
                    .and_then(|t| t.format().ok())
                    .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
                    .map(|t| t.timestamp_millis());

                let Some(timestamp_ms) = timestamp_ms else {
                    skipped += 1;
                    continue;
                };

                samples.push(GeoSample::from_point(point.point(), None, timestamp_ms));
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} GPX points without a timestamp", skipped);
    }

    Ok(GpxTrack { title, samples, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MORNING_RUN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning run</name>
    <trkseg>
      <trkpt lat="48.0000" lon="2.0000"><time>2024-05-01T07:00:00Z</time></trkpt>
      <trkpt lat="48.0001" lon="2.0000"><time>2024-05-01T07:00:02Z</time></trkpt>
      <trkpt lat="48.0002" lon="2.0000"></trkpt>
      <trkpt lat="48.0002" lon="2.0000"><time>2024-05-01T07:00:04.500Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn reads_points_with_time() {
        let track = read_gpx(MORNING_RUN.as_bytes()).unwrap();
        assert_eq!(track.title, "Morning run");
        assert_eq!(track.samples.len(), 3);
        assert_eq!(track.skipped, 1);

        let first = track.samples[0];
        assert_eq!(first.latitude, 48.0);
        assert_eq!(first.longitude, 2.0);
        assert_eq!(first.accuracy_m, None);
        assert_eq!(first.timestamp_ms, 1_714_546_800_000);
        assert_eq!(track.samples[2].timestamp_ms - first.timestamp_ms, 4_500);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(read_gpx("not xml".as_bytes()), Err(DataManagerError::Gpx(_))));
    }
}
