//! Pace estimates in whole seconds per kilometer. Zero means "undefined".

use crate::{
    filter::step_seconds,
    geo_sample::haversine_distance,
    track_point::TrackPoint,
};

/// Pace over the whole session, from active time and accepted distance.
pub fn average_pace_sec_per_km(elapsed_active_s: u64, distance_m: f64) -> u32 {
    if distance_m <= 0.0 {
        return 0;
    }
    (elapsed_active_s as f64 / (distance_m / 1000.)).round() as u32
}

/// Smoothed pace over the trailing `window_s` seconds of the trajectory.
///
/// Walks back from the newest point and stops at the first segment that
/// starts before the window, so that segment is left out and the
/// effective window can come out a little shorter than requested.
pub fn instantaneous_pace_sec_per_km(trajectory: &[TrackPoint], window_s: f64) -> u32 {
    let Some(newest) = trajectory.last() else {
        return 0;
    };
    if trajectory.len() < 2 {
        return 0;
    }

    let cutoff = newest.timestamp_ms as f64 - window_s * 1000.;

    let mut distance_m = 0.0;
    let mut seconds = 0.0;
    for pair in trajectory.windows(2).rev() {
        let (from, to) = (&pair[0], &pair[1]);
        if (from.timestamp_ms as f64) < cutoff {
            break;
        }
        distance_m += haversine_distance(from, to);
        seconds += step_seconds(from.timestamp_ms, to.timestamp_ms);
    }

    if distance_m <= 0.0 || seconds <= 0.0 {
        return 0;
    }

    let speed = distance_m / seconds;
    (1000. / speed).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const METER: f64 = 1.0 / 111_194.93;

    /// Straight line north, `step_m` meters every `step_ms`.
    fn line(points: usize, step_m: f64, step_ms: i64) -> Vec<TrackPoint> {
        (0..points)
            .map(|i| TrackPoint::new(48.0 + i as f64 * step_m * METER, 2.0, None, i as i64 * step_ms))
            .collect()
    }

    #[test]
    fn average_undefined_without_distance() {
        assert_eq!(average_pace_sec_per_km(120, 0.0), 0);
    }

    #[test]
    fn average_five_minute_km() {
        assert_eq!(average_pace_sec_per_km(300, 1000.0), 300);
        assert_eq!(average_pace_sec_per_km(600, 2500.0), 240);
    }

    #[test]
    fn instantaneous_needs_two_points() {
        assert_eq!(instantaneous_pace_sec_per_km(&[], 20.0), 0);
        assert_eq!(instantaneous_pace_sec_per_km(&line(1, 5.0, 1000), 20.0), 0);
    }

    #[test]
    fn instantaneous_steady_pace() {
        // 4 m/s is 250 s/km
        let track = line(10, 8.0, 2000);
        assert_eq!(instantaneous_pace_sec_per_km(&track, 20.0), 250);
    }

    #[test]
    fn instantaneous_only_looks_at_window() {
        // slow start, then 4 m/s for the last 20 s
        let mut track = line(11, 4.0, 4000);
        let last = *track.last().unwrap();
        for i in 1..=10 {
            track.push(TrackPoint::new(
                last.latitude + i as f64 * 8.0 * METER,
                2.0,
                None,
                last.timestamp_ms + i * 2000,
            ));
        }
        assert_eq!(instantaneous_pace_sec_per_km(&track, 20.0), 250);
    }

    #[test]
    fn boundary_segment_is_excluded() {
        // points at 0, 15 s and 25 s; cutoff is 5 s, so only the last segment counts
        let track = vec![
            TrackPoint::new(48.0, 2.0, None, 0),
            TrackPoint::new(48.0 + 15.0 * METER, 2.0, None, 15_000),
            TrackPoint::new(48.0 + 55.0 * METER, 2.0, None, 25_000),
        ];
        // 40 m over 10 s
        assert_eq!(instantaneous_pace_sec_per_km(&track, 20.0), 250);
    }

    #[test]
    fn sub_second_segment_uses_half_second_floor() {
        // 4 m over a floored 0.5 s is 8 m/s, 125 s/km
        for dt_ms in [0, 200] {
            let track = vec![
                TrackPoint::new(48.0, 2.0, None, 10_000),
                TrackPoint::new(48.0 + 4.0 * METER, 2.0, None, 10_000 + dt_ms),
            ];
            assert_eq!(instantaneous_pace_sec_per_km(&track, 20.0), 125, "dt = {dt_ms} ms");
        }
    }

    #[test]
    fn no_movement_in_window_is_undefined() {
        let track = vec![TrackPoint::new(48.0, 2.0, None, 0), TrackPoint::new(48.0, 2.0, None, 1000)];
        assert_eq!(instantaneous_pace_sec_per_km(&track, 20.0), 0);
    }
}
