//! Human readable renderings of durations, paces and distances.

fn pad2(n: u64) -> String {
    format!("{n:02}")
}

/// `125` -> `"02:05"`. Minutes are not wrapped into hours.
pub fn fmt_seconds(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "00:00".into();
    }
    let secs = secs as u64;
    format!("{}:{}", pad2(secs / 60), pad2(secs % 60))
}

/// `357` -> `"05:57"`, and `"—"` for an undefined pace.
pub fn fmt_pace(sec_per_km: u32) -> String {
    if sec_per_km == 0 {
        return "—".into();
    }
    let secs = u64::from(sec_per_km);
    format!("{}:{}", pad2(secs / 60), pad2(secs % 60))
}

/// `4200` -> `"4.20 km"` with two digits.
pub fn fmt_km(meters: f64, digits: usize) -> String {
    if !meters.is_finite() || meters <= 0.0 {
        return format!("{:.*} km", digits, 0.0);
    }
    format!("{:.*} km", digits, meters / 1000.)
}
