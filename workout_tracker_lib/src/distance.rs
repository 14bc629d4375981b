/// Running total of accepted distance. It only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceAccumulator {
    total_m: f64,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step. Negative or non-finite steps are dropped.
    pub fn add(&mut self, delta_m: f64) {
        if !delta_m.is_finite() || delta_m < 0.0 {
            tracing::warn!("Dropping invalid distance step {}", delta_m);
            return;
        }
        self.total_m += delta_m;
    }

    pub fn total_m(&self) -> f64 {
        self.total_m
    }

    /// Total rounded to the nearest meter.
    pub fn rounded_m(&self) -> u64 {
        self.total_m.round() as u64
    }
}

#[test]
fn accumulates_and_never_decreases() {
    let mut acc = DistanceAccumulator::new();
    let mut previous = acc.total_m();
    for step in [11.1, 0.0, -4.0, f64::NAN, 3.5, f64::INFINITY, 7.25] {
        acc.add(step);
        assert!(acc.total_m() >= previous);
        previous = acc.total_m();
    }
    assert!((acc.total_m() - 21.85).abs() < 1e-9);
    assert_eq!(acc.rounded_m(), 22);
}
