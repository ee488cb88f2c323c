//! Frame clock and the running time accumulator

/// Source of per-frame elapsed time
pub trait FrameClock {
    /// Seconds since the previous call. The first call returns 0.
    fn delta(&mut self) -> f32;
}

/// Clock that advances by the same step every frame (after a zero first
/// frame)
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f32,
    started: bool,
}

impl FixedStepClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            started: false,
        }
    }

    /// Step of `1 / hz` seconds
    pub fn from_hz(hz: f32) -> Self {
        Self::new(1.0 / hz)
    }
}

impl FrameClock for FixedStepClock {
    fn delta(&mut self) -> f32 {
        if self.started {
            self.step
        } else {
            self.started = true;
            0.0
        }
    }
}

/// Monotonic running sum of frame deltas
///
/// Deltas are taken as-is: a stalled frame shows up as a jump. Negative
/// deltas are ignored so the sum never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeAccumulator {
    elapsed: f32,
}

impl TimeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta: f32) -> f32 {
        if delta > 0.0 {
            self.elapsed += delta;
        }
        self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_clock_first_delta_is_zero() {
        let mut clock = FixedStepClock::from_hz(60.0);
        assert_eq!(clock.delta(), 0.0);
        assert!((clock.delta() - 1.0 / 60.0).abs() < 1e-9);
        assert!((clock.delta() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_adds_delta() {
        let mut acc = TimeAccumulator::new();
        let deltas = [0.0, 0.016, 0.5, 3.0, 0.001];
        let mut previous = acc.elapsed();
        for d in deltas {
            let before = acc.elapsed();
            let after = acc.advance(d);
            assert_eq!(after, before + d);
            assert!(after >= previous);
            previous = after;
        }
    }

    #[test]
    fn test_accumulator_ignores_negative_delta() {
        let mut acc = TimeAccumulator::new();
        acc.advance(1.0);
        acc.advance(-0.5);
        assert_eq!(acc.elapsed(), 1.0);
    }
}
