use glam::{DVec2, Vec2};

/// Turns absolute cursor positions into look deltas.
///
/// The tracker starts without a baseline. The first sample only records the
/// position, so a cursor that starts far from the window centre does not snap
/// the view on the first event.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    last: Option<DVec2>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_baseline(&self) -> bool {
        self.last.is_some()
    }

    /// Forget the baseline. The next sample seeds it again.
    pub fn reset(&mut self) {
        if self.last.take().is_some() {
            tracing::debug!("cursor baseline reset");
        }
    }

    /// Record a cursor position in window pixels and return the look delta.
    ///
    /// Screen y grows downwards, so the returned y is inverted: moving the
    /// cursor up yields a positive delta.
    pub fn sample(&mut self, x: f64, y: f64) -> Vec2 {
        let pos = DVec2::new(x, y);
        let delta = match self.last {
            Some(last) => Vec2::new((pos.x - last.x) as f32, (last.y - pos.y) as f32),
            None => Vec2::ZERO,
        };
        self.last = Some(pos);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_yields_no_delta() {
        let mut tracker = CursorTracker::new();
        assert!(!tracker.has_baseline());
        assert_eq!(tracker.sample(1900.0, 20.0), Vec2::ZERO);
        assert!(tracker.has_baseline());
    }

    #[test]
    fn later_samples_yield_inverted_y() {
        let mut tracker = CursorTracker::new();
        tracker.sample(100.0, 100.0);
        assert_eq!(tracker.sample(110.0, 90.0), Vec2::new(10.0, 10.0));
        assert_eq!(tracker.sample(105.0, 95.0), Vec2::new(-5.0, -5.0));
    }

    #[test]
    fn reset_reseeds_baseline() {
        let mut tracker = CursorTracker::new();
        tracker.sample(0.0, 0.0);
        tracker.reset();
        assert!(!tracker.has_baseline());
        assert_eq!(tracker.sample(500.0, 500.0), Vec2::ZERO);
        assert_eq!(tracker.sample(501.0, 500.0), Vec2::new(1.0, 0.0));
    }
}
