//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    if let Some(ns) = duration.num_nanoseconds() {
        Some(ns as f64 / NANOS_PER_SECOND as f64)
    }
    else {
        None
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A timer which requires a condition to hold continuously for a configured
/// duration before a transition is permitted.
///
/// Call [`DwellTimer::accumulate`] on cycles where the condition holds and
/// [`DwellTimer::interrupt`] on cycles where it doesn't. The dwell is
/// satisfied once the accumulated time reaches the configured duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DwellTimer {
    /// Duration the condition must hold for.
    dwell_s: f64,

    /// Time accumulated so far.
    elapsed_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DwellTimer {
    /// Create a new timer requiring `dwell_s` seconds of continuous hold.
    pub fn new(dwell_s: f64) -> Self {
        Self {
            dwell_s,
            elapsed_s: 0.0,
        }
    }

    /// Accumulate hold time, returning true if the dwell is satisfied.
    pub fn accumulate(&mut self, dt_s: f64) -> bool {
        if self.elapsed_s < self.dwell_s {
            self.elapsed_s += dt_s;
        }

        self.expired()
    }

    /// The condition was broken, all accumulated time is discarded.
    pub fn interrupt(&mut self) {
        self.elapsed_s = 0.0;
    }

    /// True once the accumulated time has reached the dwell duration.
    pub fn expired(&self) -> bool {
        self.elapsed_s >= self.dwell_s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dwell_timer() {
        let mut timer = DwellTimer::new(0.5);

        // Not expired until the full dwell has accumulated
        assert!(!timer.accumulate(0.2));
        assert!(!timer.accumulate(0.2));
        assert!(timer.accumulate(0.2));
        assert!(timer.expired());

        // Interruption discards all progress
        timer.interrupt();
        assert!(!timer.expired());
        assert!(!timer.accumulate(0.4));
        assert!(timer.accumulate(0.1));
    }

    #[test]
    fn test_zero_dwell_is_immediate() {
        let mut timer = DwellTimer::new(0.0);
        assert!(timer.expired());
        assert!(timer.accumulate(0.01));
    }
}
