//! Tap tempo.
//!
//! Each tap turns the time since the previous tap into a BPM reading. The
//! last `filter_length` readings are averaged. A gap longer than one beat at
//! `min_bpm` restarts the measurement without touching the readings.

use std::time::{Duration, Instant};

use crate::config::EditorSettings;

/// One beat at `min_bpm`. Values with no representable interval fall back
/// to the default tempo floor.
fn max_interval_for(min_bpm: f64) -> Duration {
    let fallback = Duration::from_secs_f64(60.0 / EditorSettings::default().min_bpm);
    if !(min_bpm > 0.0) {
        return fallback;
    }
    Duration::try_from_secs_f64(60.0 / min_bpm).unwrap_or_else(|e| {
        log::warn!("editor.min_bpm {min_bpm} is unusable ({e}), using the default");
        fallback
    })
}

#[derive(Debug, Clone)]
pub struct TapTempo {
    window: Vec<f64>,
    last_tap: Instant,
    max_interval: Duration,
    max_bpm: f64,
}

impl TapTempo {
    pub fn new(settings: &EditorSettings) -> Self {
        Self::started_at(settings, Instant::now())
    }

    /// A filter whose first interval is measured from `start`.
    pub fn started_at(settings: &EditorSettings, start: Instant) -> Self {
        Self {
            window: vec![0.0; settings.tap_filter_length.max(1)],
            last_tap: start,
            max_interval: max_interval_for(settings.min_bpm),
            max_bpm: settings.max_bpm,
        }
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn window(&self) -> &[f64] {
        &self.window
    }

    pub fn tap(&mut self) -> Option<f64> {
        self.tap_at(Instant::now())
    }

    /// Register a tap at `now` and return the averaged BPM, or `None` when
    /// the tap only restarted the measurement.
    pub fn tap_at(&mut self, now: Instant) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.last_tap);
        self.last_tap = now;

        if elapsed > self.max_interval {
            return None;
        }

        let ms = elapsed.as_secs_f64() * 1000.0;
        let bpm = if ms > 0.0 {
            (60_000.0 / ms).min(self.max_bpm)
        } else {
            self.max_bpm
        };

        self.window.rotate_left(1);
        if let Some(last) = self.window.last_mut() {
            *last = bpm;
        }

        Some(self.window.iter().sum::<f64>() / self.window.len() as f64)
    }
}
