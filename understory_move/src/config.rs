// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thresholds and timing for move gestures.

use core::time::Duration;

use kurbo::Vec2;

/// Tuning for [`MoveRecognizer`](crate::recognizer::MoveRecognizer).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveConfig {
    /// Distance in page pixels the pointer must travel from the pointer-down
    /// position before a gesture starts (default: 3).
    pub threshold: f64,
    /// Frame interval for hosts without a frame-synchronized scheduler
    /// (default: 25ms). See [`IntervalScheduler`](crate::frame::IntervalScheduler).
    pub frame_interval: Duration,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            frame_interval: Duration::from_millis(25),
        }
    }
}

impl MoveConfig {
    /// Whether `delta` from the pointer-down position crosses the threshold.
    ///
    /// Compares squared magnitudes, so a movement of exactly `threshold`
    /// activates.
    pub fn exceeds_threshold(&self, delta: Vec2) -> bool {
        delta.hypot2() >= self.threshold * self.threshold
    }
}
