// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-throttled delivery: the [`Scheduler`] capability and the per-gesture frame timer.
//!
//! ## Overview
//!
//! A gesture's frame timer fires at most once per frame no matter how many
//! samples arrive in between. Kicking the timer never fires it synchronously;
//! the update is delivered on the next frame the host reports through
//! [`MoveRecognizer::on_frame`](crate::recognizer::MoveRecognizer::on_frame).
//!
//! Stopping the timer drains it: an update that is already queued is
//! delivered first, then the drain runs, exactly once.
//!
//! ## Timer states
//!
//! - `Idle`: no frame outstanding.
//! - `Scheduled`: a frame is outstanding; `pending` says whether it fires.
//! - `Stopping`: a frame is outstanding and will run the drain (after the
//!   queued update, if any).
//! - `Stopped`: the drain has run; further kicks and frames are ignored.

use core::time::Duration;

use crate::config::MoveConfig;

/// Scheduling capabilities the host provides.
pub trait Scheduler {
    /// Ask the host to call
    /// [`MoveRecognizer::on_frame`](crate::recognizer::MoveRecognizer::on_frame)
    /// once, near the next paint.
    fn request_frame(&mut self);

    /// Ask the host to call
    /// [`MoveRecognizer::run_deferred`](crate::recognizer::MoveRecognizer::run_deferred)
    /// after the current event-loop turn has finished.
    fn defer(&mut self);
}

/// Fallback frame clock for hosts without an animation-frame primitive.
///
/// Frames are due every `interval` (25ms by default) while one is requested.
/// The host supplies monotonic time and polls.
///
/// ```
/// use core::time::Duration;
/// use understory_move::frame::{IntervalScheduler, Scheduler};
///
/// let mut clock = IntervalScheduler::new(Duration::from_millis(25));
/// assert_eq!(clock.poll_frame(Duration::ZERO), None);
///
/// clock.request_frame();
/// assert_eq!(clock.poll_frame(Duration::ZERO), Some(Duration::ZERO));
///
/// clock.request_frame();
/// assert_eq!(clock.poll_frame(Duration::from_millis(10)), None);
/// assert_eq!(
///     clock.poll_frame(Duration::from_millis(25)),
///     Some(Duration::from_millis(25))
/// );
/// ```
#[derive(Clone, Debug)]
pub struct IntervalScheduler {
    interval: Duration,
    last_frame: Option<Duration>,
    frame_requested: bool,
    deferred: bool,
}

impl IntervalScheduler {
    /// Create a clock with the given frame interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: None,
            frame_requested: false,
            deferred: false,
        }
    }

    /// Create a clock using [`MoveConfig::frame_interval`].
    pub fn from_config(config: &MoveConfig) -> Self {
        Self::new(config.frame_interval)
    }

    /// Whether a frame is currently requested.
    pub fn is_frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Earliest time the requested frame may run, if one is requested.
    pub fn next_deadline(&self) -> Option<Duration> {
        if !self.frame_requested {
            return None;
        }
        Some(match self.last_frame {
            Some(last) => last.saturating_add(self.interval),
            None => Duration::ZERO,
        })
    }

    /// Returns the frame time when a requested frame is due at `now`.
    ///
    /// The request is consumed; the caller should then run
    /// [`MoveRecognizer::on_frame`](crate::recognizer::MoveRecognizer::on_frame).
    pub fn poll_frame(&mut self, now: Duration) -> Option<Duration> {
        let deadline = self.next_deadline()?;
        if now < deadline {
            return None;
        }
        self.frame_requested = false;
        self.last_frame = Some(now);
        Some(now)
    }

    /// Returns true once if deferred work was requested since the last call.
    pub fn take_deferred(&mut self) -> bool {
        core::mem::take(&mut self.deferred)
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::from_config(&MoveConfig::default())
    }
}

impl Scheduler for IntervalScheduler {
    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn defer(&mut self) {
        self.deferred = true;
    }
}

/// What the owner of a [`FrameTimer`] must run for the current frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Fire {
    /// Nothing to run.
    Nothing,
    /// Deliver an update; the timer needs another frame.
    Update,
    /// Deliver an update, then run the drain.
    UpdateThenDrain,
    /// Run the drain.
    Drain,
}

/// Result of [`FrameTimer::stop`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Stop {
    /// The timer was idle: run the drain now.
    DrainNow,
    /// The drain runs on the next frame.
    Queued,
    /// The timer was already stopped; the drain has been or will be run once.
    AlreadyStopped,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum TimerState {
    Idle,
    Scheduled,
    Stopping { with_update: bool },
    Stopped,
}

/// Coalescing frame timer owned by one gesture session.
#[derive(Clone, Debug)]
pub(crate) struct FrameTimer {
    state: TimerState,
    pending: bool,
}

impl FrameTimer {
    pub(crate) fn new() -> Self {
        Self {
            state: TimerState::Idle,
            pending: false,
        }
    }

    /// Mark the timer as wanting to fire.
    ///
    /// Returns true when the caller must request a frame.
    pub(crate) fn kick(&mut self) -> bool {
        match self.state {
            TimerState::Idle => {
                self.pending = true;
                self.state = TimerState::Scheduled;
                true
            }
            TimerState::Scheduled => {
                self.pending = true;
                false
            }
            TimerState::Stopping { .. } | TimerState::Stopped => false,
        }
    }

    /// Request termination.
    pub(crate) fn stop(&mut self) -> Stop {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Stopped;
                Stop::DrainNow
            }
            TimerState::Scheduled => {
                self.state = TimerState::Stopping {
                    with_update: self.pending,
                };
                self.pending = true;
                Stop::Queued
            }
            TimerState::Stopping { .. } | TimerState::Stopped => Stop::AlreadyStopped,
        }
    }

    /// Advance by one frame.
    pub(crate) fn tick(&mut self) -> Fire {
        match self.state {
            TimerState::Idle | TimerState::Stopped => Fire::Nothing,
            TimerState::Scheduled if self.pending => {
                self.pending = false;
                Fire::Update
            }
            TimerState::Scheduled => {
                self.state = TimerState::Idle;
                Fire::Nothing
            }
            TimerState::Stopping { with_update } => {
                self.pending = false;
                self.state = TimerState::Stopped;
                if with_update {
                    Fire::UpdateThenDrain
                } else {
                    Fire::Drain
                }
            }
        }
    }

    /// Whether the timer has an outstanding frame.
    pub(crate) fn is_scheduled(&self) -> bool {
        matches!(
            self.state,
            TimerState::Scheduled | TimerState::Stopping { .. }
        )
    }
}
