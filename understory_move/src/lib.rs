// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_move --heading-base-level=0

//! Understory Move: deterministic, `no_std` pointer move gestures for UI.
//!
//! ## Overview
//!
//! This crate turns raw mouse and touch input into a uniform three-phase
//! gesture: `movestart` → `move` → `moveend`.
//! It does not dispatch events. Instead, it tells a host-provided
//! [`MoveSink`](crate::types::MoveSink) which element should receive which
//! signal, and returns a [`Disposition`](crate::types::Disposition) for each
//! raw event so the host can suppress native drags, text selection, and
//! scrolling where a gesture is expected.
//!
//! ## Inputs
//!
//! - Raw events as [`PointerEvent`](crate::types::PointerEvent) values, keyed by
//!   your element identifier type `K`.
//! - An [`ElementTree`](crate::types::ElementTree) for ancestor lookups and
//!   text-input detection.
//! - A [`Scheduler`](crate::frame::Scheduler) that calls back once per frame and
//!   once after the current event-loop turn.
//!
//! ## Gesture lifecycle
//!
//! 1) Arm: a primary mouse-down or single-contact touch-start records the start
//!    position. Text inputs never arm.
//! 2) Activate: once the pointer has moved at least
//!    [`MoveConfig::threshold`](crate::config::MoveConfig::threshold) from the start,
//!    the nearest subscribed element (target inclusive, walking to the root) receives
//!    `movestart`. A subscriber can return
//!    [`Outcome::PreventDefault`](crate::types::Outcome::PreventDefault) to cancel tracking.
//! 3) Track: pointer samples update the gesture; `move` is emitted at most once per
//!    frame with the latest position.
//! 4) End: on release, any queued `move` is delivered, then `moveend` exactly once.
//!
//! Every payload carries `delta = page - start`, measured from the pointer-down.
//!
//! ## Subscriptions
//!
//! Mirror your event bus into the recognizer with
//! [`MoveRecognizer::subscribe`](crate::recognizer::MoveRecognizer::subscribe).
//! Elements with at least one subscriber are *guarded*: pointer-downs and native
//! drags on them (or their descendants) are default-prevented.
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use understory_move::frame::IntervalScheduler;
//! use understory_move::recognizer::MoveRecognizer;
//! use understory_move::types::{
//!     Disposition, ElementTree, MoveEvent, MoveKind, Outcome, PointerEvent, PointerEventKind,
//! };
//!
//! // A slider thumb (2) inside a track (1).
//! struct Slider;
//! impl ElementTree<u32> for Slider {
//!     fn parent_of(&self, node: &u32) -> Option<u32> {
//!         (*node == 2).then_some(1)
//!     }
//! }
//!
//! let mut recognizer = MoveRecognizer::new(Slider);
//! recognizer.subscribe(1, MoveKind::Move);
//!
//! let mut offset = 0.0;
//! let mut sink = |_target: u32, ev: &MoveEvent| {
//!     offset = ev.delta.x;
//!     Outcome::Continue
//! };
//! let mut clock = IntervalScheduler::default();
//! let press = |kind, x| PointerEvent::mouse(kind, 2_u32, Point::new(x, 10.0));
//!
//! let d = recognizer.handle(&press(PointerEventKind::MouseDown, 40.0), &mut sink, &mut clock);
//! assert_eq!(d, Disposition::PREVENT_DEFAULT);
//! recognizer.handle(&press(PointerEventKind::MouseMove, 48.0), &mut sink, &mut clock);
//! recognizer.handle(&press(PointerEventKind::MouseMove, 55.0), &mut sink, &mut clock);
//! if let Some(frame) = clock.poll_frame(core::time::Duration::ZERO) {
//!     recognizer.on_frame(frame.as_nanos() as u64, &mut sink, &mut clock);
//! }
//! recognizer.handle(&press(PointerEventKind::MouseUp, 55.0), &mut sink, &mut clock);
//! assert!(!recognizer.is_moving());
//! assert_eq!(offset, 15.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! ## Features
//!
//! - `std` (default): enables `std` in `kurbo`.
//! - `libm`: `no_std` float math for `kurbo`.
//! - `tracing`: emit `debug`/`trace` events for gesture transitions through the `tracing` crate.

#![no_std]

extern crate alloc;

pub mod config;
pub mod frame;
pub mod recognizer;
pub mod subscriptions;
pub mod types;

mod detector;
mod logging;
mod tracker;
