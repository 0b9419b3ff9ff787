// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active gesture sessions: from `movestart` until `moveend` has been emitted.
//!
//! A session owns the gesture state record and its frame timer. Only the
//! sample handler ([`ActiveGesture::on_sample`]) mutates the state; the frame
//! tick and the end sequence read it. All three run on the host's event
//! thread, so the state is always updated before the timer is kicked and the
//! end signal always reads the last stored position.

use kurbo::{Point, Vec2};

use crate::frame::{Fire, FrameTimer, Stop};
use crate::types::{MoveEvent, MoveKind, PointerEvent, PointerEventKind, PointerKind, TouchId};

/// The mutable gesture record shared by the update and end signals.
#[derive(Copy, Clone, Debug, PartialEq)]
struct GestureState {
    kind: MoveKind,
    page: Point,
    start: Point,
    delta: Vec2,
}

impl GestureState {
    fn update(&mut self, page: Point) {
        self.page = page;
        self.delta = page - self.start;
    }

    fn snapshot(&self) -> MoveEvent {
        MoveEvent {
            kind: self.kind,
            page: self.page,
            start: self.start,
            delta: self.delta,
            routing: None,
        }
    }
}

/// Result of feeding a move sample to a session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Sample {
    /// Not a sample for this session.
    Ignored,
    /// A second contact is down; this sample is dropped.
    MultiTouch,
    /// State updated and timer kicked.
    Updated {
        request_frame: bool,
        prevent_default: bool,
    },
}

/// One started gesture.
#[derive(Clone, Debug)]
pub(crate) struct ActiveGesture<K> {
    target: K,
    state: GestureState,
    timer: FrameTimer,
    pointer: PointerKind,
    touch_id: Option<TouchId>,
}

impl<K: Copy> ActiveGesture<K> {
    /// Begin tracking after `start` was emitted on `target` and not cancelled.
    ///
    /// Returns `None` for events without routing (anything but `movestart`).
    pub(crate) fn begin(target: K, start: &MoveEvent) -> Option<Self> {
        let routing = start.routing?;
        Some(Self {
            target,
            state: GestureState {
                kind: MoveKind::Move,
                page: start.page,
                start: start.start,
                delta: start.page - start.start,
            },
            timer: FrameTimer::new(),
            pointer: routing.pointer,
            touch_id: routing.touch_id,
        })
    }

    pub(crate) fn target(&self) -> K {
        self.target
    }

    pub(crate) fn pointer(&self) -> PointerKind {
        self.pointer
    }

    pub(crate) fn is_scheduled(&self) -> bool {
        self.timer.is_scheduled()
    }

    /// Update the state from a move sample and kick the timer.
    pub(crate) fn on_sample(&mut self, event: &PointerEvent<K>) -> Sample {
        match (self.pointer, event.kind) {
            (PointerKind::Mouse, PointerEventKind::MouseMove) => {}
            (PointerKind::Touch, PointerEventKind::TouchMove) => {
                // A second finger changes what the gesture means.
                if event.touches.len() > 1 {
                    return Sample::MultiTouch;
                }
            }
            _ => return Sample::Ignored,
        }
        self.state.update(event.sample(self.touch_id).page);
        Sample::Updated {
            request_frame: self.timer.kick(),
            // Keep touch surfaces from scrolling under the gesture.
            prevent_default: self.pointer == PointerKind::Touch,
        }
    }

    /// Whether `event` terminates this session.
    ///
    /// A touch gesture continues while its tracked contact is still down,
    /// even if other contacts were lifted.
    pub(crate) fn is_end(&self, event: &PointerEvent<K>) -> bool {
        match (self.pointer, event.kind) {
            (PointerKind::Mouse, PointerEventKind::MouseUp) => true,
            (PointerKind::Touch, PointerEventKind::TouchEnd | PointerEventKind::TouchCancel) => {
                self.touch_id.is_none_or(|id| event.contact(id).is_none())
            }
            _ => false,
        }
    }

    /// Stop the timer; see [`FrameTimer::stop`].
    pub(crate) fn stop(&mut self) -> Stop {
        self.timer.stop()
    }

    /// Advance the timer by one frame.
    pub(crate) fn tick(&mut self) -> Fire {
        self.timer.tick()
    }

    /// The throttled update payload.
    pub(crate) fn update_event(&self) -> MoveEvent {
        self.state.snapshot()
    }

    /// Turn the record into the end signal, reusing the last known position.
    pub(crate) fn end_event(&mut self) -> MoveEvent {
        self.state.kind = MoveKind::MoveEnd;
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Routing, Touch};
    use alloc::vec;

    fn mouse_session() -> ActiveGesture<u32> {
        let start = MoveEvent::start(
            Point::new(105.0, 100.0),
            Point::new(100.0, 100.0),
            Routing {
                pointer: PointerKind::Mouse,
                touch_id: None,
            },
        );
        ActiveGesture::begin(1, &start).unwrap()
    }

    fn touch_session(id: u64) -> ActiveGesture<u32> {
        let start = MoveEvent::start(
            Point::new(0.0, 5.0),
            Point::ORIGIN,
            Routing {
                pointer: PointerKind::Touch,
                touch_id: Some(TouchId(id)),
            },
        );
        ActiveGesture::begin(1, &start).unwrap()
    }

    fn touch(id: u64, x: f64, y: f64) -> Touch {
        Touch {
            id: TouchId(id),
            page: Point::new(x, y),
        }
    }

    #[test]
    fn begin_requires_routing() {
        let update = mouse_session().update_event();
        assert_eq!(update.kind, MoveKind::Move);
        assert_eq!(update.routing(), None);
        assert!(ActiveGesture::begin(1_u32, &update).is_none());
    }

    #[test]
    fn samples_update_delta_from_start() {
        let mut s = mouse_session();
        let ev = PointerEvent::mouse(PointerEventKind::MouseMove, 1, Point::new(110.0, 95.0));
        assert_eq!(
            s.on_sample(&ev),
            Sample::Updated {
                request_frame: true,
                prevent_default: false
            }
        );
        let update = s.update_event();
        assert_eq!(update.page, Point::new(110.0, 95.0));
        assert_eq!(update.delta, Vec2::new(10.0, -5.0));
        assert_eq!(update.start, Point::new(100.0, 100.0));

        let ev = PointerEvent::mouse(PointerEventKind::MouseMove, 1, Point::new(112.0, 100.0));
        assert_eq!(
            s.on_sample(&ev),
            Sample::Updated {
                request_frame: false,
                prevent_default: false
            }
        );
        assert_eq!(s.update_event().delta, Vec2::new(12.0, 0.0));
    }

    #[test]
    fn other_family_is_ignored() {
        let mut s = mouse_session();
        let ev = PointerEvent::touch(PointerEventKind::TouchMove, 1, vec![touch(1, 50.0, 50.0)]);
        assert_eq!(s.on_sample(&ev), Sample::Ignored);
        assert!(!s.is_end(&PointerEvent::touch(PointerEventKind::TouchEnd, 1, vec![])));
        assert!(s.is_end(&PointerEvent::mouse(
            PointerEventKind::MouseUp,
            1,
            Point::ORIGIN
        )));
    }

    #[test]
    fn multi_touch_sample_is_dropped() {
        let mut s = touch_session(3);
        let ev = PointerEvent::touch(
            PointerEventKind::TouchMove,
            1,
            vec![touch(3, 40.0, 40.0), touch(4, 0.0, 0.0)],
        );
        assert_eq!(s.on_sample(&ev), Sample::MultiTouch);
        assert_eq!(s.update_event().page, Point::new(0.0, 5.0));
        assert!(!s.is_scheduled());
    }

    #[test]
    fn single_touch_sample_prevents_scrolling() {
        let mut s = touch_session(3);
        let ev = PointerEvent::touch(PointerEventKind::TouchMove, 1, vec![touch(3, 7.0, 9.0)]);
        assert_eq!(
            s.on_sample(&ev),
            Sample::Updated {
                request_frame: true,
                prevent_default: true
            }
        );
        assert_eq!(s.update_event().delta, Vec2::new(7.0, 9.0));
    }

    #[test]
    fn touch_end_waits_for_tracked_contact() {
        let s = touch_session(3);
        let other_lifted =
            PointerEvent::touch(PointerEventKind::TouchEnd, 1, vec![touch(3, 1.0, 1.0)]);
        assert!(!s.is_end(&other_lifted));
        let tracked_lifted =
            PointerEvent::touch(PointerEventKind::TouchEnd, 1, vec![touch(4, 1.0, 1.0)]);
        assert!(s.is_end(&tracked_lifted));
        let cancelled = PointerEvent::touch(PointerEventKind::TouchCancel, 1, vec![]);
        assert!(s.is_end(&cancelled));
    }

    #[test]
    fn end_event_reuses_last_position() {
        let mut s = mouse_session();
        let ev = PointerEvent::mouse(PointerEventKind::MouseMove, 1, Point::new(112.0, 100.0));
        s.on_sample(&ev);
        let end = s.end_event();
        assert_eq!(end.kind, MoveKind::MoveEnd);
        assert_eq!(end.page, Point::new(112.0, 100.0));
        assert_eq!(end.delta, Vec2::new(12.0, 0.0));
        assert_eq!(s.target(), 1);
    }
}
