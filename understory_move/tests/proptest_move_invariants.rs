// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariant tests for the move recognizer.
//!
//! 1. Activation happens exactly when the threshold is crossed
//! 2. Every payload's delta is `page - start`
//! 3. `move` is paced by frames, at most once per gesture per frame
//! 4. Every started gesture ends exactly once
//! 5. At most one gesture is open at a time on the mouse stream
//! 6. Updates carry the latest sampled position

use kurbo::{Point, Vec2};
use proptest::prelude::*;
use understory_move::frame::Scheduler;
use understory_move::recognizer::MoveRecognizer;
use understory_move::types::{MoveEvent, MoveKind, NoParent, PointerEvent, PointerEventKind};

// ── Harness ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Clock {
    frames_requested: usize,
    deferred: usize,
}

impl Scheduler for Clock {
    fn request_frame(&mut self) {
        self.frames_requested += 1;
    }

    fn defer(&mut self) {
        self.deferred += 1;
    }
}

/// Mouse input on a single subscribed element.
#[derive(Debug, Clone)]
enum Op {
    Down(f64, f64),
    Move(f64, f64),
    Up,
    Frame,
    Deferred,
}

fn coord() -> impl Strategy<Value = f64> {
    (-200i16..200).prop_map(f64::from)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (coord(), coord()).prop_map(|(x, y)| Op::Down(x, y)),
        6 => (coord(), coord()).prop_map(|(x, y)| Op::Move(x, y)),
        1 => Just(Op::Up),
        2 => Just(Op::Frame),
        1 => Just(Op::Deferred),
    ]
}

struct Run {
    recognizer: MoveRecognizer<u32>,
    clock: Clock,
    signals: Vec<(u32, MoveEvent)>,
    last: Point,
    frame: u64,
}

impl Run {
    fn new() -> Self {
        let mut recognizer = MoveRecognizer::new(NoParent);
        recognizer.subscribe(1, MoveKind::Move);
        Self {
            recognizer,
            clock: Clock::default(),
            signals: Vec::new(),
            last: Point::ORIGIN,
            frame: 0,
        }
    }

    fn mouse(&mut self, kind: PointerEventKind, page: Point) {
        let event = PointerEvent::mouse(kind, 1, page);
        self.recognizer
            .handle(&event, &mut self.signals, &mut self.clock);
    }

    fn frame(&mut self) {
        self.frame += 16_666_667;
        self.recognizer
            .on_frame(self.frame, &mut self.signals, &mut self.clock);
    }

    /// Apply one op; returns the signals it produced.
    fn apply(&mut self, op: &Op) -> Vec<MoveEvent> {
        let before = self.signals.len();
        match *op {
            Op::Down(x, y) => {
                self.last = Point::new(x, y);
                self.mouse(PointerEventKind::MouseDown, self.last);
            }
            Op::Move(x, y) => {
                self.last = Point::new(x, y);
                self.mouse(PointerEventKind::MouseMove, self.last);
            }
            Op::Up => self.mouse(PointerEventKind::MouseUp, self.last),
            Op::Frame => self.frame(),
            Op::Deferred => self.recognizer.run_deferred(),
        }
        self.signals[before..].iter().map(|(_, e)| *e).collect()
    }

    /// Release and drain so every started gesture can finish.
    fn settle(&mut self) {
        self.apply(&Op::Up);
        self.apply(&Op::Frame);
        self.apply(&Op::Frame);
        self.apply(&Op::Deferred);
    }

    fn count(&self, kind: MoveKind) -> usize {
        self.signals.iter().filter(|(_, e)| e.kind == kind).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Threshold gate
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn activation_matches_threshold(
        x in coord(),
        y in coord(),
        dx in -6.0f64..6.0,
        dy in -6.0f64..6.0,
    ) {
        let mut run = Run::new();
        let start = Point::new(x, y);
        let page = Point::new(x + dx, y + dy);
        run.apply(&Op::Down(start.x, start.y));
        let out = run.apply(&Op::Move(page.x, page.y));

        let crossed = (page - start).hypot2() >= 9.0;
        prop_assert_eq!(out.len(), usize::from(crossed));
        if crossed {
            prop_assert_eq!(out[0].kind, MoveKind::MoveStart);
            prop_assert_eq!(out[0].start, start);
            prop_assert_eq!(out[0].delta, page - start);
        } else {
            prop_assert!(run.recognizer.is_pending(), "still armed below the threshold");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2–4. Arbitrary sequences
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn delta_is_always_page_minus_start(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut run = Run::new();
        for op in &ops {
            run.apply(op);
        }
        run.settle();
        for (_, e) in &run.signals {
            prop_assert_eq!(e.delta, e.page - e.start);
        }
    }

    #[test]
    fn moves_are_paced_by_frames(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut run = Run::new();
        for op in &ops {
            let live = run.count(MoveKind::MoveStart) - run.count(MoveKind::MoveEnd);
            let out = run.apply(op);
            let moves = out.iter().filter(|e| e.kind == MoveKind::Move).count();
            if let Op::Frame = op {
                prop_assert!(moves <= live, "at most one update per live gesture");
            } else {
                // Outside frames, an update only appears when a released gesture
                // is flushed, directly ahead of its end.
                for (i, e) in out.iter().enumerate() {
                    if e.kind == MoveKind::Move {
                        prop_assert_eq!(
                            out.get(i + 1).map(|n| n.kind),
                            Some(MoveKind::MoveEnd),
                            "{:?} emitted a free-standing update",
                            op
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn every_start_ends_exactly_once(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut run = Run::new();
        for op in &ops {
            run.apply(op);
            let started = run.count(MoveKind::MoveStart);
            let ended = run.count(MoveKind::MoveEnd);
            prop_assert!(ended <= started, "end without start");
        }
        run.settle();
        prop_assert_eq!(run.count(MoveKind::MoveStart), run.count(MoveKind::MoveEnd));
        prop_assert!(!run.recognizer.is_moving());
        prop_assert!(!run.recognizer.wants_frame());
        prop_assert!(!run.recognizer.is_click_guarded(&1));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Gestures never overlap
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn at_most_one_open_gesture(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut run = Run::new();
        let mut open = 0_i32;
        for op in &ops {
            for e in run.apply(op) {
                match e.kind {
                    MoveKind::MoveStart => open += 1,
                    MoveKind::MoveEnd => open -= 1,
                    MoveKind::Move => {
                        prop_assert_eq!(open, 1, "update outside a gesture");
                    }
                }
                prop_assert!((0..=1).contains(&open), "open gestures: {} after {:?}", open, op);
            }
        }
        let before = run.signals.len();
        run.settle();
        for (_, e) in &run.signals[before..] {
            match e.kind {
                MoveKind::MoveStart => open += 1,
                MoveKind::MoveEnd => open -= 1,
                MoveKind::Move => {}
            }
        }
        prop_assert_eq!(open, 0, "every gesture closed after release");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Throttled updates carry the latest sample
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_update_per_frame_with_latest_position(
        samples in prop::collection::vec((coord(), coord()), 1..30),
    ) {
        let mut run = Run::new();
        run.apply(&Op::Down(0.0, 0.0));
        run.apply(&Op::Move(50.0, 50.0));
        prop_assert!(run.recognizer.is_moving());

        for &(x, y) in &samples {
            run.apply(&Op::Move(x, y));
        }
        prop_assert_eq!(run.clock.frames_requested, 1, "requests coalesce");

        let out = run.apply(&Op::Frame);
        let (x, y) = samples[samples.len() - 1];
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(out[0].kind, MoveKind::Move);
        prop_assert_eq!(out[0].delta, Vec2::new(x, y));

        let end = run.apply(&Op::Up);
        prop_assert!(end.is_empty(), "end waits for the outstanding frame");
        let end = run.apply(&Op::Frame);
        prop_assert_eq!(end.len(), 1);
        prop_assert_eq!(end[0].kind, MoveKind::MoveEnd);
        prop_assert_eq!(end[0].page, Point::new(x, y));
        prop_assert_eq!(run.clock.deferred, 1);
    }
}
