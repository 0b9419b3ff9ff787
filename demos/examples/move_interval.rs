// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interval-clocked touch drag.
//!
//! A host without an animation-frame primitive drives the recognizer with
//! [`IntervalScheduler`]. Touch samples arrive every 4ms; `move` signals are
//! delivered at most every 25ms, each with the latest position. A second
//! finger landing mid-gesture is ignored.
//!
//! Run:
//! - `RUST_LOG=understory_move=trace,move_interval=info cargo run -p understory_move_demos --example move_interval`

use std::time::Duration;

use kurbo::Point;
use understory_move::frame::IntervalScheduler;
use understory_move::recognizer::MoveRecognizer;
use understory_move::types::{
    Disposition, MoveEvent, MoveKind, MoveSink, NoParent, Outcome, PointerEvent,
    PointerEventKind, Touch, TouchId,
};

const ROW: u32 = 7;
const ROW_HEIGHT: f64 = 48.0;

fn contact(id: u64, y: f64) -> Touch {
    Touch {
        id: TouchId(id),
        page: Point::new(120.0, y),
    }
}

/// Host loop state: the recognizer, its clock, and the current time.
struct Host {
    recognizer: MoveRecognizer<u32>,
    clock: IntervalScheduler,
    now: Duration,
}

impl Host {
    /// Deliver one event at the current time, then run a frame if one is due.
    fn send<S: MoveSink<u32>>(&mut self, event: PointerEvent<u32>, sink: &mut S) -> Disposition {
        let disposition = self
            .recognizer
            .handle(&event.at(self.now), sink, &mut self.clock);
        self.poll(sink);
        disposition
    }

    fn poll<S: MoveSink<u32>>(&mut self, sink: &mut S) {
        if let Some(frame) = self.clock.poll_frame(self.now) {
            let nanos = u64::try_from(frame.as_nanos()).unwrap_or(u64::MAX);
            self.recognizer.on_frame(nanos, sink, &mut self.clock);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut recognizer: MoveRecognizer<u32> = MoveRecognizer::new(NoParent);
    recognizer.subscribe(ROW, MoveKind::MoveStart);
    recognizer.subscribe(ROW, MoveKind::MoveEnd);
    let clock = IntervalScheduler::from_config(recognizer.config());
    let mut host = Host {
        recognizer,
        clock,
        now: Duration::ZERO,
    };

    let mut updates = 0_u32;
    let mut sink = |target: u32, ev: &MoveEvent| {
        let rows = (ev.delta.y / ROW_HEIGHT).round();
        match ev.kind {
            MoveKind::MoveStart => tracing::info!(row = target, "row picked up"),
            MoveKind::Move => {
                updates += 1;
                tracing::info!(dy = ev.delta.y, rows, "row follows finger");
            }
            MoveKind::MoveEnd => tracing::info!(rows, "row dropped"),
        }
        Outcome::Continue
    };

    host.send(
        PointerEvent::touch(PointerEventKind::TouchStart, ROW, vec![contact(1, 200.0)]),
        &mut sink,
    );
    let mut samples = 0_u32;
    for i in 1..=60 {
        host.now += Duration::from_millis(4);
        let y = 200.0 + f64::from(i) * 2.5;
        let touches = if (20..30).contains(&i) {
            vec![contact(1, y), contact(2, 400.0)]
        } else {
            vec![contact(1, y)]
        };
        let disposition = host.send(
            PointerEvent::touch(PointerEventKind::TouchMove, ROW, touches),
            &mut sink,
        );
        samples += 1;
        tracing::debug!(?disposition, y, "sample");
    }
    host.now += Duration::from_millis(4);
    host.send(
        PointerEvent::touch(PointerEventKind::TouchEnd, ROW, vec![]),
        &mut sink,
    );
    // Let the outstanding frame drain the gesture.
    while host.recognizer.wants_frame() {
        host.now += Duration::from_millis(5);
        host.poll(&mut sink);
    }

    println!("{samples} touch samples -> {updates} move signals");
}
