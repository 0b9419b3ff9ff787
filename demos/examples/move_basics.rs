// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Move basics.
//!
//! A slider thumb inside a track: a mouse drag starts on the thumb, the
//! gesture is delivered to the subscribed track, and the host applies each
//! `move` to the thumb position.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_move_demos --example move_basics`

use kurbo::Point;
use understory_move::frame::Scheduler;
use understory_move::recognizer::MoveRecognizer;
use understory_move::types::{
    ElementTree, MoveEvent, MoveKind, Outcome, PointerEvent, PointerEventKind,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Node {
    Track,
    Thumb,
}

struct Slider;
impl ElementTree<Node> for Slider {
    fn parent_of(&self, node: &Node) -> Option<Node> {
        match node {
            Node::Thumb => Some(Node::Track),
            Node::Track => None,
        }
    }
}

/// Frames run when the demo says so; deferred work runs at the end of each step.
#[derive(Default)]
struct Host {
    frame_due: bool,
    deferred_due: bool,
}

impl Scheduler for Host {
    fn request_frame(&mut self) {
        self.frame_due = true;
    }

    fn defer(&mut self) {
        self.deferred_due = true;
    }
}

struct Thumb {
    origin: f64,
    x: f64,
}

impl Thumb {
    fn on_signal(&mut self, target: Node, ev: &MoveEvent) -> Outcome {
        match ev.kind {
            MoveKind::MoveStart => self.origin = self.x,
            MoveKind::Move | MoveKind::MoveEnd => {
                self.x = (self.origin + ev.delta.x).clamp(0.0, 200.0);
            }
        }
        println!(
            "  {:?} on {:?}: page=({:.0}, {:.0}) delta=({:.0}, {:.0}) thumb={:.0}",
            ev.kind, target, ev.page.x, ev.page.y, ev.delta.x, ev.delta.y, self.x
        );
        Outcome::Continue
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut recognizer = MoveRecognizer::new(Slider);
    for kind in MoveKind::ALL {
        recognizer.subscribe(Node::Track, kind);
    }

    let mut thumb = Thumb { origin: 0.0, x: 40.0 };
    let mut host = Host::default();
    let mut sink = |target: Node, ev: &MoveEvent| thumb.on_signal(target, ev);

    let script = [
        (PointerEventKind::MouseDown, 40.0),
        (PointerEventKind::MouseMove, 41.0),
        (PointerEventKind::MouseMove, 46.0),
        (PointerEventKind::MouseMove, 60.0),
        (PointerEventKind::MouseMove, 75.0),
        (PointerEventKind::MouseMove, 90.0),
        (PointerEventKind::MouseUp, 90.0),
        (PointerEventKind::Click, 90.0),
    ];

    let mut frame = 0_u64;
    for (step, (kind, x)) in script.into_iter().enumerate() {
        let event = PointerEvent::mouse(kind, Node::Thumb, Point::new(x, 12.0));
        let disposition = recognizer.handle(&event, &mut sink, &mut host);
        println!("{kind:?} at x={x:.0} -> {disposition:?}");

        // Pretend a paint happens every other input event.
        if step % 2 == 1 && core::mem::take(&mut host.frame_due) {
            frame += 16_666_667;
            recognizer.on_frame(frame, &mut sink, &mut host);
        }
        // The platform's click follows the release in the same turn.
        if kind != PointerEventKind::MouseUp && core::mem::take(&mut host.deferred_due) {
            recognizer.run_deferred();
        }
    }
    while core::mem::take(&mut host.frame_due) {
        frame += 16_666_667;
        recognizer.on_frame(frame, &mut sink, &mut host);
    }
    if core::mem::take(&mut host.deferred_due) {
        recognizer.run_deferred();
    }
    println!("final: {recognizer:?}");
}
