// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Move recognizer: the process-wide dispatcher for raw pointer input.
//!
//! ## Overview
//!
//! One [`MoveRecognizer`] sees every raw pointer event of a document. It
//! arms a pending detection on pointer-down, activates a gesture once the
//! pointer travels past the threshold, and tracks the active gesture until
//! release. The ancestor search for a subscribed element happens lazily, at
//! the moment the threshold is crossed.
//!
//! ## Host loop
//!
//! - Deliver raw events with [`MoveRecognizer::handle`] and honor the returned
//!   [`Disposition`].
//! - When the [`Scheduler`] is asked for a frame, call
//!   [`MoveRecognizer::on_frame`] near the next paint.
//! - When the [`Scheduler`] is asked to defer, call
//!   [`MoveRecognizer::run_deferred`] after the current turn.
//!
//! ## Signal order
//!
//! - `movestart` is emitted synchronously from the move that crossed the threshold.
//! - `move` is emitted from frames, at most once per frame, with the latest position.
//! - `moveend` is emitted once, after any update still queued for the gesture.
//! - A released gesture waiting for its frame is finished before the next
//!   `movestart` on the same pointer family, so gestures never overlap.
//!
//! ## Click suppression
//!
//! While a mouse gesture is active, clicks on the gesture's element (or its
//! descendants) are prevented and stopped, so the release is not read as a
//! separate click. The guard is lifted by [`MoveRecognizer::run_deferred`]
//! after the gesture ends, once the platform has had its turn to emit the
//! trailing click.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::config::MoveConfig;
use crate::detector::{GestureOrigin, PendingGesture, Step};
use crate::frame::{Fire, Scheduler, Stop};
use crate::logging::{debug, trace};
use crate::subscriptions::{SubscriptionTable, Transition};
use crate::tracker::{ActiveGesture, Sample};
use crate::types::{
    Disposition, ElementTree, MoveEvent, MoveKind, MoveKinds, MoveSink, NoParent, Outcome,
    PointerEvent, PointerEventKind, PointerKind, ancestors,
};

/// Work that must wait until the current event-loop turn has finished.
#[derive(Copy, Clone, Debug)]
enum Deferred<K> {
    ReleaseClickGuard(K),
}

/// Turns raw pointer input into `movestart` → `move` → `moveend` signals.
///
/// ## Usage
///
/// - Construct with [`MoveRecognizer::new`] (or [`MoveRecognizer::with_config`])
///   around the host's [`ElementTree`].
/// - Mirror gesture subscriptions with [`MoveRecognizer::subscribe`] and
///   [`MoveRecognizer::unsubscribe`]; the returned [`Transition`] says when to
///   install or remove native default-action suppressors.
/// - Drive it from the host loop (see the module docs).
///
/// ```
/// use kurbo::Point;
/// use understory_move::frame::IntervalScheduler;
/// use understory_move::recognizer::MoveRecognizer;
/// use understory_move::types::{MoveEvent, MoveKind, NoParent, PointerEvent, PointerEventKind};
///
/// let mut recognizer: MoveRecognizer<u32> = MoveRecognizer::new(NoParent);
/// recognizer.subscribe(1, MoveKind::Move);
///
/// let mut signals: Vec<(u32, MoveEvent)> = Vec::new();
/// let mut clock = IntervalScheduler::default();
/// let at = |kind, x| PointerEvent::mouse(kind, 1, Point::new(x, 0.0));
///
/// recognizer.handle(&at(PointerEventKind::MouseDown, 0.0), &mut signals, &mut clock);
/// recognizer.handle(&at(PointerEventKind::MouseMove, 4.0), &mut signals, &mut clock);
/// recognizer.handle(&at(PointerEventKind::MouseMove, 9.0), &mut signals, &mut clock);
/// recognizer.on_frame(0, &mut signals, &mut clock);
/// recognizer.handle(&at(PointerEventKind::MouseUp, 9.0), &mut signals, &mut clock);
/// recognizer.on_frame(16_000_000, &mut signals, &mut clock);
///
/// let kinds: Vec<MoveKind> = signals.iter().map(|(_, e)| e.kind).collect();
/// assert_eq!(kinds, [MoveKind::MoveStart, MoveKind::Move, MoveKind::MoveEnd]);
/// assert_eq!(signals[2].1.delta.x, 9.0);
/// ```
pub struct MoveRecognizer<K, T = NoParent> {
    tree: T,
    config: MoveConfig,
    subscriptions: SubscriptionTable<K>,
    pending: Option<PendingGesture<K>>,
    active: Option<ActiveGesture<K>>,
    // Released gestures whose timer still has a queued update or drain.
    ending: Vec<ActiveGesture<K>>,
    click_guards: HashMap<K, u32>,
    deferred: Vec<Deferred<K>>,
    frame_requested: bool,
}

impl<K: Copy + Eq + Hash, T> core::fmt::Debug for MoveRecognizer<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MoveRecognizer")
            .field("config", &self.config)
            .field("guarded", &self.subscriptions.len())
            .field("pending", &self.pending.is_some())
            .field("moving", &self.active.is_some())
            .field("ending", &self.ending.len())
            .field("click_guards", &self.click_guards.len())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash, T: ElementTree<K>> MoveRecognizer<K, T> {
    /// Create a recognizer with the default configuration.
    pub fn new(tree: T) -> Self {
        Self::with_config(tree, MoveConfig::default())
    }

    /// Create a recognizer with an explicit configuration.
    pub fn with_config(tree: T, config: MoveConfig) -> Self {
        Self {
            tree,
            config,
            subscriptions: SubscriptionTable::new(),
            pending: None,
            active: None,
            ending: Vec::new(),
            click_guards: HashMap::new(),
            deferred: Vec::new(),
            frame_requested: false,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &MoveConfig {
        &self.config
    }

    /// Replace the configuration. Applies to the next threshold check.
    pub fn set_config(&mut self, config: MoveConfig) {
        self.config = config;
    }

    /// The element tree.
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access to the element tree, for hosts that own it here.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// The subscription table.
    pub fn subscriptions(&self) -> &SubscriptionTable<K> {
        &self.subscriptions
    }

    /// Record a subscriber of `kind` on `element`.
    pub fn subscribe(&mut self, element: K, kind: MoveKind) -> Transition {
        let transition = self.subscriptions.subscribe(element, kind);
        if transition == Transition::Installed {
            debug!(?kind, "element guarded for move gestures");
        }
        transition
    }

    /// Remove a subscriber of `kind` from `element`.
    pub fn unsubscribe(&mut self, element: K, kind: MoveKind) -> Transition {
        let transition = self.subscriptions.unsubscribe(element, kind);
        if transition == Transition::Removed {
            debug!(?kind, "element no longer guarded for move gestures");
        }
        transition
    }

    /// Kinds subscribed on `element`.
    pub fn subscribed_kinds(&self, element: &K) -> MoveKinds {
        self.subscriptions.kinds(element)
    }

    /// Whether a pointer-down is waiting for movement past the threshold.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pointer family of the pending detection, if any.
    pub fn pending_pointer(&self) -> Option<PointerKind> {
        self.pending.as_ref().map(|p| p.origin().pointer)
    }

    /// Whether a gesture is active (started and not yet released).
    pub fn is_moving(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer family of the active gesture, if any.
    pub fn moving_pointer(&self) -> Option<PointerKind> {
        self.active.as_ref().map(ActiveGesture::pointer)
    }

    /// Whether any gesture still needs a frame to deliver an update or its end.
    pub fn wants_frame(&self) -> bool {
        !self.ending.is_empty() || self.active.as_ref().is_some_and(ActiveGesture::is_scheduled)
    }

    /// Whether clicks on `node` are currently suppressed.
    pub fn is_click_guarded(&self, node: &K) -> bool {
        ancestors(&self.tree, *node).any(|n| self.click_guards.contains_key(&n))
    }

    /// Process one raw pointer event.
    ///
    /// Returns what the host should do with the raw event's native behavior.
    pub fn handle<S, C>(
        &mut self,
        event: &PointerEvent<K>,
        sink: &mut S,
        scheduler: &mut C,
    ) -> Disposition
    where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        let mut disposition = self.suppression(event);
        match event.kind {
            PointerEventKind::Click => return disposition,
            PointerEventKind::MouseDown | PointerEventKind::TouchStart => {
                self.arm(event);
                return disposition;
            }
            _ => {}
        }

        if let Some(pending) = &self.pending {
            match pending.step(event, &self.config, &self.subscriptions, &self.tree) {
                Step::Wait => {}
                Step::Disarm => {
                    debug!("move detection disarmed");
                    self.pending = None;
                }
                Step::Activate(target, start) => {
                    self.pending = None;
                    self.activate(target, &start, sink, scheduler);
                }
            }
            return disposition;
        }

        let Some(gesture) = self.active.as_mut() else {
            return disposition;
        };
        if gesture.is_end(event) {
            self.release(sink, scheduler);
            return disposition;
        }
        match gesture.on_sample(event) {
            Sample::Updated {
                request_frame,
                prevent_default,
            } => {
                if request_frame {
                    self.request_frame(scheduler);
                }
                if prevent_default {
                    disposition |= Disposition::PREVENT_DEFAULT;
                }
            }
            Sample::MultiTouch => trace!("multi-touch sample dropped"),
            Sample::Ignored => {}
        }
        disposition
    }

    /// Run one frame: deliver throttled updates and drain released gestures.
    pub fn on_frame<S, C>(
        &mut self,
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables, reason = "logged only"))]
        frame_time_nanos: u64,
        sink: &mut S,
        scheduler: &mut C,
    ) where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        trace!(frame_time_nanos, "move frame");
        self.frame_requested = false;

        // Released gestures are older than the active one; they go first.
        for mut gesture in core::mem::take(&mut self.ending) {
            let fire = gesture.tick();
            if let Some(gesture) = self.fire(gesture, fire, sink, scheduler) {
                self.ending.push(gesture);
            }
        }

        if let Some(mut gesture) = self.active.take() {
            let fire = gesture.tick();
            self.active = self.fire(gesture, fire, sink, scheduler);
        }
    }

    /// Run work deferred until after the current turn: lifts click guards of
    /// ended mouse gestures.
    pub fn run_deferred(&mut self) {
        for task in core::mem::take(&mut self.deferred) {
            match task {
                Deferred::ReleaseClickGuard(target) => {
                    if let Some(count) = self.click_guards.get_mut(&target) {
                        *count = count.saturating_sub(1);
                        if *count == 0 {
                            self.click_guards.remove(&target);
                            debug!("click guard released");
                        }
                    }
                }
            }
        }
    }

    fn suppression(&self, event: &PointerEvent<K>) -> Disposition {
        match event.kind {
            // Keep the element from selecting text or scrolling, but leave
            // form controls inside it alone.
            PointerEventKind::MouseDown | PointerEventKind::TouchStart
                if !self.tree.is_text_input(&event.target) && self.is_guarded(event.target) =>
            {
                Disposition::PREVENT_DEFAULT
            }
            // Keep the element from being dragged natively.
            PointerEventKind::DragStart | PointerEventKind::Drag
                if self.is_guarded(event.target) =>
            {
                Disposition::PREVENT_DEFAULT
            }
            PointerEventKind::Click if self.is_click_guarded(&event.target) => {
                Disposition::PREVENT_DEFAULT | Disposition::STOP_PROPAGATION
            }
            _ => Disposition::empty(),
        }
    }

    fn is_guarded(&self, node: K) -> bool {
        self.subscriptions
            .nearest_subscriber(&self.tree, node)
            .is_some()
    }

    fn arm(&mut self, event: &PointerEvent<K>) {
        // One gesture per pointer stream.
        if self.active.is_some() {
            return;
        }
        if let Some(origin) = GestureOrigin::capture(event, &self.tree) {
            debug!(
                pointer = ?origin.pointer,
                x = origin.start.x,
                y = origin.start.y,
                "move detection armed"
            );
            self.pending = Some(PendingGesture::new(origin));
        }
    }

    fn activate<S, C>(&mut self, target: K, start: &MoveEvent, sink: &mut S, scheduler: &mut C)
    where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        if let Some(routing) = start.routing() {
            self.flush_ending(routing.pointer, sink, scheduler);
        }
        debug!(
            x = start.page.x,
            y = start.page.y,
            dx = start.delta.x,
            dy = start.delta.y,
            "movestart"
        );
        if sink.emit(target, start) == Outcome::PreventDefault {
            debug!("movestart prevented; not tracking");
            return;
        }
        let Some(gesture) = ActiveGesture::begin(target, start) else {
            return;
        };
        if gesture.pointer() == PointerKind::Mouse {
            *self.click_guards.entry(target).or_insert(0) += 1;
        }
        self.active = Some(gesture);
    }

    /// Finish released gestures of `pointer` that are still waiting for a
    /// frame, so their `moveend` precedes the next `movestart` on that stream.
    fn flush_ending<S, C>(&mut self, pointer: PointerKind, sink: &mut S, scheduler: &mut C)
    where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        let (draining, kept): (Vec<_>, Vec<_>) = core::mem::take(&mut self.ending)
            .into_iter()
            .partition(|g| g.pointer() == pointer);
        self.ending = kept;
        for mut gesture in draining {
            trace!("moveend flushed ahead of frame");
            let fire = gesture.tick();
            if let Some(gesture) = self.fire(gesture, fire, sink, scheduler) {
                self.ending.push(gesture);
            }
        }
    }

    fn release<S, C>(&mut self, sink: &mut S, scheduler: &mut C)
    where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        let Some(mut gesture) = self.active.take() else {
            return;
        };
        match gesture.stop() {
            Stop::DrainNow => self.finish(gesture, sink, scheduler),
            Stop::Queued => {
                trace!("moveend queued behind frame");
                self.ending.push(gesture);
            }
            Stop::AlreadyStopped => {}
        }
    }

    /// Apply a timer firing; returns the gesture if it is still live.
    fn fire<S, C>(
        &mut self,
        gesture: ActiveGesture<K>,
        fire: Fire,
        sink: &mut S,
        scheduler: &mut C,
    ) -> Option<ActiveGesture<K>>
    where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        match fire {
            Fire::Nothing => Some(gesture),
            Fire::Update => {
                Self::emit_update(&gesture, sink);
                self.request_frame(scheduler);
                Some(gesture)
            }
            Fire::UpdateThenDrain => {
                Self::emit_update(&gesture, sink);
                self.finish(gesture, sink, scheduler);
                None
            }
            Fire::Drain => {
                self.finish(gesture, sink, scheduler);
                None
            }
        }
    }

    fn emit_update<S: MoveSink<K> + ?Sized>(gesture: &ActiveGesture<K>, sink: &mut S) {
        let update = gesture.update_event();
        trace!(dx = update.delta.x, dy = update.delta.y, "move");
        sink.emit(gesture.target(), &update);
    }

    fn finish<S, C>(&mut self, mut gesture: ActiveGesture<K>, sink: &mut S, scheduler: &mut C)
    where
        S: MoveSink<K> + ?Sized,
        C: Scheduler + ?Sized,
    {
        let end = gesture.end_event();
        debug!(dx = end.delta.x, dy = end.delta.y, "moveend");
        sink.emit(gesture.target(), &end);
        if gesture.pointer() == PointerKind::Mouse {
            self.deferred
                .push(Deferred::ReleaseClickGuard(gesture.target()));
            scheduler.defer();
        }
    }

    fn request_frame<C: Scheduler + ?Sized>(&mut self, scheduler: &mut C) {
        if !self.frame_requested {
            self.frame_requested = true;
            scheduler.request_frame();
        }
    }
}
