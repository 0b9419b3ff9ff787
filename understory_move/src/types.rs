// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for move gestures: raw pointer input, gesture payloads, and host seams.
//!
//! ## Overview
//!
//! Raw input enters through [`PointerEvent`] and is consumed by
//! [`MoveRecognizer::handle`](crate::recognizer::MoveRecognizer::handle).
//! Gesture signals leave through a [`MoveSink`] as [`MoveEvent`] payloads.
//! Element ancestry is read through [`ElementTree`].

use alloc::vec::Vec;
use core::time::Duration;

use kurbo::{Point, Vec2};

/// Input family of a pointer stream.
///
/// Each family has its own event names and multi-contact rules; see
/// [`PointerEventKind::pointer_kind`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerKind {
    /// Mouse or pen reported through mouse events.
    Mouse,
    /// Touch contacts.
    Touch,
}

/// Mouse button reported with a mouse-down.
///
/// Only [`Primary`](MouseButton::Primary) presses can start a move gesture.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MouseButton {
    /// Main button, usually the left one.
    #[default]
    Primary,
    /// Wheel or middle button.
    Auxiliary,
    /// Secondary button, usually the right one.
    Secondary,
    /// Any other button, by platform index.
    Other(u16),
}

/// Identifier of a touch contact, stable for the lifetime of that contact.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TouchId(pub u64);

/// A single active touch contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touch {
    /// Contact identifier.
    pub id: TouchId,
    /// Page position of the contact.
    pub page: Point,
}

/// Kind of a raw pointer event delivered by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerEventKind {
    /// A mouse button was pressed.
    MouseDown,
    /// The mouse moved.
    MouseMove,
    /// A mouse button was released.
    MouseUp,
    /// The platform is about to start a native drag.
    DragStart,
    /// The platform is continuing a native drag.
    Drag,
    /// The platform produced a click.
    Click,
    /// A contact touched the surface.
    TouchStart,
    /// One or more contacts moved.
    TouchMove,
    /// One or more contacts left the surface.
    TouchEnd,
    /// The platform cancelled one or more contacts.
    TouchCancel,
}

impl PointerEventKind {
    /// Returns the pointer family this event belongs to, if any.
    ///
    /// Native drag and click events carry no pointer family.
    pub const fn pointer_kind(self) -> Option<PointerKind> {
        match self {
            Self::MouseDown | Self::MouseMove | Self::MouseUp => Some(PointerKind::Mouse),
            Self::TouchStart | Self::TouchMove | Self::TouchEnd | Self::TouchCancel => {
                Some(PointerKind::Touch)
            }
            Self::DragStart | Self::Drag | Self::Click => None,
        }
    }
}

/// A raw pointer event, as produced by the host's event substrate.
///
/// For touch events, `touches` lists the contacts still on the surface after
/// the event (so a `TouchEnd` does not include the lifted contact).
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent<K> {
    /// Event kind.
    pub kind: PointerEventKind,
    /// Element the event was dispatched to.
    pub target: K,
    /// Page position of the event.
    pub page: Point,
    /// Button for mouse events; [`MouseButton::Primary`] otherwise.
    pub button: MouseButton,
    /// Contacts currently on the surface (touch events only).
    pub touches: Vec<Touch>,
    /// Host timestamp of the event.
    pub timestamp: Duration,
}

impl<K> PointerEvent<K> {
    /// Build a mouse, native drag, or click event at `page`.
    pub fn mouse(kind: PointerEventKind, target: K, page: Point) -> Self {
        Self {
            kind,
            target,
            page,
            button: MouseButton::Primary,
            touches: Vec::new(),
            timestamp: Duration::ZERO,
        }
    }

    /// Build a touch event from the contacts currently on the surface.
    ///
    /// The event's page position is taken from the first contact, or the
    /// origin when no contact remains.
    pub fn touch(kind: PointerEventKind, target: K, touches: Vec<Touch>) -> Self {
        let page = touches.first().map_or(Point::ORIGIN, |t| t.page);
        Self {
            kind,
            target,
            page,
            button: MouseButton::Primary,
            touches,
            timestamp: Duration::ZERO,
        }
    }

    /// Set the mouse button.
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Set the host timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the contact with the given identifier, if it is still on the surface.
    pub fn contact(&self, id: TouchId) -> Option<&Touch> {
        self.touches.iter().find(|t| t.id == id)
    }

    /// Extract the sample for a pointer stream.
    ///
    /// When `tracked` names a contact that is still on the surface, its
    /// position is used; otherwise the event's page position is.
    pub fn sample(&self, tracked: Option<TouchId>) -> PointerSample {
        let contact = tracked.and_then(|id| self.contact(id));
        PointerSample {
            page: contact.map_or(self.page, |t| t.page),
            pointer_id: contact.map(|t| t.id),
            timestamp: self.timestamp,
        }
    }
}

/// A position sample taken from one raw event.
///
/// Samples are transient: they are read during a single
/// [`handle`](crate::recognizer::MoveRecognizer::handle) call and never stored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerSample {
    /// Page position.
    pub page: Point,
    /// Contact identifier, for touch samples.
    pub pointer_id: Option<TouchId>,
    /// Host timestamp.
    pub timestamp: Duration,
}

/// The three gesture signals, which are also the subscribable event kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MoveKind {
    /// Movement crossed the activation threshold.
    MoveStart,
    /// Throttled position update.
    Move,
    /// The pointer was released.
    MoveEnd,
}

impl MoveKind {
    /// All kinds, in signal order.
    pub const ALL: [Self; 3] = [Self::MoveStart, Self::Move, Self::MoveEnd];

    /// The single-kind flag set for this kind.
    pub const fn flag(self) -> MoveKinds {
        match self {
            Self::MoveStart => MoveKinds::MOVE_START,
            Self::Move => MoveKinds::MOVE,
            Self::MoveEnd => MoveKinds::MOVE_END,
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::MoveStart => 0,
            Self::Move => 1,
            Self::MoveEnd => 2,
        }
    }
}

bitflags::bitflags! {
    /// Set of gesture kinds an element is subscribed to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MoveKinds: u8 {
        /// `movestart` has at least one subscriber.
        const MOVE_START = 0b0000_0001;
        /// `move` has at least one subscriber.
        const MOVE       = 0b0000_0010;
        /// `moveend` has at least one subscriber.
        const MOVE_END   = 0b0000_0100;
    }
}

bitflags::bitflags! {
    /// What the host should do with the raw event it just delivered.
    ///
    /// Returned by [`MoveRecognizer::handle`](crate::recognizer::MoveRecognizer::handle).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Disposition: u8 {
        /// Suppress the native default action (drag, selection, scroll).
        const PREVENT_DEFAULT  = 0b0000_0001;
        /// Stop propagating the raw event.
        const STOP_PROPAGATION = 0b0000_0010;
    }
}

/// Internal routing carried by `movestart` only.
///
/// Identifies the pointer stream the gesture follows. Subscribers normally
/// have no use for it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Routing {
    /// Pointer family of the gesture.
    pub pointer: PointerKind,
    /// Tracked contact, for touch gestures.
    pub touch_id: Option<TouchId>,
}

/// Payload delivered to subscribers with each gesture signal.
///
/// `delta` is always `page - start`, where `start` is the position of the
/// pointer-down that began the gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveEvent {
    /// Which signal this is.
    pub kind: MoveKind,
    /// Current page position.
    pub page: Point,
    /// Page position at pointer-down.
    pub start: Point,
    /// Distance moved since pointer-down.
    pub delta: Vec2,
    pub(crate) routing: Option<Routing>,
}

impl MoveEvent {
    pub(crate) fn start(page: Point, start: Point, routing: Routing) -> Self {
        Self {
            kind: MoveKind::MoveStart,
            page,
            start,
            delta: page - start,
            routing: Some(routing),
        }
    }

    /// Routing of the pointer stream; present on `movestart` only.
    pub fn routing(&self) -> Option<Routing> {
        self.routing
    }
}

/// Subscriber verdict for an emitted signal.
///
/// Only meaningful for `movestart`: returning
/// [`PreventDefault`](Outcome::PreventDefault) there cancels tracking, so no
/// `move`/`moveend` signals follow. The verdict for other signals is ignored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Outcome {
    /// Let the default reaction run.
    #[default]
    Continue,
    /// Cancel the default reaction.
    PreventDefault,
}

/// Deliver gesture signals to the host's event bus.
///
/// The host routes `event` to the subscribers of `event.kind` on `target`.
pub trait MoveSink<K> {
    /// Emit one signal on `target` and report the subscribers' verdict.
    fn emit(&mut self, target: K, event: &MoveEvent) -> Outcome;
}

impl<K, F> MoveSink<K> for F
where
    F: FnMut(K, &MoveEvent) -> Outcome,
{
    fn emit(&mut self, target: K, event: &MoveEvent) -> Outcome {
        self(target, event)
    }
}

/// Records every signal and always continues.
impl<K> MoveSink<K> for Vec<(K, MoveEvent)> {
    fn emit(&mut self, target: K, event: &MoveEvent) -> Outcome {
        self.push((target, *event));
        Outcome::Continue
    }
}

/// Read-only view of the host's element tree.
///
/// The recognizer walks ancestors to find subscribed elements, to match
/// click guards, and to apply default-action suppression.
pub trait ElementTree<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;

    /// Whether `node` is a text-input-like control (text area, input, select).
    ///
    /// Pointer-downs on such controls never start a gesture and are never
    /// suppressed, so typing and selection keep working.
    fn is_text_input(&self, _node: &K) -> bool {
        false
    }
}

/// A flat tree: every node is a root and nothing is a text input.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ElementTree<K> for NoParent {
    #[inline]
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

/// Walk from `node` (inclusive) to its root.
pub(crate) fn ancestors<K: Copy, T: ElementTree<K> + ?Sized>(
    tree: &T,
    node: K,
) -> impl Iterator<Item = K> {
    core::iter::successors(Some(node), move |n| tree.parent_of(n))
}
