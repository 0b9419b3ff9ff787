// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending detection: from pointer-down until movement crosses the threshold.

use core::hash::Hash;

use kurbo::Point;

use crate::config::MoveConfig;
use crate::subscriptions::SubscriptionTable;
use crate::types::{
    ElementTree, MouseButton, MoveEvent, PointerEvent, PointerEventKind, PointerKind, Routing,
    TouchId,
};

/// Where and how a pointer stream began. Immutable once captured.
#[derive(Copy, Clone, Debug)]
pub(crate) struct GestureOrigin<K> {
    pub(crate) target: K,
    pub(crate) start: Point,
    pub(crate) pointer: PointerKind,
    pub(crate) touch_id: Option<TouchId>,
}

impl<K: Copy> GestureOrigin<K> {
    /// Capture an origin from a pointer-down, or `None` when the press cannot
    /// start a gesture.
    pub(crate) fn capture<T: ElementTree<K> + ?Sized>(
        event: &PointerEvent<K>,
        tree: &T,
    ) -> Option<Self> {
        let (pointer, touch_id) = match event.kind {
            PointerEventKind::MouseDown if event.button == MouseButton::Primary => {
                (PointerKind::Mouse, None)
            }
            PointerEventKind::TouchStart if event.touches.len() <= 1 => {
                (PointerKind::Touch, event.touches.first().map(|t| t.id))
            }
            _ => return None,
        };
        // Leave typing and selection in form controls alone.
        if tree.is_text_input(&event.target) {
            return None;
        }
        Some(Self {
            target: event.target,
            start: event.sample(touch_id).page,
            pointer,
            touch_id,
        })
    }

    fn routing(&self) -> Routing {
        Routing {
            pointer: self.pointer,
            touch_id: self.touch_id,
        }
    }
}

/// What a pending detection wants after seeing an event.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Step<K> {
    /// Keep waiting.
    Wait,
    /// Stop listening; no signal.
    Disarm,
    /// Threshold crossed with a subscriber found: emit `movestart` on it.
    Activate(K, MoveEvent),
}

/// The armed move and cancel listeners of one pointer stream.
#[derive(Clone, Debug)]
pub(crate) struct PendingGesture<K> {
    origin: GestureOrigin<K>,
}

impl<K: Copy + Eq + Hash> PendingGesture<K> {
    pub(crate) fn new(origin: GestureOrigin<K>) -> Self {
        Self { origin }
    }

    pub(crate) fn origin(&self) -> &GestureOrigin<K> {
        &self.origin
    }

    /// React to a raw event while armed.
    pub(crate) fn step<T: ElementTree<K> + ?Sized>(
        &self,
        event: &PointerEvent<K>,
        config: &MoveConfig,
        subscriptions: &SubscriptionTable<K>,
        tree: &T,
    ) -> Step<K> {
        use PointerEventKind::*;
        match (self.origin.pointer, event.kind) {
            (PointerKind::Mouse, MouseMove) | (PointerKind::Touch, TouchMove) => {
                self.on_move(event, config, subscriptions, tree)
            }
            (PointerKind::Mouse, MouseUp | DragStart)
            | (PointerKind::Touch, TouchEnd | TouchCancel) => Step::Disarm,
            _ => Step::Wait,
        }
    }

    fn on_move<T: ElementTree<K> + ?Sized>(
        &self,
        event: &PointerEvent<K>,
        config: &MoveConfig,
        subscriptions: &SubscriptionTable<K>,
        tree: &T,
    ) -> Step<K> {
        let page = event.sample(self.origin.touch_id).page;
        // Always measured from the pointer-down position.
        if !config.exceeds_threshold(page - self.origin.start) {
            return Step::Wait;
        }
        match subscriptions.nearest_subscriber(tree, self.origin.target) {
            Some(target) => Step::Activate(
                target,
                MoveEvent::start(page, self.origin.start, self.origin.routing()),
            ),
            // Nobody listens yet; stay armed until the pointer is released.
            None => Step::Wait,
        }
    }
}
