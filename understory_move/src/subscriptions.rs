// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element subscription table for the three gesture kinds.
//!
//! ## Overview
//!
//! The table counts subscribers per element and kind. An element becomes
//! *guarded* when its first subscriber of any kind arrives and stops being
//! guarded when its last subscriber leaves; the returned [`Transition`] tells
//! the host when to install or remove its native default-action suppressors.
//! Transitions between one, two, and three subscribed kinds are
//! [`Unchanged`](Transition::Unchanged).
//!
//! ```
//! use understory_move::subscriptions::{SubscriptionTable, Transition};
//! use understory_move::types::{MoveKind, MoveKinds};
//!
//! let mut table: SubscriptionTable<u32> = SubscriptionTable::new();
//! assert_eq!(table.subscribe(1, MoveKind::Move), Transition::Installed);
//! assert_eq!(table.subscribe(1, MoveKind::MoveEnd), Transition::Unchanged);
//! assert_eq!(table.kinds(&1), MoveKinds::MOVE | MoveKinds::MOVE_END);
//! assert_eq!(table.unsubscribe(1, MoveKind::Move), Transition::Unchanged);
//! assert_eq!(table.unsubscribe(1, MoveKind::MoveEnd), Transition::Removed);
//! assert!(!table.is_guarded(&1));
//! ```

use core::hash::Hash;

use hashbrown::HashMap;

use crate::types::{ElementTree, MoveKind, MoveKinds, ancestors};

/// Change to an element's guard state caused by a subscription update.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// First subscriber of any kind: install drag and pointer-down suppressors.
    Installed,
    /// The element stays guarded (or stays unguarded).
    Unchanged,
    /// Last subscriber left: remove both suppressors.
    Removed,
}

#[derive(Copy, Clone, Debug, Default)]
struct Entry {
    counts: [u32; 3],
}

impl Entry {
    fn kinds(&self) -> MoveKinds {
        MoveKind::ALL
            .iter()
            .filter(|k| self.counts[k.slot()] > 0)
            .fold(MoveKinds::empty(), |acc, k| acc | k.flag())
    }
}

/// Reference-counted subscriptions keyed by element identity.
#[derive(Clone, Debug)]
pub struct SubscriptionTable<K> {
    entries: HashMap<K, Entry>,
}

impl<K> Default for SubscriptionTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> SubscriptionTable<K> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one subscriber of `kind` on `element`.
    pub fn subscribe(&mut self, element: K, kind: MoveKind) -> Transition {
        let entry = self.entries.entry(element).or_default();
        let was_guarded = !entry.kinds().is_empty();
        entry.counts[kind.slot()] = entry.counts[kind.slot()].saturating_add(1);
        if was_guarded {
            Transition::Unchanged
        } else {
            Transition::Installed
        }
    }

    /// Remove one subscriber of `kind` from `element`.
    ///
    /// Unsubscribing a kind that has no subscribers is a no-op.
    pub fn unsubscribe(&mut self, element: K, kind: MoveKind) -> Transition {
        let Some(entry) = self.entries.get_mut(&element) else {
            return Transition::Unchanged;
        };
        let slot = &mut entry.counts[kind.slot()];
        if *slot == 0 {
            return Transition::Unchanged;
        }
        *slot -= 1;
        if entry.kinds().is_empty() {
            self.entries.remove(&element);
            Transition::Removed
        } else {
            Transition::Unchanged
        }
    }

    /// Kinds with at least one subscriber on `element`.
    pub fn kinds(&self, element: &K) -> MoveKinds {
        self.entries
            .get(element)
            .map_or(MoveKinds::empty(), Entry::kinds)
    }

    /// Number of subscribers of `kind` on `element`.
    pub fn count(&self, element: &K, kind: MoveKind) -> u32 {
        self.entries
            .get(element)
            .map_or(0, |e| e.counts[kind.slot()])
    }

    /// Whether `element` has any gesture subscriber (and so its suppressors installed).
    pub fn is_guarded(&self, element: &K) -> bool {
        self.entries.contains_key(element)
    }

    /// Number of guarded elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no element is guarded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest guarded element from `node` (inclusive) up to its root.
    ///
    /// Reads the table as it is now, so subscribers attached after a
    /// pointer-down are found.
    pub fn nearest_subscriber<T: ElementTree<K> + ?Sized>(&self, tree: &T, node: K) -> Option<K> {
        ancestors(tree, node).find(|n| self.is_guarded(n))
    }
}
