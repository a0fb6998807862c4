//! Bounded undo window over committed placements, most recent first.
//!
//! Pushing past capacity evicts the oldest entry, which makes that
//! placement permanent: once evicted, no sequence of undos reaches it
//! again. The window is cleared on goal advancement (no undoing across a
//! goal boundary) and on banishment, and is never persisted.

use bevy::prelude::*;
use std::collections::VecDeque;

/// Most-recent-first sequence of committed objects.
#[derive(Resource, Debug, Default)]
pub struct UndoHistory {
    entries: VecDeque<Entity>,
}

impl UndoHistory {
    /// Record a commit. Returns the evicted (now permanent) entity when
    /// the push exceeds `capacity`.
    pub fn push(&mut self, entity: Entity, capacity: usize) -> Option<Entity> {
        self.entries.push_front(entity);
        if self.entries.len() > capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Remove and return the most recent commit.
    pub fn pop_front(&mut self) -> Option<Entity> {
        self.entries.pop_front()
    }

    /// Forget everything (goal boundary, banishment).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most-recent-first iteration, for HUD display.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.iter()
    }
}
