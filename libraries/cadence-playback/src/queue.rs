//! Playback queue model
//!
//! The single source of truth for playback order:
//!
//! ```text
//!   history   history   CURRENT   upcoming   upcoming
//!   [ B ]     [ A ]     [ D ]     [ A ]      [ C ]
//! ```
//!
//! Entry states are never stored; they are derived from the current pointer,
//! which makes "at most one current" and history/upcoming contiguity hold by
//! construction. The queue is non-empty exactly when it has a current entry.

use crate::error::{PlaybackError, Result};
use crate::shuffle::fisher_yates;
use crate::types::{EntryKey, EntryState, QueueEntry};
use cadence_core::TrackId;
use rand::Rng;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct Slot {
    key: EntryKey,
    track_id: TrackId,
}

/// Queue order captured when shuffling begins
///
/// Consumed exactly once by `unshuffle`; replaced by every fresh shuffle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnshuffledSnapshot {
    order: Vec<EntryKey>,
}

impl UnshuffledSnapshot {
    /// Entry keys in pre-shuffle order
    pub fn order(&self) -> &[EntryKey] {
        &self.order
    }
}

/// Structural edit performed by a queue mutation
///
/// `QueueView` replays these to stay parallel to the model without
/// re-rendering every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueChange {
    /// Order replaced wholesale (build, shuffle, unshuffle)
    Rebuilt,

    /// One entry inserted at `position`
    Inserted { position: usize },

    /// The entry at `position` was removed
    Removed { position: usize },

    /// One entry moved
    Moved { from: usize, to: usize },

    /// Entries removed by key, anywhere in the queue
    Pruned { removed: Vec<EntryKey> },

    /// Only the current pointer moved
    PointerMoved {
        from: Option<usize>,
        to: Option<usize>,
    },

    /// Nothing changed
    Unchanged,
}

/// Result of `QueueModel::remove_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// The removed entry, with the state it had before removal
    pub removed: QueueEntry,

    /// Structural edit for the view
    pub change: QueueChange,

    /// A different entry became current
    pub current_changed: bool,

    /// The queue is now empty and playback must stop
    pub stop: bool,
}

/// Ordered queue of track ids with a current pointer
#[derive(Debug, Clone, Default)]
pub struct QueueModel {
    slots: Vec<Slot>,
    current: Option<usize>,
    snapshot: Option<UnshuffledSnapshot>,
    shuffled: bool,
    next_key: u64,
}

impl QueueModel {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, track_id: TrackId) -> Slot {
        let key = EntryKey::new(self.next_key);
        self.next_key += 1;
        Slot { key, track_id }
    }

    fn entry_at(&self, position: usize, slot: &Slot) -> QueueEntry {
        QueueEntry {
            key: slot.key,
            track_id: slot.track_id.clone(),
            state: EntryState::at(position, self.current),
        }
    }

    // ===== Queries =====

    /// Number of entries
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Position of the current entry
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Current entry
    pub fn current(&self) -> Option<QueueEntry> {
        self.current.and_then(|index| self.entry(index))
    }

    /// Track id of the current entry
    pub fn current_track(&self) -> Option<&TrackId> {
        self.current
            .and_then(|index| self.slots.get(index))
            .map(|slot| &slot.track_id)
    }

    /// Entry at `position`
    pub fn entry(&self, position: usize) -> Option<QueueEntry> {
        self.slots
            .get(position)
            .map(|slot| self.entry_at(position, slot))
    }

    /// All entries in playback order
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.slots
            .iter()
            .enumerate()
            .map(|(position, slot)| self.entry_at(position, slot))
            .collect()
    }

    /// Track ids in playback order
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.slots.iter().map(|slot| slot.track_id.clone()).collect()
    }

    /// Entry keys in playback order
    pub fn keys(&self) -> Vec<EntryKey> {
        self.slots.iter().map(|slot| slot.key).collect()
    }

    /// Position of the entry with `key`
    pub fn position_of(&self, key: EntryKey) -> Option<usize> {
        self.slots.iter().position(|slot| slot.key == key)
    }

    /// Derived state of the entry at `position`
    pub fn state_at(&self, position: usize) -> Option<EntryState> {
        (position < self.slots.len()).then(|| EntryState::at(position, self.current))
    }

    /// Check if an entry follows the current one
    pub fn has_next(&self) -> bool {
        self.current
            .is_some_and(|current| current + 1 < self.slots.len())
    }

    /// Check if an entry precedes the current one
    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|current| current > 0)
    }

    /// Whether the queue is in a shuffled session
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Saved pre-shuffle order, if any
    pub fn snapshot(&self) -> Option<&UnshuffledSnapshot> {
        self.snapshot.as_ref()
    }

    // ===== Mutations =====

    /// Replace the queue with `candidates`, making `selected` current
    ///
    /// The first entry matching `selected` becomes current. Leaves the queue
    /// untouched and returns `NotFound` if `selected` is not a candidate.
    /// Ends any shuffled session.
    pub fn build_from(&mut self, candidates: &[TrackId], selected: &TrackId) -> Result<QueueChange> {
        let current = candidates
            .iter()
            .position(|id| id == selected)
            .ok_or_else(|| PlaybackError::NotFound(selected.clone()))?;

        let slots: Vec<Slot> = candidates.iter().map(|id| self.slot(id.clone())).collect();
        self.slots = slots;
        self.current = Some(current);
        self.snapshot = None;
        self.shuffled = false;

        tracing::debug!(len = self.slots.len(), current, "Queue rebuilt from candidates");
        Ok(QueueChange::Rebuilt)
    }

    /// Insert `track_id` immediately after the current entry
    ///
    /// On an empty queue the inserted entry becomes current.
    pub fn insert_next(&mut self, track_id: TrackId) -> QueueChange {
        let slot = self.slot(track_id);
        let position = match self.current {
            Some(current) => {
                self.slots.insert(current + 1, slot);
                current + 1
            }
            None => {
                self.slots.push(slot);
                self.current = Some(0);
                0
            }
        };

        QueueChange::Inserted { position }
    }

    /// Append `track_id` at the end
    ///
    /// On an empty queue the appended entry becomes current.
    pub fn append(&mut self, track_id: TrackId) -> QueueChange {
        let slot = self.slot(track_id);
        self.slots.push(slot);
        if self.current.is_none() {
            self.current = Some(0);
        }

        QueueChange::Inserted {
            position: self.slots.len() - 1,
        }
    }

    /// Remove the entry at `position`
    ///
    /// Removing the current entry hands "current" to the entry that slides
    /// into its slot, or to the new last entry when it was last. Removing the
    /// only entry empties the queue and signals `stop`.
    pub fn remove_at(&mut self, position: usize) -> Result<RemoveOutcome> {
        if position >= self.slots.len() {
            return Err(PlaybackError::IndexOutOfBounds(position));
        }

        let state = EntryState::at(position, self.current);
        let slot = self.slots.remove(position);
        let removed = QueueEntry {
            key: slot.key,
            track_id: slot.track_id,
            state,
        };

        let mut current_changed = false;
        let mut stop = false;

        match self.current {
            Some(current) if position < current => self.current = Some(current - 1),
            Some(current) if position == current => {
                if self.slots.is_empty() {
                    self.current = None;
                    stop = true;
                } else {
                    self.current = Some(position.min(self.slots.len() - 1));
                    current_changed = true;
                }
            }
            _ => {}
        }

        Ok(RemoveOutcome {
            removed,
            change: QueueChange::Removed { position },
            current_changed,
            stop,
        })
    }

    /// Move the entry at `from` so it ends up at `to`
    ///
    /// The current entry keeps its identity; states are re-derived from its
    /// new position, so a move can turn history into upcoming and back.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<QueueChange> {
        let len = self.slots.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }
        if from == to {
            return Ok(QueueChange::Unchanged);
        }

        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);

        if let Some(current) = self.current {
            self.current = Some(if from == current {
                to
            } else if from < current && to >= current {
                current - 1
            } else if from > current && to <= current {
                current + 1
            } else {
                current
            });
        }

        Ok(QueueChange::Moved { from, to })
    }

    /// Make the entry at `position` current
    pub fn jump_to(&mut self, position: usize) -> Result<QueueChange> {
        if position >= self.slots.len() {
            return Err(PlaybackError::IndexOutOfBounds(position));
        }

        let from = self.current;
        self.current = Some(position);
        Ok(QueueChange::PointerMoved {
            from,
            to: Some(position),
        })
    }

    /// Move the pointer to the next entry, if there is one
    pub fn advance(&mut self) -> Option<QueueChange> {
        let current = self.current?;
        if current + 1 >= self.slots.len() {
            return None;
        }

        self.current = Some(current + 1);
        Some(QueueChange::PointerMoved {
            from: Some(current),
            to: Some(current + 1),
        })
    }

    /// Move the pointer to the previous entry, if there is one
    pub fn retreat(&mut self) -> Option<QueueChange> {
        let current = self.current?;
        if current == 0 {
            return None;
        }

        self.current = Some(current - 1);
        Some(QueueChange::PointerMoved {
            from: Some(current),
            to: Some(current - 1),
        })
    }

    /// Drop every entry except the current one
    pub fn clear_upcoming_and_history(&mut self) -> QueueChange {
        let keep: HashSet<EntryKey> = self
            .current
            .and_then(|index| self.slots.get(index))
            .map(|slot| slot.key)
            .into_iter()
            .collect();
        self.retain_keys(&keep)
    }

    /// Drop every entry whose key is not in `keep`
    ///
    /// The current entry always survives.
    pub fn retain_keys(&mut self, keep: &HashSet<EntryKey>) -> QueueChange {
        let current_key = self
            .current
            .and_then(|index| self.slots.get(index))
            .map(|slot| slot.key);

        let mut removed = Vec::new();
        self.slots.retain(|slot| {
            let kept = keep.contains(&slot.key) || Some(slot.key) == current_key;
            if !kept {
                removed.push(slot.key);
            }
            kept
        });

        self.current = current_key.and_then(|key| self.position_of(key));

        if removed.is_empty() {
            QueueChange::Unchanged
        } else {
            QueueChange::Pruned { removed }
        }
    }

    /// Shuffle using the thread-local generator
    pub fn shuffle(&mut self) -> QueueChange {
        self.shuffle_with(&mut rand::thread_rng())
    }

    /// Shuffle: current entry to the front, everything else permuted
    ///
    /// Saves the pre-shuffle order first. With one or no other entries the
    /// permutation is a no-op but the queue still enters the shuffled state.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> QueueChange {
        self.shuffled = true;

        let Some(current) = self.current else {
            self.snapshot = None;
            return QueueChange::Unchanged;
        };

        self.snapshot = Some(UnshuffledSnapshot { order: self.keys() });

        let playing = self.slots.remove(current);
        fisher_yates(&mut self.slots, rng);
        self.slots.insert(0, playing);
        self.current = Some(0);

        tracing::debug!(len = self.slots.len(), "Queue shuffled");
        QueueChange::Rebuilt
    }

    /// Restore the order saved by the last shuffle
    ///
    /// Entries removed since the shuffle stay removed; entries added since
    /// are kept after the restored ones in their present order. The current
    /// entry does not change, only its position.
    pub fn unshuffle(&mut self) -> Result<QueueChange> {
        self.shuffled = false;
        let snapshot = self.snapshot.take().ok_or(PlaybackError::NoSnapshot)?;

        let current_key = self
            .current
            .and_then(|index| self.slots.get(index))
            .map(|slot| slot.key);

        let mut by_key: HashMap<EntryKey, Slot> = self
            .slots
            .iter()
            .map(|slot| (slot.key, slot.clone()))
            .collect();

        let mut restored: Vec<Slot> = snapshot
            .order
            .iter()
            .filter_map(|key| by_key.remove(key))
            .collect();
        restored.extend(
            self.slots
                .iter()
                .filter(|slot| by_key.contains_key(&slot.key))
                .cloned(),
        );

        self.slots = restored;
        self.current = current_key.and_then(|key| self.position_of(key));

        tracing::debug!(len = self.slots.len(), current = ?self.current, "Queue unshuffled");
        Ok(QueueChange::Rebuilt)
    }
}
