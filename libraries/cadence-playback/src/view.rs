//! Rendered projection of the queue
//!
//! `QueueView` mirrors `QueueModel` row for row. It never feeds back into
//! playback decisions; the renderer drains `RowPatch` values and applies them
//! to its own list elements.

use crate::queue::{QueueChange, QueueModel};
use crate::types::{EntryKey, EntryState};
use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One rendered queue row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRow {
    /// Entry this row renders
    pub key: EntryKey,

    /// Track shown in the row
    pub track_id: TrackId,

    /// Visual state tag
    pub state: EntryState,

    /// Hidden by the active filter
    pub hidden: bool,
}

/// Edit the renderer must apply to its rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RowPatch {
    /// Replace every row
    Replace { rows: Vec<QueueRow> },

    /// Insert one row
    Insert { position: usize, row: QueueRow },

    /// Remove one row
    Remove { position: usize },

    /// Move one row
    Move { from: usize, to: usize },

    /// Retag one row
    SetState { position: usize, state: EntryState },

    /// Show or hide one row
    SetHidden { position: usize, hidden: bool },
}

/// Vertical bounds of a rendered row, as measured by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowBox {
    /// Row position in the queue
    pub position: usize,

    /// Top edge
    pub top: f64,

    /// Row height
    pub height: f64,
}

/// Row list kept parallel to a `QueueModel`
#[derive(Debug, Clone, Default)]
pub struct QueueView {
    rows: Vec<QueueRow>,
    patches: Vec<RowPatch>,
}

impl QueueView {
    /// Create new empty view
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in display order
    pub fn rows(&self) -> &[QueueRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if view has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys of rows not hidden by the filter, in display order
    pub fn visible_keys(&self) -> Vec<EntryKey> {
        self.rows
            .iter()
            .filter(|row| !row.hidden)
            .map(|row| row.key)
            .collect()
    }

    /// Take the patches recorded since the last drain
    pub fn drain_patches(&mut self) -> Vec<RowPatch> {
        std::mem::take(&mut self.patches)
    }

    /// Replace every row from `model`
    ///
    /// Rows that survive by key keep their hidden flag.
    pub fn render(&mut self, model: &QueueModel) {
        let hidden: HashSet<EntryKey> = self
            .rows
            .iter()
            .filter(|row| row.hidden)
            .map(|row| row.key)
            .collect();

        self.rows = model
            .entries()
            .into_iter()
            .map(|entry| QueueRow {
                hidden: hidden.contains(&entry.key),
                key: entry.key,
                track_id: entry.track_id,
                state: entry.state,
            })
            .collect();

        self.patches.clear();
        self.patches.push(RowPatch::Replace {
            rows: self.rows.clone(),
        });
    }

    /// Replay `change` so the rows match `model` again
    ///
    /// Falls back to a full render if the incremental edit leaves the rows
    /// out of step with the model.
    pub fn sync(&mut self, model: &QueueModel, change: &QueueChange) {
        match change {
            QueueChange::Rebuilt => {
                self.render(model);
                return;
            }
            QueueChange::Inserted { position } => {
                if let Some(entry) = model.entry(*position) {
                    if *position <= self.rows.len() {
                        let row = QueueRow {
                            key: entry.key,
                            track_id: entry.track_id,
                            state: entry.state,
                            hidden: false,
                        };
                        self.rows.insert(*position, row.clone());
                        self.patches.push(RowPatch::Insert {
                            position: *position,
                            row,
                        });
                    }
                }
            }
            QueueChange::Removed { position } => {
                if *position < self.rows.len() {
                    self.rows.remove(*position);
                    self.patches.push(RowPatch::Remove {
                        position: *position,
                    });
                }
            }
            QueueChange::Moved { from, to } => {
                if *from < self.rows.len() && *to < self.rows.len() {
                    let row = self.rows.remove(*from);
                    self.rows.insert(*to, row);
                    self.patches.push(RowPatch::Move {
                        from: *from,
                        to: *to,
                    });
                }
            }
            QueueChange::Pruned { removed } => {
                let removed: HashSet<EntryKey> = removed.iter().copied().collect();
                for position in (0..self.rows.len()).rev() {
                    if removed.contains(&self.rows[position].key) {
                        self.rows.remove(position);
                        self.patches.push(RowPatch::Remove { position });
                    }
                }
            }
            QueueChange::PointerMoved { .. } | QueueChange::Unchanged => {}
        }

        self.refresh_states(model);

        if !self.is_parallel_to(model) {
            tracing::warn!(
                rows = self.rows.len(),
                entries = model.len(),
                ?change,
                "Queue view out of step, re-rendering"
            );
            self.render(model);
        }
    }

    /// Retag every row whose derived state changed
    pub fn refresh_states(&mut self, model: &QueueModel) {
        for (position, row) in self.rows.iter_mut().enumerate() {
            let Some(state) = model.state_at(position) else {
                break;
            };
            if row.state != state {
                row.state = state;
                self.patches.push(RowPatch::SetState { position, state });
            }
        }
    }

    /// Hide every row for which `visible` returns false
    pub fn apply_filter<F>(&mut self, visible: F)
    where
        F: Fn(&QueueRow) -> bool,
    {
        for (position, row) in self.rows.iter_mut().enumerate() {
            let hidden = !visible(row);
            if row.hidden != hidden {
                row.hidden = hidden;
                self.patches.push(RowPatch::SetHidden { position, hidden });
            }
        }
    }

    /// Show every row
    pub fn clear_filter(&mut self) {
        self.apply_filter(|_| true);
    }

    /// Final position for the row dragged from `dragged` and dropped at `y`
    ///
    /// The row is dropped before the nearest row whose vertical centre lies
    /// below `y`. Hidden rows and the dragged row itself never qualify. With
    /// no qualifying row the dragged row goes to the end.
    pub fn drop_target(&self, dragged: usize, boxes: &[RowBox], y: f64) -> usize {
        let anchor = boxes
            .iter()
            .filter(|bounds| bounds.position != dragged)
            .filter(|bounds| {
                self.rows
                    .get(bounds.position)
                    .is_some_and(|row| !row.hidden)
            })
            .map(|bounds| (bounds.position, y - bounds.top - bounds.height / 2.0))
            .filter(|(_, offset)| *offset < 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(position, _)| position);

        match anchor {
            Some(anchor) if anchor > dragged => anchor - 1,
            Some(anchor) => anchor,
            None => self.rows.len().saturating_sub(1),
        }
    }

    /// Check the rows mirror `model` in order, identity and state
    pub fn is_parallel_to(&self, model: &QueueModel) -> bool {
        self.rows.len() == model.len()
            && self
                .rows
                .iter()
                .zip(model.entries())
                .all(|(row, entry)| row.key == entry.key && row.state == entry.state)
    }
}
