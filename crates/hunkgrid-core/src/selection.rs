//! Drag-to-select row ranges on one side of the grid

use crate::change::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A finished selection, emitted on release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedRange {
    pub side: Side,
    /// First selected row index (inclusive)
    pub start: usize,
    /// Last selected row index (inclusive)
    pub end: usize,
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    start: usize,
    side: Side,
}

/// Selection state for one file's grid.
///
/// Idle until a row is pressed, dragging until release. Rows visited while
/// dragging may arrive in any order and need not be contiguous. Crossing the
/// row the drag started on discards what was collected on the other side.
/// On release the selection collapses to the full span between the lowest
/// and highest remaining row.
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    file_path: String,
    selected: BTreeSet<usize>,
    side: Option<Side>,
    drag: Option<Drag>,
}

impl RowSelection {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn selected_rows(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn is_selected(&self, row: usize, side: Side) -> bool {
        self.side == Some(side) && self.selected.contains(&row)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Mouse down on `row` of `side`.
    ///
    /// Pressing the only selected row again clears the selection instead of
    /// starting a drag.
    pub fn handle_row_selection_start(&mut self, row: usize, side: Side) {
        let sole_selected = self.side == Some(side)
            && self.selected.len() == 1
            && self.selected.contains(&row);
        if sole_selected && self.drag.is_none() {
            self.clear();
            return;
        }
        self.selected.clear();
        self.selected.insert(row);
        self.side = Some(side);
        self.drag = Some(Drag { start: row, side });
    }

    /// Pointer entered `row` while the button is held
    pub fn handle_row_selection_update(&mut self, row: usize) {
        let Some(drag) = self.drag else {
            return;
        };
        if row < drag.start {
            self.selected.retain(|&r| r <= drag.start);
        } else if row > drag.start {
            self.selected.retain(|&r| r >= drag.start);
        }
        self.selected.insert(row);
    }

    /// Mouse up; returns the contiguous range when a drag was in progress
    pub fn handle_row_selection_end(&mut self) -> Option<SelectedRange> {
        let drag = self.drag.take()?;
        let start = self.selected.first().copied().unwrap_or(drag.start);
        let end = self.selected.last().copied().unwrap_or(drag.start);
        self.selected = (start..=end).collect();
        log::debug!(
            "Selected rows {}..={} on {:?} of {}",
            start,
            end,
            drag.side,
            self.file_path
        );
        Some(SelectedRange {
            side: drag.side,
            start,
            end,
            file_path: self.file_path.clone(),
        })
    }

    /// Click anywhere outside the grid
    pub fn handle_outside_click(&mut self) {
        self.clear();
    }

    /// Start over for another file
    pub fn reset(&mut self, file_path: impl Into<String>) {
        self.file_path = file_path.into();
        self.clear();
    }

    fn clear(&mut self) {
        self.selected.clear();
        self.side = None;
        self.drag = None;
    }
}
