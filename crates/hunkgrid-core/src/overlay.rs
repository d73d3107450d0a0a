//! Overlay docking: slot grouping and debounced hover notifications
//!
//! Overlays are floating decorations that dock into numbered slots of the
//! hovered row (number cells and the code cell). Grouping depends only on
//! the overlays and the display mode. Hover handling is explicit state: the
//! caller reports enters and leaves with a timestamp and later calls
//! [`OverlayDock::poll`] to collect the notifications that have come due.

use crate::change::{DisplayMode, Side};
use crate::line_pair::LinePair;
use crate::row::RowView;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_HOVER_DEBOUNCE: Duration = Duration::from_millis(100);

/// Slot count per mode: two number cells in split mode, plus the code cell
/// in unified mode
fn slot_count(mode: DisplayMode) -> usize {
    match mode {
        DisplayMode::Split => 2,
        DisplayMode::Unified => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub id: String,
    pub content: String,
    pub unified_dock_idx: i32,
    pub split_dock_idx: i32,
    /// Whether hovering a row produces a [`DockNotification`] for this overlay
    #[serde(default)]
    pub notify_on_dock: bool,
}

impl Overlay {
    fn slot(&self, mode: DisplayMode) -> Option<usize> {
        let idx = match mode {
            DisplayMode::Split => self.split_dock_idx,
            DisplayMode::Unified => self.unified_dock_idx,
        };
        usize::try_from(idx)
            .ok()
            .filter(|&slot| slot < slot_count(mode))
    }
}

/// The hovered line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockEvent {
    pub line_number: u32,
    pub side: Side,
    pub content: String,
}

impl DockEvent {
    /// Left side unless it carries no line number
    fn resolve(pair: &LinePair, mode: DisplayMode) -> Option<Self> {
        if pair.is_hunk() {
            return None;
        }
        let view = RowView::new(pair, mode);
        let (side, line_number) = match view.line_number(Side::Left) {
            Some(n) => (Side::Left, n),
            None => (Side::Right, view.line_number(Side::Right)?),
        };
        Some(Self {
            line_number,
            side,
            content: view.content(side).unwrap_or_default().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockNotification {
    pub overlay_id: String,
    pub event: DockEvent,
}

#[derive(Debug, Clone)]
struct Pending {
    deadline: Instant,
    event: DockEvent,
}

pub struct OverlayDock {
    overlays: Vec<Overlay>,
    mode: DisplayMode,
    debounce: Duration,
    groups: BTreeMap<usize, Vec<String>>,
    pending: FxHashMap<usize, Pending>,
    /// Rows notified since they were last left
    notified: FxHashSet<usize>,
}

impl OverlayDock {
    pub fn new(overlays: Vec<Overlay>, mode: DisplayMode, debounce: Duration) -> Self {
        let mut dock = Self {
            overlays,
            mode,
            debounce,
            groups: BTreeMap::new(),
            pending: FxHashMap::default(),
            notified: FxHashSet::default(),
        };
        dock.regroup();
        dock
    }

    fn regroup(&mut self) {
        self.groups.clear();
        for overlay in &self.overlays {
            match overlay.slot(self.mode) {
                Some(slot) => self
                    .groups
                    .entry(slot)
                    .or_default()
                    .push(overlay.content.clone()),
                None => log::trace!(
                    "Overlay {} has no valid {:?} slot",
                    overlay.id,
                    self.mode
                ),
            }
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Overlay contents per slot, in input order
    pub fn overlay_groups(&self) -> &BTreeMap<usize, Vec<String>> {
        &self.groups
    }

    /// Groups to render on `pair`; hunk rows get none
    pub fn groups_for_row(&self, pair: &LinePair) -> Option<&BTreeMap<usize, Vec<String>>> {
        if pair.is_hunk() || self.groups.is_empty() {
            return None;
        }
        Some(&self.groups)
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.mode != mode {
            self.mode = mode;
            self.regroup();
            // Row contents differ between modes
            self.rows_changed();
        }
    }

    pub fn set_overlays(&mut self, overlays: Vec<Overlay>) {
        self.overlays = overlays;
        self.regroup();
    }

    /// The row sequence was replaced (an expansion or a reset). Row indices
    /// no longer name the same lines, so hover state starts over.
    pub fn rows_changed(&mut self) {
        self.pending.clear();
        self.notified.clear();
    }

    /// Overlays that want notifications and are docked in the current mode
    fn notifying(&self) -> impl Iterator<Item = &Overlay> {
        let mode = self.mode;
        self.overlays
            .iter()
            .filter(move |o| o.notify_on_dock && o.slot(mode).is_some())
    }

    /// Pointer entered row `row` of `pairs`.
    ///
    /// Returns whether a notification is now scheduled for the row. Entering
    /// again before it fires pushes the deadline back.
    pub fn handle_row_enter(&mut self, row: usize, pairs: &[LinePair], now: Instant) -> bool {
        if self.notifying().next().is_none() {
            return false;
        }
        if self.notified.contains(&row) {
            return false;
        }
        let Some(event) = pairs
            .get(row)
            .and_then(|pair| DockEvent::resolve(pair, self.mode))
        else {
            return false;
        };
        log::trace!(
            "Scheduling dock notification for row {} ({:?} {})",
            row,
            event.side,
            event.line_number
        );
        self.pending.insert(
            row,
            Pending {
                deadline: now + self.debounce,
                event,
            },
        );
        true
    }

    /// Pointer left row `row`; cancels anything pending for it
    pub fn handle_row_leave(&mut self, row: usize) {
        self.pending.remove(&row);
        self.notified.remove(&row);
    }

    /// Notifications due at `now`, one per notifying overlay per row
    pub fn poll(&mut self, now: Instant) -> Vec<DockNotification> {
        let mut due: Vec<(usize, Pending)> = Vec::new();
        self.pending.retain(|&row, pending| {
            if pending.deadline <= now {
                due.push((row, pending.clone()));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(row, pending)| (pending.deadline, *row));

        let mut notifications = Vec::new();
        for (row, pending) in due {
            self.notified.insert(row);
            for overlay in self.notifying() {
                notifications.push(DockNotification {
                    overlay_id: overlay.id.clone(),
                    event: pending.event.clone(),
                });
            }
        }
        notifications
    }

    /// Earliest pending deadline, for timer-driven loops
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }
}
