//! Read-only projection of one [`LinePair`] for rendering

use crate::change::{DisplayMode, Side};
use crate::line_pair::{LinePair, LineType};
use serde::{Deserialize, Serialize};

/// Where a widget renders relative to its target line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetPosition {
    Top,
    #[default]
    Bottom,
}

/// A line-anchored decoration, rendered as an extra row next to its line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub content: String,
    pub line_number: u32,
    pub side: Side,
    #[serde(default)]
    pub position: WidgetPosition,
}

/// A row as seen by a renderer in a given mode
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pair: &'a LinePair,
    mode: DisplayMode,
}

impl<'a> RowView<'a> {
    pub fn new(pair: &'a LinePair, mode: DisplayMode) -> Self {
        Self { pair, mode }
    }

    pub fn pair(&self) -> &'a LinePair {
        self.pair
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_hunk(&self) -> bool {
        self.pair.is_hunk()
    }

    /// Side whose content a single-column renderer should show.
    ///
    /// Unified rows always keep their content on the left. Split rows use
    /// the left side unless it is filler (a pure addition).
    pub fn authoritative_side(&self) -> Side {
        match self.mode {
            DisplayMode::Unified => Side::Left,
            DisplayMode::Split => match self.pair.type_left {
                Some(LineType::Empty) | None if self.pair.type_right.is_some() => Side::Right,
                _ => Side::Left,
            },
        }
    }

    pub fn kind(&self, side: Side) -> Option<LineType> {
        match self.mode {
            DisplayMode::Unified => self.pair.type_left,
            DisplayMode::Split => self.pair.kind(side),
        }
    }

    pub fn content(&self, side: Side) -> Option<&'a str> {
        match self.mode {
            DisplayMode::Unified => self.pair.content(Side::Left),
            DisplayMode::Split => self.pair.content(side),
        }
    }

    pub fn highlighted(&self, side: Side) -> Option<&'a str> {
        match self.mode {
            DisplayMode::Unified => self.pair.highlighted(Side::Left),
            DisplayMode::Split => self.pair.highlighted(side),
        }
    }

    /// Number shown in `side`'s number column. Unified rows show the old
    /// number on the left and the new number on the right.
    pub fn line_number(&self, side: Side) -> Option<u32> {
        if self.is_hunk() {
            return None;
        }
        match (self.mode, side) {
            (DisplayMode::Unified, Side::Left) => self.pair.line_number_left,
            (DisplayMode::Unified, Side::Right) => self.pair.new_line_number,
            (DisplayMode::Split, _) => self.pair.line_number(side),
        }
    }

    pub fn old_line_number(&self) -> Option<u32> {
        self.pair.old_line()
    }

    pub fn new_line_number(&self) -> Option<u32> {
        self.pair.new_line()
    }

    /// Line number a widget on `side` would anchor to
    fn anchor(&self, side: Side) -> Option<u32> {
        match side {
            Side::Left => self.old_line_number(),
            Side::Right => self.new_line_number(),
        }
    }

    /// Widgets attached to this row's `side` at `position`, in input order
    pub fn widgets<'w>(
        &self,
        widgets: &'w [Widget],
        side: Side,
        position: WidgetPosition,
    ) -> Vec<&'w Widget> {
        let Some(line) = self.anchor(side) else {
            return Vec::new();
        };
        widgets
            .iter()
            .filter(|w| w.side == side && w.position == position && w.line_number == line)
            .collect()
    }
}
