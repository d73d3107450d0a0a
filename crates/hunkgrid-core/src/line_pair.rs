//! Renderable rows of the diff grid

use crate::change::Side;
use crate::direction::HunkDirection;
use serde::{Deserialize, Serialize};

/// Identifies the gap a synthetic hunk row stands for.
///
/// Gaps are numbered top to bottom when a file is built and keep their id
/// for as long as the row exists, so expansions can be matched to rows
/// after other gaps have been merged.
pub type GapId = u32;

/// Type of one side of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Add,
    Delete,
    Context,
    Hunk,
    /// Filler opposite an unmatched add or delete
    Empty,
}

/// One row of the grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePair {
    pub type_left: Option<LineType>,
    pub type_right: Option<LineType>,
    pub content_left: Option<String>,
    pub content_right: Option<String>,
    pub highlighted_content_left: Option<String>,
    pub highlighted_content_right: Option<String>,
    pub line_number_left: Option<u32>,
    pub line_number_right: Option<u32>,
    /// New-version number of a unified row, whose right side stays empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunk_direction: Option<HunkDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_id: Option<GapId>,
}

/// Content of one side before it is placed in a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: LineType,
    pub content: String,
    pub highlighted: String,
    pub line_number: Option<u32>,
}

impl LinePair {
    /// Synthetic gap row
    pub fn hunk(gap_id: GapId, direction: HunkDirection, header: Option<String>) -> Self {
        Self {
            type_left: Some(LineType::Hunk),
            type_right: Some(LineType::Hunk),
            content_left: header.clone(),
            content_right: header,
            hunk_direction: Some(direction),
            gap_id: Some(gap_id),
            ..Self::default()
        }
    }

    /// Split-mode row; a missing side becomes an `empty` filler
    pub fn split(left: Option<Cell>, right: Option<Cell>) -> Self {
        let mut pair = Self::default();
        pair.set(Side::Left, left);
        pair.set(Side::Right, right);
        pair
    }

    /// Unified-mode row: only the left side is populated. The old number
    /// goes in `line_number_left`, the new one in `new_line_number`.
    pub fn unified(cell: Cell, old_line: Option<u32>, new_line: Option<u32>) -> Self {
        Self {
            type_left: Some(cell.kind),
            content_left: Some(cell.content),
            highlighted_content_left: Some(cell.highlighted),
            line_number_left: old_line,
            new_line_number: new_line,
            ..Self::default()
        }
    }

    fn set(&mut self, side: Side, cell: Option<Cell>) {
        let (kind, content, highlighted, number) = match cell {
            Some(cell) => (
                cell.kind,
                Some(cell.content),
                Some(cell.highlighted),
                cell.line_number,
            ),
            None => (LineType::Empty, None, None, None),
        };
        match side {
            Side::Left => {
                self.type_left = Some(kind);
                self.content_left = content;
                self.highlighted_content_left = highlighted;
                self.line_number_left = number;
            }
            Side::Right => {
                self.type_right = Some(kind);
                self.content_right = content;
                self.highlighted_content_right = highlighted;
                self.line_number_right = number;
            }
        }
    }

    pub fn is_hunk(&self) -> bool {
        self.type_left == Some(LineType::Hunk)
            && matches!(self.type_right, Some(LineType::Hunk) | None)
    }

    pub fn kind(&self, side: Side) -> Option<LineType> {
        match side {
            Side::Left => self.type_left,
            Side::Right => self.type_right,
        }
    }

    pub fn content(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.content_left.as_deref(),
            Side::Right => self.content_right.as_deref(),
        }
    }

    pub fn highlighted(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.highlighted_content_left.as_deref(),
            Side::Right => self.highlighted_content_right.as_deref(),
        }
    }

    pub fn line_number(&self, side: Side) -> Option<u32> {
        match side {
            Side::Left => self.line_number_left,
            Side::Right => self.line_number_right,
        }
    }

    /// Old-version line number, ignoring hunk rows and fillers
    pub fn old_line(&self) -> Option<u32> {
        if self.is_hunk() || self.type_left == Some(LineType::Empty) {
            return None;
        }
        self.line_number_left
    }

    /// New-version line number, ignoring hunk rows and fillers
    pub fn new_line(&self) -> Option<u32> {
        match self.type_right {
            _ if self.is_hunk() => None,
            Some(LineType::Empty) => None,
            None => self.new_line_number,
            Some(_) => self.line_number_right,
        }
    }
}

/// Check the row invariants over a whole sequence: numbers strictly increase
/// per side, and every non-hunk row has content somewhere.
pub fn is_well_formed(pairs: &[LinePair]) -> bool {
    let mut last_old = 0;
    let mut last_new = 0;
    for pair in pairs {
        if pair.is_hunk() {
            if pair.hunk_direction.is_none() {
                return false;
            }
            continue;
        }
        if pair.content_left.is_none() && pair.content_right.is_none() {
            return false;
        }
        if let Some(old) = pair.old_line() {
            if old <= last_old {
                return false;
            }
            last_old = old;
        }
        if let Some(new) = pair.new_line() {
            if new <= last_new {
                return false;
            }
            last_new = new;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: LineType, text: &str, number: u32) -> Cell {
        Cell {
            kind,
            content: text.to_string(),
            highlighted: text.to_string(),
            line_number: Some(number),
        }
    }

    #[test]
    fn test_split_filler() {
        let pair = LinePair::split(Some(cell(LineType::Delete, "a", 4)), None);
        assert_eq!(pair.type_left, Some(LineType::Delete));
        assert_eq!(pair.type_right, Some(LineType::Empty));
        assert_eq!(pair.content_right, None);
        assert_eq!(pair.old_line(), Some(4));
        assert_eq!(pair.new_line(), None);
        assert!(!pair.is_hunk());
    }

    #[test]
    fn test_unified_keeps_both_numbers() {
        let pair = LinePair::unified(cell(LineType::Context, "x", 0), Some(7), Some(9));
        assert_eq!(pair.type_right, None);
        assert_eq!(pair.content_right, None);
        assert_eq!(pair.line_number_right, None, "right side stays empty");
        assert_eq!(pair.new_line_number, Some(9));
        assert_eq!(pair.old_line(), Some(7));
        assert_eq!(pair.new_line(), Some(9));
    }

    #[test]
    fn test_hunk_row() {
        let pair = LinePair::hunk(2, HunkDirection::In, Some("@@".into()));
        assert!(pair.is_hunk());
        assert_eq!(pair.old_line(), None);
        assert_eq!(pair.gap_id, Some(2));
    }

    #[test]
    fn test_well_formed() {
        let rows = vec![
            LinePair::hunk(0, HunkDirection::Out, None),
            LinePair::split(
                Some(cell(LineType::Context, "a", 3)),
                Some(cell(LineType::Context, "a", 3)),
            ),
            LinePair::split(Some(cell(LineType::Delete, "b", 4)), None),
            LinePair::split(None, Some(cell(LineType::Add, "c", 4))),
        ];
        assert!(is_well_formed(&rows));

        let mut broken = rows.clone();
        broken.push(LinePair::split(Some(cell(LineType::Delete, "d", 4)), None));
        assert!(!is_well_formed(&broken));

        let mut empty = rows;
        empty.push(LinePair::split(None, None));
        assert!(!is_well_formed(&empty));
    }

    #[test]
    fn test_serde_keys() {
        let pair = LinePair::hunk(1, HunkDirection::InDown, None);
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["typeLeft"], "hunk");
        assert_eq!(json["hunkDirection"], "in_down");
        assert_eq!(json["gapId"], 1);
    }
}
