//! Ordered row sequence for one file, with expandable gaps between hunks
//!
//! A [`HunkList`] is built once from a file's hunks and then only ever
//! replaced: [`HunkList::load_lines`] returns a fresh list with the fetched
//! lines spliced in. Each gap (above the first hunk, between hunks, below the
//! last hunk) is tracked as a [`Gap`] and shown as one synthetic hunk row
//! until it has been fully revealed.

use crate::change::{Change, ChangeKind, DiffFile, DisplayMode, Hunk};
use crate::direction::{
    direction_for, next_direction, Edge, EdgeGaps, GapKind, GapShape, HunkDirection,
};
use crate::highlight::Highlighter;
use crate::line_pair::{is_well_formed, Cell, GapId, LinePair, LineType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;


#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Row is not a hunk row")]
    NotAHunkRow,
    #[error("Gap {0} is not part of this list")]
    GapNotFound(GapId),
    #[error("Gap {0} has no lines left to load")]
    NothingToLoad(GapId),
    #[error("Gap {gap} has no known end, cannot expand {direction:?}")]
    Unbounded {
        gap: GapId,
        direction: HunkDirection,
    },
    #[error("{0:?} is a row state, not an expansion request")]
    NotARequest(HunkDirection),
    #[error("Gap {gap} in state {state:?} does not offer {direction:?}")]
    NotOffered {
        gap: GapId,
        state: HunkDirection,
        direction: HunkDirection,
    },
    #[error("Merging gap {0} would break line ordering")]
    Ordering(GapId),
    #[error("Line fetch failed: {0:#}")]
    Fetch(anyhow::Error),
}

/// Inclusive range of line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    /// Range of `count` lines starting at `start` (`count` >= 1)
    pub fn with_len(start: u32, count: u32) -> Self {
        Self {
            start,
            end: start.saturating_add(count.max(1) - 1),
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    pub fn contains(&self, line: u32) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

/// Lines to fetch for one expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRange {
    pub left_range: LineRange,
    pub right_range: LineRange,
}

/// Lines returned by the fetch collaborator, keyed by line number
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    #[serde(default)]
    pub left_lines: FxHashMap<u32, String>,
    #[serde(default)]
    pub right_lines: FxHashMap<u32, String>,
}

impl LoadResult {
    /// Text for the gap line at `old`/`new`; either side may stand in for
    /// the other since gap lines are unchanged context
    fn line(&self, old: u32, new: u32) -> Option<(&str, &str)> {
        match (self.left_lines.get(&old), self.right_lines.get(&new)) {
            (Some(left), Some(right)) => Some((left, right)),
            (Some(left), None) => Some((left, left)),
            (None, Some(right)) => Some((right, right)),
            (None, None) => None,
        }
    }
}

/// Unrevealed lines of one gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub id: GapId,
    pub kind: GapKind,
    /// First unrevealed old line
    pub old_start: u32,
    /// First unrevealed new line
    pub new_start: u32,
    /// Unrevealed line count, `None` when the end of the file is unknown
    pub len: Option<u32>,
}

impl Gap {
    pub fn shape(&self) -> GapShape {
        GapShape {
            kind: self.kind,
            remaining: self.len,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.len == Some(0)
    }

    /// Range to fetch for `request`, never reaching past the gap
    pub fn load_range(&self, request: HunkDirection, page_size: u32) -> Result<LoadRange, ExpandError> {
        if !request.is_request() {
            return Err(ExpandError::NotARequest(request));
        }
        let page_size = page_size.max(1);
        let unbounded = ExpandError::Unbounded {
            gap: self.id,
            direction: request,
        };
        let edge = request.request_edge();
        let (offset, count) = match (edge, self.len) {
            (_, Some(0)) => return Err(ExpandError::NothingToLoad(self.id)),
            (None, Some(len)) => (0, len),
            (Some(Edge::Top), Some(len)) => (0, len.min(page_size)),
            // Unknown end: stop at the last representable line number
            (Some(Edge::Top), None) => {
                let room = u32::MAX - self.old_start.max(self.new_start);
                (0, page_size.min(room.saturating_add(1)))
            }
            (Some(Edge::Bottom), Some(len)) => {
                let count = len.min(page_size);
                (len - count, count)
            }
            (None | Some(Edge::Bottom), None) => return Err(unbounded),
        };
        Ok(LoadRange {
            left_range: LineRange::with_len(self.old_start + offset, count),
            right_range: LineRange::with_len(self.new_start + offset, count),
        })
    }
}

/// Rows of one file plus the gaps still hidden between them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkList {
    file_path: String,
    language: String,
    mode: DisplayMode,
    page_size: u32,
    edge_gaps: EdgeGaps,
    line_pairs: Vec<LinePair>,
    /// Indexed by gap id; closed gaps stay with `len == Some(0)`
    gaps: Vec<Gap>,
}

/// Line span covered by one hunk's rows (end exclusive)
#[derive(Debug, Clone, Copy)]
struct HunkSpan {
    old_start: u32,
    old_end: u32,
    new_start: u32,
    new_end: u32,
}

/// First line of a hunk side; zero-length sides point just past the line
/// they follow
fn side_start(start: u32, lines: u32) -> u32 {
    if lines == 0 {
        start + 1
    } else {
        start.max(1)
    }
}

/// Turns changes into rows, keeping per-side numbers strictly increasing
struct RowBuilder<'a> {
    mode: DisplayMode,
    language: &'a str,
    highlighter: &'a dyn Highlighter,
    last_old: u32,
    last_new: u32,
}

impl<'a> RowBuilder<'a> {
    fn cell(&self, kind: LineType, content: &str, line_number: Option<u32>) -> Cell {
        Cell {
            kind,
            content: content.to_string(),
            highlighted: self.highlighter.highlight(content, self.language),
            line_number,
        }
    }

    fn accept_old(&mut self, line: u32) -> Option<u32> {
        if line > self.last_old {
            self.last_old = line;
            Some(line)
        } else {
            log::warn!("Dropping out-of-order old line number {}", line);
            None
        }
    }

    fn accept_new(&mut self, line: u32) -> Option<u32> {
        if line > self.last_new {
            self.last_new = line;
            Some(line)
        } else {
            log::warn!("Dropping out-of-order new line number {}", line);
            None
        }
    }

    fn context_row(&self, old: Option<u32>, new: Option<u32>, left: &str, right: &str) -> LinePair {
        match self.mode {
            DisplayMode::Split => LinePair::split(
                Some(self.cell(LineType::Context, left, old)),
                Some(self.cell(LineType::Context, right, new)),
            ),
            DisplayMode::Unified => {
                LinePair::unified(self.cell(LineType::Context, left, None), old, new)
            }
        }
    }

    /// Rows for one hunk, and the span of lines they cover
    fn hunk_rows(&mut self, hunk: &Hunk) -> (Vec<LinePair>, HunkSpan) {
        let changes: Vec<&Change> = hunk
            .changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Hunk)
            .collect();

        // Fill in missing numbers from running counters seeded by the header
        let mut old_no = side_start(hunk.old_start, hunk.old_lines);
        let mut new_no = side_start(hunk.new_start, hunk.new_lines);
        let mut numbered = Vec::with_capacity(changes.len());
        for change in &changes {
            let (old, new) = match change.kind {
                ChangeKind::Context => {
                    let old = change.old_line.unwrap_or(old_no);
                    let new = change.new_line.unwrap_or(new_no);
                    old_no = old + 1;
                    new_no = new + 1;
                    (Some(old), Some(new))
                }
                ChangeKind::Delete => {
                    let old = change.old_line.unwrap_or(old_no);
                    old_no = old + 1;
                    (Some(old), None)
                }
                ChangeKind::Add => {
                    let new = change.new_line.unwrap_or(new_no);
                    new_no = new + 1;
                    (None, Some(new))
                }
                ChangeKind::Hunk => (None, None),
            };
            numbered.push((*change, old, new));
        }

        let first_old = self.last_old;
        let first_new = self.last_new;
        let rows = match self.mode {
            DisplayMode::Split => self.split_rows(&numbered),
            DisplayMode::Unified => self.unified_rows(&numbered),
        };

        let mut span = HunkSpan {
            old_start: side_start(hunk.old_start, hunk.old_lines),
            old_end: side_start(hunk.old_start, hunk.old_lines),
            new_start: side_start(hunk.new_start, hunk.new_lines),
            new_end: side_start(hunk.new_start, hunk.new_lines),
        };
        let olds = rows.iter().filter_map(LinePair::old_line);
        if let (Some(min), Some(max)) = (olds.clone().min(), olds.max()) {
            span.old_start = min;
            span.old_end = max + 1;
        }
        let news = rows.iter().filter_map(LinePair::new_line);
        if let (Some(min), Some(max)) = (news.clone().min(), news.max()) {
            span.new_start = min;
            span.new_end = max + 1;
        }
        // Keep spans of number-less hunks from pointing behind earlier hunks
        span.old_start = span.old_start.max(first_old + 1);
        span.old_end = span.old_end.max(span.old_start);
        span.new_start = span.new_start.max(first_new + 1);
        span.new_end = span.new_end.max(span.new_start);

        (rows, span)
    }

    fn split_rows(&mut self, changes: &[(&Change, Option<u32>, Option<u32>)]) -> Vec<LinePair> {
        let mut rows = Vec::with_capacity(changes.len());
        let mut i = 0;
        while i < changes.len() {
            let (change, old, new) = changes[i];
            if change.kind == ChangeKind::Context {
                let old = old.and_then(|n| self.accept_old(n));
                let new = new.and_then(|n| self.accept_new(n));
                rows.push(self.context_row(old, new, &change.content, &change.content));
                i += 1;
                continue;
            }

            // A run of deletes followed by a run of adds pairs up by position
            let delete_start = i;
            while i < changes.len() && changes[i].0.kind == ChangeKind::Delete {
                i += 1;
            }
            let add_start = i;
            while i < changes.len() && changes[i].0.kind == ChangeKind::Add {
                i += 1;
            }
            if i == delete_start {
                // Stray header line
                i += 1;
                continue;
            }

            let deletes = &changes[delete_start..add_start];
            let adds = &changes[add_start..i];
            for k in 0..deletes.len().max(adds.len()) {
                let left = deletes.get(k).map(|&(change, old, _)| {
                    let number = old.and_then(|n| self.accept_old(n));
                    self.cell(LineType::Delete, &change.content, number)
                });
                let right = adds.get(k).map(|&(change, _, new)| {
                    let number = new.and_then(|n| self.accept_new(n));
                    self.cell(LineType::Add, &change.content, number)
                });
                rows.push(LinePair::split(left, right));
            }
        }
        rows
    }

    fn unified_rows(&mut self, changes: &[(&Change, Option<u32>, Option<u32>)]) -> Vec<LinePair> {
        let mut rows = Vec::with_capacity(changes.len());
        for &(change, old, new) in changes {
            let kind = match change.kind {
                ChangeKind::Add => LineType::Add,
                ChangeKind::Delete => LineType::Delete,
                ChangeKind::Context => LineType::Context,
                ChangeKind::Hunk => continue,
            };
            let old = old.and_then(|n| self.accept_old(n));
            let new = new.and_then(|n| self.accept_new(n));
            rows.push(LinePair::unified(self.cell(kind, &change.content, None), old, new));
        }
        rows
    }
}

fn gap_between(id: GapId, kind: GapKind, after: (u32, u32), before: (u32, u32)) -> Gap {
    let old_len = before.0.saturating_sub(after.0);
    let new_len = before.1.saturating_sub(after.1);
    Gap {
        id,
        kind,
        old_start: after.0,
        new_start: after.1,
        len: Some(old_len.min(new_len)),
    }
}

impl HunkList {
    /// Build the rows for `file` with file-edge gaps revealed in one click
    pub fn build(
        file: &DiffFile,
        mode: DisplayMode,
        page_size: u32,
        highlighter: &dyn Highlighter,
    ) -> Self {
        Self::build_with(file, mode, page_size, EdgeGaps::default(), highlighter)
    }

    pub fn build_with(
        file: &DiffFile,
        mode: DisplayMode,
        page_size: u32,
        edge_gaps: EdgeGaps,
        highlighter: &dyn Highlighter,
    ) -> Self {
        let page_size = page_size.max(1);
        let language = file.language();
        let mut builder = RowBuilder {
            mode,
            language: &language,
            highlighter,
            last_old: 0,
            last_new: 0,
        };

        let mut sections = Vec::with_capacity(file.hunks.len());
        for hunk in &file.hunks {
            let (rows, span) = builder.hunk_rows(hunk);
            sections.push((hunk.header(), rows, span));
        }

        let mut gaps = Vec::with_capacity(sections.len() + 1);
        let mut line_pairs = Vec::new();
        let mut previous_end = (1, 1);
        for (idx, (header, rows, span)) in sections.into_iter().enumerate() {
            let kind = if idx == 0 {
                GapKind::Leading
            } else {
                GapKind::Internal
            };
            let gap = gap_between(
                idx as GapId,
                kind,
                previous_end,
                (span.old_start, span.new_start),
            );
            if let Some(direction) = direction_for(gap.shape(), page_size, edge_gaps, None) {
                line_pairs.push(LinePair::hunk(gap.id, direction, Some(header)));
            }
            gaps.push(gap);
            line_pairs.extend(rows);
            previous_end = (span.old_end, span.new_end);
        }

        if !file.hunks.is_empty() {
            let remaining = |count: Option<u32>, start: u32| count.map(|n| (n + 1).saturating_sub(start));
            let len = match (
                remaining(file.old_line_count, previous_end.0),
                remaining(file.new_line_count, previous_end.1),
            ) {
                (Some(old), Some(new)) => Some(old.min(new)),
                (known, None) | (None, known) => known,
            };
            let gap = Gap {
                id: file.hunks.len() as GapId,
                kind: GapKind::Trailing,
                old_start: previous_end.0,
                new_start: previous_end.1,
                len,
            };
            if let Some(direction) = direction_for(gap.shape(), page_size, edge_gaps, None) {
                line_pairs.push(LinePair::hunk(gap.id, direction, None));
            }
            gaps.push(gap);
        }

        log::debug!(
            "Built {} rows for {} ({:?}, {} hunks)",
            line_pairs.len(),
            file.path,
            mode,
            file.hunks.len()
        );

        Self {
            file_path: file.path.clone(),
            language,
            mode,
            page_size,
            edge_gaps,
            line_pairs,
            gaps,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn edge_gaps(&self) -> EdgeGaps {
        self.edge_gaps
    }

    pub fn line_pairs(&self) -> &[LinePair] {
        &self.line_pairs
    }

    pub fn len(&self) -> usize {
        self.line_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_pairs.is_empty()
    }

    /// Gaps that still hide lines
    pub fn open_gaps(&self) -> impl Iterator<Item = &Gap> {
        self.gaps.iter().filter(|gap| !gap.is_closed())
    }

    pub fn gap(&self, id: GapId) -> Option<&Gap> {
        self.gaps.get(id as usize)
    }

    /// Synthetic hunk rows in display order
    pub fn hunk_rows(&self) -> impl Iterator<Item = &LinePair> {
        self.line_pairs.iter().filter(|pair| pair.is_hunk())
    }

    /// Hunk row for a gap
    pub fn hunk_row(&self, id: GapId) -> Option<&LinePair> {
        self.hunk_rows().find(|pair| pair.gap_id == Some(id))
    }

    /// Check the row invariants (ordering and content)
    pub fn is_well_formed(&self) -> bool {
        is_well_formed(&self.line_pairs)
    }

    fn locate(&self, line: &LinePair) -> Result<(usize, Gap), ExpandError> {
        let id = line
            .gap_id
            .filter(|_| line.is_hunk())
            .ok_or(ExpandError::NotAHunkRow)?;
        let index = self
            .line_pairs
            .iter()
            .position(|pair| pair.is_hunk() && pair.gap_id == Some(id))
            .ok_or(ExpandError::GapNotFound(id))?;
        let gap = *self.gap(id).ok_or(ExpandError::GapNotFound(id))?;
        Ok((index, gap))
    }

    /// Lines to fetch when `line`'s gap is expanded in `direction`
    pub fn get_load_range(
        &self,
        line: &LinePair,
        direction: HunkDirection,
    ) -> Result<LoadRange, ExpandError> {
        let (_, gap) = self.locate(line)?;
        gap.load_range(direction, self.page_size)
    }

    /// New list with the fetched lines of `line`'s gap merged in
    pub fn load_lines(
        &self,
        line: &LinePair,
        result: &LoadResult,
        direction: HunkDirection,
        highlighter: &dyn Highlighter,
    ) -> Result<HunkList, ExpandError> {
        let (index, gap) = self.locate(line)?;
        let range = gap.load_range(direction, self.page_size)?;
        let requested = range.left_range.len();
        let edge = direction.request_edge();

        // Only the contiguous run starting at the expanding edge counts
        let mut fetched = Vec::new();
        for k in 0..requested {
            let (old, new) = match edge {
                Some(Edge::Bottom) => (range.left_range.end - k, range.right_range.end - k),
                _ => (range.left_range.start + k, range.right_range.start + k),
            };
            match result.line(old, new) {
                Some((left, right)) => fetched.push((old, new, left, right)),
                None => break,
            }
        }
        if edge == Some(Edge::Bottom) {
            fetched.reverse();
        }

        let revealed = fetched.len() as u32;
        let short = revealed < requested;
        let mut next = gap;
        next.len = match gap.len {
            // A trailing fetch that comes back short has hit the end of file
            _ if short && gap.kind == GapKind::Trailing => Some(0),
            Some(len) => Some(len - revealed),
            None => None,
        };
        if edge != Some(Edge::Bottom) {
            next.old_start += revealed;
            next.new_start += revealed;
        }
        if short {
            log::debug!(
                "Short fetch for gap {} of {}: {} of {} lines",
                gap.id,
                self.file_path,
                revealed,
                requested
            );
        }

        let current = self.line_pairs[index]
            .hunk_direction
            .unwrap_or(HunkDirection::In);
        let state = next_direction(current, direction, next.shape(), self.page_size, self.edge_gaps);
        let hunk_row = state.map(|state| {
            let mut row = self.line_pairs[index].clone();
            row.hunk_direction = Some(state);
            row
        });

        let builder = RowBuilder {
            mode: self.mode,
            language: &self.language,
            highlighter,
            last_old: 0,
            last_new: 0,
        };
        let context: Vec<LinePair> = fetched
            .iter()
            .map(|&(old, new, left, right)| builder.context_row(Some(old), Some(new), left, right))
            .collect();

        let mut line_pairs = Vec::with_capacity(self.line_pairs.len() + context.len());
        line_pairs.extend_from_slice(&self.line_pairs[..index]);
        match edge {
            Some(Edge::Bottom) => {
                line_pairs.extend(hunk_row);
                line_pairs.extend(context);
            }
            _ => {
                line_pairs.extend(context);
                line_pairs.extend(hunk_row);
            }
        }
        line_pairs.extend_from_slice(&self.line_pairs[index + 1..]);

        if !is_well_formed(&line_pairs) {
            log::warn!(
                "Rejecting merge into gap {} of {}: line numbers out of order",
                gap.id,
                self.file_path
            );
            return Err(ExpandError::Ordering(gap.id));
        }

        let mut gaps = self.gaps.clone();
        if let Some(slot) = gaps.get_mut(gap.id as usize) {
            *slot = next;
        }

        log::debug!(
            "Loaded {} lines into gap {} of {} ({:?} -> {:?})",
            revealed,
            gap.id,
            self.file_path,
            current,
            state
        );

        Ok(HunkList {
            file_path: self.file_path.clone(),
            language: self.language.clone(),
            mode: self.mode,
            page_size: self.page_size,
            edge_gaps: self.edge_gaps,
            line_pairs,
            gaps,
        })
    }
}
