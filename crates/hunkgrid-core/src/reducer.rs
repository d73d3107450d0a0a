//! Expansion reducer: the single place a file's [`HunkList`] changes
//!
//! State is an `Arc<HunkList>`. Every action that changes the rows yields a
//! new `Arc`, every action that does not returns the same one, so callers can
//! detect changes with [`Arc::ptr_eq`].

use crate::change::{DiffFile, DisplayMode};
use crate::direction::{EdgeGaps, HunkDirection};
use crate::highlight::Highlighter;
use crate::hunk_list::{ExpandError, HunkList, LineRange, LoadRange, LoadResult};
use crate::line_pair::{GapId, LinePair};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Actions understood by [`reduce`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Rebuild from scratch, discarding all expansion state
    #[serde(rename_all = "camelCase")]
    Reset {
        file: DiffFile,
        mode: DisplayMode,
        max_lines_to_fetch: u32,
        #[serde(default)]
        edge_gaps: EdgeGaps,
    },
    /// Merge a fetch result into one gap
    LinesLoaded {
        line: LinePair,
        result: LoadResult,
        direction: HunkDirection,
    },
    /// Any action this reducer does not know; always a no-op
    #[serde(other)]
    Unknown,
}

/// Apply `action` to `state`
pub fn reduce(
    state: &Arc<HunkList>,
    action: Action,
    highlighter: &dyn Highlighter,
) -> Arc<HunkList> {
    match action {
        Action::Reset {
            file,
            mode,
            max_lines_to_fetch,
            edge_gaps,
        } => Arc::new(HunkList::build_with(
            &file,
            mode,
            max_lines_to_fetch,
            edge_gaps,
            highlighter,
        )),
        Action::LinesLoaded {
            line,
            result,
            direction,
        } => match state.load_lines(&line, &result, direction, highlighter) {
            Ok(next) => Arc::new(next),
            Err(err) => {
                log::warn!(
                    "Ignoring loaded lines for {}: {}",
                    state.file_path(),
                    err
                );
                Arc::clone(state)
            }
        },
        Action::Unknown => Arc::clone(state),
    }
}

/// A pending line fetch for one gap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub file_key: String,
    pub gap_id: GapId,
    pub line: LinePair,
    pub direction: HunkDirection,
    pub range: LoadRange,
}

/// Source of additional gap lines
#[allow(async_fn_in_trait)]
pub trait LineFetcher {
    async fn fetch_lines(
        &self,
        file_key: &str,
        left: LineRange,
        right: LineRange,
    ) -> anyhow::Result<LoadResult>;
}

/// Holds the current rows of one file and routes every change through
/// [`reduce`]. Also remembers which gaps have a fetch in flight so a second
/// click on the same row does not issue an overlapping request.
pub struct Store {
    state: Arc<HunkList>,
    highlighter: Arc<dyn Highlighter>,
    in_flight: FxHashSet<GapId>,
}

impl Store {
    pub fn new(highlighter: Arc<dyn Highlighter>) -> Self {
        Self {
            state: Arc::new(HunkList::default()),
            highlighter,
            in_flight: FxHashSet::default(),
        }
    }

    /// Store with `file` already built
    pub fn with_file(
        highlighter: Arc<dyn Highlighter>,
        file: DiffFile,
        mode: DisplayMode,
        page_size: u32,
    ) -> Self {
        let mut store = Self::new(highlighter);
        store.dispatch(Action::Reset {
            file,
            mode,
            max_lines_to_fetch: page_size,
            edge_gaps: EdgeGaps::default(),
        });
        store
    }

    pub fn state(&self) -> &Arc<HunkList> {
        &self.state
    }

    /// Apply an action; returns whether the rows changed
    pub fn dispatch(&mut self, action: Action) -> bool {
        match &action {
            Action::Reset { .. } => self.in_flight.clear(),
            Action::LinesLoaded { line, .. } => {
                if let Some(gap) = line.gap_id {
                    self.in_flight.remove(&gap);
                }
            }
            Action::Unknown => {}
        }
        let next = reduce(&self.state, action, self.highlighter.as_ref());
        let changed = !Arc::ptr_eq(&next, &self.state);
        self.state = next;
        changed
    }

    pub fn get_load_range(
        &self,
        line: &LinePair,
        direction: HunkDirection,
    ) -> Result<LoadRange, ExpandError> {
        self.state.get_load_range(line, direction)
    }

    pub fn is_in_flight(&self, gap: GapId) -> bool {
        self.in_flight.contains(&gap)
    }

    /// Start expanding `line`'s gap.
    ///
    /// Returns `Ok(None)` when a fetch for that gap is already pending.
    pub fn begin_expansion(
        &mut self,
        line: &LinePair,
        direction: HunkDirection,
    ) -> Result<Option<FetchRequest>, ExpandError> {
        let gap_id = line.gap_id.ok_or(ExpandError::NotAHunkRow)?;
        if self.in_flight.contains(&gap_id) {
            log::debug!("Expansion of gap {} already in flight", gap_id);
            return Ok(None);
        }
        let current = self
            .state
            .hunk_row(gap_id)
            .ok_or(ExpandError::GapNotFound(gap_id))?;
        let state = current.hunk_direction.unwrap_or(HunkDirection::In);
        if !state.offers(direction) {
            return Err(ExpandError::NotOffered {
                gap: gap_id,
                state,
                direction,
            });
        }
        let range = self.state.get_load_range(current, direction)?;
        let request = FetchRequest {
            file_key: self.state.file_path().to_string(),
            gap_id,
            line: current.clone(),
            direction,
            range,
        };
        self.in_flight.insert(gap_id);
        Ok(Some(request))
    }

    /// Merge a completed fetch
    pub fn complete_expansion(&mut self, request: FetchRequest, result: LoadResult) -> bool {
        self.dispatch(Action::LinesLoaded {
            line: request.line,
            result,
            direction: request.direction,
        })
    }

    /// Forget a failed fetch so the row can be clicked again
    pub fn fail_expansion(&mut self, request: &FetchRequest) {
        self.in_flight.remove(&request.gap_id);
    }

    /// Fetch and merge one expansion of `line`'s gap.
    ///
    /// Returns `Ok(false)` when nothing changed, including when a fetch for
    /// the gap was already pending.
    pub async fn expand<F: LineFetcher>(
        &mut self,
        line: &LinePair,
        direction: HunkDirection,
        fetcher: &F,
    ) -> Result<bool, ExpandError> {
        let Some(request) = self.begin_expansion(line, direction)? else {
            return Ok(false);
        };
        let fetched = fetcher
            .fetch_lines(
                &request.file_key,
                request.range.left_range,
                request.range.right_range,
            )
            .await;
        match fetched {
            Ok(result) => Ok(self.complete_expansion(request, result)),
            Err(err) => {
                self.fail_expansion(&request);
                Err(ExpandError::Fetch(err))
            }
        }
    }
}
