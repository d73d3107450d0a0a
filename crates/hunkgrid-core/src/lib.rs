//! hunkgrid-core - line pairing and hunk expansion for diff grids
//!
//! Turns a file's hunks into an ordered sequence of renderable rows (split or
//! unified), with synthetic hunk rows standing in for the unchanged lines
//! between hunks. Those gaps can then be revealed page by page as lines are
//! fetched from elsewhere.

pub mod change;
pub mod config;
pub mod direction;
pub mod highlight;
pub mod hunk_list;
pub mod line_pair;
pub mod overlay;
pub mod patch;
pub mod reducer;
pub mod row;
pub mod selection;

pub use change::{Change, ChangeKind, DiffFile, DisplayMode, Hunk, Side};
pub use config::Config;
pub use direction::{EdgeGaps, GapKind, HunkDirection};
pub use highlight::{CachedHighlighter, Highlighter, PlainHighlighter, SyntectHighlighter};
pub use hunk_list::{ExpandError, Gap, HunkList, LineRange, LoadRange, LoadResult};
pub use line_pair::{GapId, LinePair, LineType};
pub use overlay::{DockEvent, DockNotification, Overlay, OverlayDock};
pub use patch::{parse_patch, PatchError};
pub use reducer::{reduce, Action, FetchRequest, LineFetcher, Store};
pub use row::{RowView, Widget, WidgetPosition};
pub use selection::{RowSelection, SelectedRange};
