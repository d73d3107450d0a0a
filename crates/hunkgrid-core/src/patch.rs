//! Unified diff text to [`DiffFile`]s

use crate::change::{Change, ChangeKind, DiffFile, Hunk};
use thiserror::Error;
use unidiff::PatchSet;

const DEV_NULL: &str = "/dev/null";

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Invalid patch: {0}")]
    Parse(#[from] unidiff::Error),
    #[error("Invalid diff file JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn strip_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn convert_hunk(hunk: &unidiff::Hunk) -> Hunk {
    let changes = hunk
        .lines()
        .iter()
        .filter_map(|line| {
            let kind = if line.is_added() {
                ChangeKind::Add
            } else if line.is_removed() {
                ChangeKind::Delete
            } else if line.is_context() {
                ChangeKind::Context
            } else {
                // "\ No newline at end of file" and similar markers
                return None;
            };
            Some(Change {
                kind,
                content: line.value.trim_end_matches(['\r', '\n']).to_string(),
                old_line: line.source_line_no.map(to_u32),
                new_line: line.target_line_no.map(to_u32),
            })
        })
        .collect();
    Hunk {
        old_start: to_u32(hunk.source_start),
        old_lines: to_u32(hunk.source_length),
        new_start: to_u32(hunk.target_start),
        new_lines: to_u32(hunk.target_length),
        changes,
    }
}

/// Parse unified diff text into one [`DiffFile`] per file.
///
/// Paths lose their `a/` / `b/` prefixes; a deleted file keeps its old path.
/// Added and deleted files get exact line counts since the hunk covers the
/// whole file; for everything else the counts stay unknown.
pub fn parse_patch(text: &str) -> Result<Vec<DiffFile>, PatchError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    // Only newlines are trimmed: a trailing " " is a blank context line
    let mut patch = PatchSet::new();
    patch.parse(text.trim_end_matches(['\r', '\n']))?;

    let mut files = Vec::new();
    for file in patch.files() {
        let added = file.source_file == DEV_NULL;
        let removed = file.target_file == DEV_NULL;
        let path = if removed {
            strip_prefix(&file.source_file)
        } else {
            strip_prefix(&file.target_file)
        };

        let hunks: Vec<Hunk> = file.hunks().iter().map(convert_hunk).collect();
        let mut diff_file = DiffFile::new(path, hunks);
        if added || removed {
            let old: u32 = diff_file.hunks.iter().map(|h| h.old_lines).sum();
            let new: u32 = diff_file.hunks.iter().map(|h| h.new_lines).sum();
            diff_file = diff_file.with_line_counts(old, new);
        }
        log::debug!(
            "Parsed {} with {} hunks (+{} -{})",
            diff_file.path,
            diff_file.hunks.len(),
            diff_file.additions(),
            diff_file.deletions()
        );
        files.push(diff_file);
    }
    Ok(files)
}
