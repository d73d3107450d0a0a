//! Input model: pre-computed hunks for a single file

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of a single change line inside a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Delete,
    Context,
    /// Hunk header line (`@@ -a,b +c,d @@`)
    Hunk,
}

/// A single line of a hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub content: String,
    #[serde(default)]
    pub old_line: Option<u32>,
    #[serde(default)]
    pub new_line: Option<u32>,
}

impl Change {
    pub fn add(content: impl Into<String>, new_line: u32) -> Self {
        Self {
            kind: ChangeKind::Add,
            content: content.into(),
            old_line: None,
            new_line: Some(new_line),
        }
    }

    pub fn delete(content: impl Into<String>, old_line: u32) -> Self {
        Self {
            kind: ChangeKind::Delete,
            content: content.into(),
            old_line: Some(old_line),
            new_line: None,
        }
    }

    pub fn context(content: impl Into<String>, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: ChangeKind::Context,
            content: content.into(),
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }
}

/// A contiguous block of changes with its old/new ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    #[serde(default)]
    pub changes: Vec<Change>,
}

impl Hunk {
    /// Header text in unified diff notation
    pub fn header(&self) -> String {
        // A header line carried in the changes wins over the synthesized one
        if let Some(change) = self.changes.iter().find(|c| c.kind == ChangeKind::Hunk) {
            return change.content.clone();
        }
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }

    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Add)
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Delete)
            .count()
    }
}

/// One file's worth of hunks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    pub path: String,
    /// Language token handed to the highlighter (defaults to the extension)
    #[serde(default)]
    pub language: Option<String>,
    /// Total line count of the old version, when known
    #[serde(default)]
    pub old_line_count: Option<u32>,
    /// Total line count of the new version, when known
    #[serde(default)]
    pub new_line_count: Option<u32>,
    #[serde(default)]
    pub hunks: Vec<Hunk>,
}

impl DiffFile {
    pub fn new(path: impl Into<String>, hunks: Vec<Hunk>) -> Self {
        Self {
            path: path.into(),
            hunks,
            ..Self::default()
        }
    }

    /// Set both total line counts
    pub fn with_line_counts(mut self, old: u32, new: u32) -> Self {
        self.old_line_count = Some(old);
        self.new_line_count = Some(new);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Language used for highlighting
    pub fn language(&self) -> String {
        if let Some(language) = &self.language {
            return language.clone();
        }
        Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("txt")
            .to_string()
    }

    pub fn additions(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }

    /// Parse a file from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, crate::patch::PatchError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Grid rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Split,
    Unified,
}

/// Column side of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Old version
    Left,
    /// New version
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_synthesized() {
        let hunk = Hunk {
            old_start: 3,
            old_lines: 4,
            new_start: 3,
            new_lines: 5,
            changes: vec![Change::context("a", 3, 3)],
        };
        assert_eq!(hunk.header(), "@@ -3,4 +3,5 @@");
    }

    #[test]
    fn test_header_from_change() {
        let hunk = Hunk {
            old_start: 3,
            old_lines: 1,
            new_start: 3,
            new_lines: 1,
            changes: vec![
                Change {
                    kind: ChangeKind::Hunk,
                    content: "@@ -3,1 +3,1 @@ fn main()".to_string(),
                    old_line: None,
                    new_line: None,
                },
                Change::context("a", 3, 3),
            ],
        };
        assert_eq!(hunk.header(), "@@ -3,1 +3,1 @@ fn main()");
    }

    #[test]
    fn test_language_from_extension() {
        let file = DiffFile::new("src/lib.rs", Vec::new());
        assert_eq!(file.language(), "rs");

        let file = DiffFile::new("Makefile", Vec::new());
        assert_eq!(file.language(), "txt");

        let file = DiffFile::new("build", Vec::new()).with_language("sh");
        assert_eq!(file.language(), "sh");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "path": "a.txt",
            "oldLineCount": 10,
            "newLineCount": 11,
            "hunks": [{
                "oldStart": 2, "oldLines": 1, "newStart": 2, "newLines": 2,
                "changes": [
                    {"type": "context", "content": "b", "oldLine": 2, "newLine": 2},
                    {"type": "add", "content": "c", "newLine": 3}
                ]
            }]
        }"#;
        let file = DiffFile::from_json(json).unwrap();
        assert_eq!(file.old_line_count, Some(10));
        assert_eq!(file.hunks[0].changes[1], Change::add("c", 3));
        assert_eq!(file.additions(), 1);
        assert_eq!(file.deletions(), 0);
    }
}
