//! Configuration file support
//!
//! Config file location: `~/.config/hunkgrid/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [display]
//! mode = "unified"
//!
//! [expansion]
//! page_size = 20
//! edge_gaps = "paged"
//!
//! [overlay]
//! hover_debounce_ms = 150
//!
//! [highlight]
//! enabled = true
//! ```

use crate::change::DisplayMode;
use crate::direction::EdgeGaps;
use crate::highlight::{CachedHighlighter, Highlighter, PlainHighlighter, SyntectHighlighter};
use crate::overlay::DEFAULT_HOVER_DEBOUNCE;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

const APP_DIR: &str = "hunkgrid";
const CONFIG_FILE: &str = "config.toml";

/// Display configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Initial grid mode: "split" or "unified"
    pub mode: DisplayMode,
}

/// Gap expansion configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Lines revealed per expansion click
    pub page_size: u32,
    /// "reveal_all" or "paged" for gaps above the first / below the last hunk
    pub edge_gaps: EdgeGaps,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            edge_gaps: EdgeGaps::default(),
        }
    }
}

/// Overlay configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Hover debounce in milliseconds
    pub hover_debounce_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hover_debounce_ms: DEFAULT_HOVER_DEBOUNCE.as_millis() as u64,
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enabled: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Root configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub expansion: ExpansionConfig,
    pub overlay: OverlayConfig,
    pub highlight: HighlightConfig,
}

/// Candidate config files, most specific first: `$XDG_CONFIG_HOME`,
/// `~/.config`, then the platform config dir (~/Library/Application Support
/// on macOS)
fn search_paths() -> Vec<PathBuf> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = dirs::home_dir().map(|home| home.join(".config"));
    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in [xdg, home, dirs::config_dir()].into_iter().flatten() {
        let path = dir.join(APP_DIR).join(CONFIG_FILE);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

impl Config {
    /// Load from the first config file found.
    /// Returns the default config if there is none or it can't be read.
    pub fn load() -> Self {
        let Some(path) = search_paths().into_iter().find(|p| p.is_file()) else {
            log::debug!("No config file found, using defaults");
            return Self::default();
        };
        Self::from_path(&path).unwrap_or_else(|e| {
            log::warn!("Failed to load config: {:#}", e);
            Self::default()
        })
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Expansion page size, never zero
    pub fn page_size(&self) -> u32 {
        self.expansion.page_size.max(1)
    }

    pub fn hover_debounce(&self) -> Duration {
        Duration::from_millis(self.overlay.hover_debounce_ms)
    }

    /// Highlighter matching the `[highlight]` section
    pub fn highlighter(&self) -> Arc<dyn Highlighter> {
        if self.highlight.enabled {
            Arc::new(CachedHighlighter::new(SyntectHighlighter::new()))
        } else {
            Arc::new(PlainHighlighter)
        }
    }
}
