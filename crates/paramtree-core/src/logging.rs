//! Logging and debugging facilities for paramtree.
//!
//! The crates only emit `tracing` events under the [`targets`] below and
//! time rebuilds and redraws with [`PerfSpan`]. Applications pick what to
//! see when they install a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("paramtree::model=debug")
//!     .init();
//! ```

/// Span names used throughout paramtree for tracing.
pub mod span_names {
    /// Full tree rebuild span.
    pub const REBUILD: &str = "paramtree::rebuild";
    /// Blit redraw span.
    pub const BLIT: &str = "paramtree::blit";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "paramtree_core::signal";
    /// Configuration tree target.
    pub const CONFIG: &str = "paramtree::config";
    /// Tree models target.
    pub const MODEL: &str = "paramtree::model";
    /// Calibration parameter synchronization target.
    pub const CALIBRATION: &str = "paramtree::model::calibration";
    /// Blit manager target.
    pub const BLIT: &str = "paramtree::blit";
    /// Performance spans target.
    pub const PERF: &str = "paramtree::perf";
}

/// Branch drawing for tree dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// Plain `|`, `+--` and `` `-- ``.
    Ascii,
    /// Box-drawing characters.
    #[default]
    Unicode,
}

struct Glyphs {
    rail: &'static str,
    gap: &'static str,
    tee: &'static str,
    corner: &'static str,
}

impl TreeStyle {
    const fn glyphs(self) -> Glyphs {
        match self {
            TreeStyle::Ascii => Glyphs {
                rail: "|  ",
                gap: "   ",
                tee: "+-- ",
                corner: "`-- ",
            },
            TreeStyle::Unicode => Glyphs {
                rail: "\u{2502}  ",
                gap: "   ",
                tee: "\u{251c}\u{2500}\u{2500} ",
                corner: "\u{2514}\u{2500}\u{2500} ",
            },
        }
    }
}

/// What a tree dump prints.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Branch glyphs.
    pub style: TreeStyle,
    /// Print leaf values after their keys.
    pub show_values: bool,
    /// Print the parameter attached to a mapping as a `_param` line.
    pub show_parameters: bool,
    /// Rows deeper than this are skipped. Top-level rows are at depth 1.
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_values: true,
            show_parameters: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Keys only.
    pub fn minimal() -> Self {
        Self {
            show_values: false,
            show_parameters: false,
            ..Self::default()
        }
    }

    /// The text drawn before a row.
    ///
    /// `ancestors_last` holds, from the top level down, whether each
    /// ancestor row was the last of its siblings. A last ancestor has no
    /// further siblings, so its column is left blank instead of railed.
    pub fn prefix(&self, ancestors_last: &[bool], is_last: bool) -> String {
        let glyphs = self.style.glyphs();
        let mut prefix: String = ancestors_last
            .iter()
            .map(|&last| if last { glyphs.gap } else { glyphs.rail })
            .collect();
        prefix.push_str(if is_last { glyphs.corner } else { glyphs.tee });
        prefix
    }
}

/// Keeps an `info` span on the perf target entered until dropped, so a
/// subscriber with span timing reports how long the guarded work took.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// `name` should be one of the [`span_names`].
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
