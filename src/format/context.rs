//! Output context and mode detection.
//!
//! # Mode Selection Logic
//!
//! 1. `--json` flag → JSON mode (machine-readable)
//! 2. `--quiet` flag → Quiet mode (results only, no confirmations)
//! 3. Otherwise → Plain text

use serde::Serialize;

use super::text::terminal_width;

/// Output mode determining formatting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable lines.
    #[default]
    Plain,

    /// Pretty-printed JSON on stdout.
    Json,

    /// Plain results without confirmation messages.
    Quiet,
}

impl OutputMode {
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }

    #[must_use]
    pub const fn is_human_readable(&self) -> bool {
        matches!(self, Self::Plain | Self::Quiet)
    }
}

/// Output context shared by every command.
#[derive(Debug, Clone)]
pub struct OutputContext {
    mode: OutputMode,
    width: usize,
}

impl OutputContext {
    #[must_use]
    pub const fn new(mode: OutputMode, width: usize) -> Self {
        Self { mode, width }
    }

    /// Create context from CLI flags; `json` wins over `quiet`.
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Plain
        };
        Self::new(mode, terminal_width())
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.mode.is_structured()
    }

    /// Terminal width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Print `value` as pretty JSON.
    pub fn json_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
        }
    }

    /// Print a result line in the human-readable modes.
    pub fn line(&self, text: &str) {
        if self.mode.is_human_readable() {
            println!("{text}");
        }
    }

    /// Print a confirmation message; suppressed in quiet and JSON modes.
    pub fn message(&self, text: &str) {
        if self.mode == OutputMode::Plain {
            println!("{text}");
        }
    }
}
