//! Terminal-facing rendering and tracing setup.
//!
//! The one human-facing report this crate produces is the validator's
//! issue list; [`render_report`] formats it for live editor feedback with
//! color codes only where a terminal will interpret them.

use std::io::IsTerminal;

use crate::graph::ValidationReport;

pub const ISSUE_COLOR: &str = "\x1b[31m"; // red
pub const OK_COLOR: &str = "\x1b[32m"; // green
pub const RESET_COLOR: &str = "\x1b[0m";

/// Formatter color mode for terminal output.
///
/// - [`FormatterMode::Auto`]: auto-detects TTY capability via
///   `stderr.is_terminal()`
/// - [`FormatterMode::Colored`]: always includes color codes
/// - [`FormatterMode::Plain`]: never includes color codes (logs/files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterMode {
    /// Auto-detect TTY capability.
    #[default]
    Auto,
    /// Always include ANSI color codes.
    Colored,
    /// Never include ANSI color codes.
    Plain,
}

impl FormatterMode {
    /// Returns true if this mode should use colored output.
    ///
    /// For `Auto`, performs TTY detection on each call.
    pub fn is_colored(&self) -> bool {
        match self {
            FormatterMode::Auto => std::io::stderr().is_terminal(),
            FormatterMode::Colored => true,
            FormatterMode::Plain => false,
        }
    }
}

/// Renders a validation report as a bulleted issue list.
///
/// # Examples
///
/// ```
/// use flowmind::graph::{WorkflowGraph, validate};
/// use flowmind::telemetry::{FormatterMode, render_report};
/// use flowmind::types::ComponentKind;
///
/// let mut graph = WorkflowGraph::new();
/// graph.add_node(ComponentKind::Llm, Default::default());
///
/// let rendered = render_report(&validate(&graph), FormatterMode::Plain);
/// assert!(rendered.contains("Workflow issues"));
/// assert!(!rendered.contains("\x1b[")); // no ANSI codes in plain mode
/// ```
pub fn render_report(report: &ValidationReport, mode: FormatterMode) -> String {
    let colored = mode.is_colored();
    let (tint, reset) = if colored {
        (ISSUE_COLOR, RESET_COLOR)
    } else {
        ("", "")
    };

    if report.ok {
        let (ok_tint, reset) = if colored { (OK_COLOR, RESET_COLOR) } else { ("", "") };
        return format!("{ok_tint}Workflow is valid{reset}\n");
    }

    let mut out = format!(
        "Workflow issues ({}):\n",
        report.issues.len()
    );
    for issue in &report.issues {
        out.push_str(&format!("  {tint}•{reset} {issue}\n"));
    }
    out
}

/// Installs a `tracing` subscriber honoring `RUST_LOG`.
///
/// Idempotent: a second call leaves the first subscriber in place.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
