//! srsview core library - clinical-trial Site Risk Score (SRS) table widgets
//!
//! Renders site/study risk-score payloads as self-contained interactive
//! HTML tables: severity-banded scores, flag counts, per-site drill-down,
//! and an embedded controller script for sorting and filtering.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Rendering is pure string construction: no clocks, threads, or async
// - No global mutable state; helpers are injected, never discovered
// - Identical payload yields byte-for-byte identical markup
// - Row order follows the input's positional order
// - Errors surface as placeholder markup, never as host-visible failures

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod frame;
pub mod html;
pub mod model;
pub mod sort;
pub mod table;
pub mod widget;

pub use config::{load_and_resolve, ResolvedOptions, SrsViewConfig};
pub use error::RenderError;
pub use filter::{recompute_visibility, FilterState};
pub use model::{RiskRow, SiteSummary, TableSpec};
pub use widget::{ControllerScript, Widget};

/// Render a payload to a standalone HTML document with the given options.
///
/// Convenience entry for hosts that want a complete page rather than a
/// mountable fragment.
pub fn render_report(payload: &serde_json::Value, options: &ResolvedOptions) -> String {
    let widget = Widget::new()
        .with_initial_filter(options.initial.clone())
        .with_outcome(options.outcome.clone());
    let body = widget.mount(payload);
    html::render_page(&options.title, &body)
}
