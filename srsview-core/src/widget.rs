//! Widget adapter — the boundary object invoked by the host runtime
//!
//! Parses and validates incoming payloads, resolves the tabular shape once,
//! and delegates to the table renderer. Every mount is stateless: the whole
//! DOM subtree for the widget instance is discarded and rebuilt, so
//! re-invoking `mount` at any time is safe.
//!
//! The interaction helper is injected explicitly rather than discovered via
//! module-level "already loaded" flags; a missing helper takes the
//! dependency-unavailable placeholder path.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::filter::FilterState;
use crate::frame;
use crate::html;

/// The sorting/interaction helper attached to rendered tables
#[derive(Debug, Clone)]
pub struct ControllerScript {
    source: Cow<'static, str>,
}

impl ControllerScript {
    /// The controller shipped with this crate
    pub fn bundled() -> Self {
        ControllerScript {
            source: Cow::Borrowed(html::inline_javascript()),
        }
    }

    /// A caller-supplied controller (host environments may ship their own)
    pub fn from_source(source: String) -> Self {
        ControllerScript {
            source: Cow::Owned(source),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// The widget instance the host mounts payloads into
#[derive(Debug, Clone)]
pub struct Widget {
    controller: Option<ControllerScript>,
    initial: FilterState,
    outcome: Option<String>,
}

impl Default for Widget {
    fn default() -> Self {
        Widget::new()
    }
}

impl Widget {
    pub fn new() -> Self {
        Widget {
            controller: Some(ControllerScript::bundled()),
            initial: FilterState::default(),
            outcome: None,
        }
    }

    /// Replace or remove the injected interaction helper
    pub fn with_controller(mut self, controller: Option<ControllerScript>) -> Self {
        self.controller = controller;
        self
    }

    /// Initial filter defaults applied at render time
    pub fn with_initial_filter(mut self, state: FilterState) -> Self {
        self.initial = state;
        self
    }

    /// Default outcome/metric identifier when the payload names none
    pub fn with_outcome(mut self, outcome: Option<String>) -> Self {
        self.outcome = outcome;
        self
    }

    /// Render the widget markup for a payload.
    ///
    /// Never fails: every error is substituted with visible placeholder
    /// markup in place of the table.
    pub fn mount(&self, payload: &Value) -> String {
        match self.render(payload) {
            Ok(markup) => markup,
            Err(error) => {
                debug!(error = %error, "substituting placeholder for render error");
                error.placeholder()
            }
        }
    }

    /// Table layout is responsive to container width only
    pub fn resize(&self, _width: u32, _height: u32) {}

    fn render(&self, payload: &Value) -> Result<String, RenderError> {
        let controller = self.controller.as_ref().ok_or_else(|| {
            RenderError::DependencyUnavailable("no interaction helper injected".to_string())
        })?;

        if payload.is_null() {
            return Err(RenderError::MissingData(
                "No data provided to widget".to_string(),
            ));
        }

        if debug_requested(payload) {
            let keys: Vec<&String> = payload
                .as_object()
                .map(|map| map.keys().collect())
                .unwrap_or_default();
            debug!(?keys, "widget payload received");
        }

        // Flat variant: a bare `data` collection without a summary/detail split
        if field(payload, "summary").is_none() {
            if let Some(data) = field(payload, "data") {
                return self.render_flat(&data, controller);
            }
        }

        let summary = decoded_field(payload, "summary")?.ok_or_else(|| {
            RenderError::MissingData("No summary data found in widget data".to_string())
        })?;
        let summaries = frame::summaries_from(&summary)?;
        if summaries.is_empty() {
            return Err(RenderError::MissingData(
                "Summary data is empty".to_string(),
            ));
        }

        // detail problems stay scoped to the drill-down, never the summary
        let details = detail_rows(payload);

        let investigators = match decoded_field(payload, "groups") {
            Ok(Some(value)) => investigator_names(&value),
            Ok(None) => BTreeMap::new(),
            Err(error) => {
                warn!(error = %error, "ignoring malformed grouping metadata");
                BTreeMap::new()
            }
        };

        let outcome = field(payload, "outcome")
            .and_then(|v| v.as_str().map(str::to_string))
            .or_else(|| self.outcome.clone());

        Ok(html::render_summary_widget(
            &summaries,
            &details,
            &investigators,
            &self.initial,
            outcome.as_deref(),
            controller.source(),
        ))
    }

    fn render_flat(
        &self,
        data: &Value,
        controller: &ControllerScript,
    ) -> Result<String, RenderError> {
        let decoded = decode_value(data)?;
        let rows = frame::to_rows(&decoded)?;
        if rows.is_empty() {
            return Err(RenderError::MissingData(
                "No data to display".to_string(),
            ));
        }
        Ok(html::render_flat_widget(&rows, controller.source()))
    }
}

/// Whether the payload asks for debug logging
fn debug_requested(payload: &Value) -> bool {
    field(payload, "debug")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn field(payload: &Value, key: &str) -> Option<Value> {
    payload.as_object().and_then(|map| map.get(key)).cloned()
}

/// Fetch a recognized top-level field, decoding it first when it arrives as
/// a JSON-encoded string
fn decoded_field(payload: &Value, key: &str) -> Result<Option<Value>, RenderError> {
    match field(payload, key) {
        Some(value) => decode_value(&value).map(Some),
        None => Ok(None),
    }
}

fn decode_value(value: &Value) -> Result<Value, RenderError> {
    match value {
        Value::String(encoded) => serde_json::from_str(encoded)
            .map_err(|e| RenderError::Format(format!("malformed JSON field: {e}"))),
        other => Ok(other.clone()),
    }
}

/// Study-level detail rows from the `details` (alias `results`) collection.
/// Any problem here degrades to an empty drill-down rather than touching
/// the summary table.
fn detail_rows(payload: &Value) -> Vec<crate::model::RiskRow> {
    let value = match decoded_field(payload, "details") {
        Ok(Some(value)) => Some(value),
        Ok(None) => match decoded_field(payload, "results") {
            Ok(value) => value,
            Err(error) => {
                warn!(error = %error, "ignoring malformed results collection");
                None
            }
        },
        Err(error) => {
            warn!(error = %error, "ignoring malformed detail collection");
            None
        }
    };
    let Some(value) = value else {
        return Vec::new();
    };
    match frame::risk_rows_from(&value) {
        Ok(rows) => rows,
        Err(error) => {
            warn!(error = %error, "ignoring malformed detail collection");
            Vec::new()
        }
    }
}

/// Site -> investigator name, from the grouping metadata collection
fn investigator_names(groups: &Value) -> BTreeMap<String, String> {
    let rows = match frame::to_rows(groups) {
        Ok(rows) => rows,
        Err(error) => {
            warn!(error = %error, "ignoring malformed grouping metadata");
            return BTreeMap::new();
        }
    };
    let mut names = BTreeMap::new();
    for row in rows {
        let group = row.get("GroupID").and_then(Value::as_str);
        let name = row.get("InvestigatorName").and_then(Value::as_str);
        if let (Some(group), Some(name)) = (group, name) {
            names.insert(group.to_string(), name.to_string());
        }
    }
    names
}
