//! Render error taxonomy
//!
//! Every variant is handled locally by substituting visible placeholder
//! markup in place of the table; none propagate to the host as a hard
//! failure, and no operation is retried.

use thiserror::Error;

/// Errors raised while turning a payload into table markup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// Malformed or mismatched tabular input
    #[error("format error: {0}")]
    Format(String),

    /// Required collection absent or empty
    #[error("missing data: {0}")]
    MissingData(String),

    /// An expected rendering helper is not present at call time
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl RenderError {
    /// CSS class suffix identifying the error family in rendered output.
    /// Each family gets a distinct class so an empty collection is
    /// distinguishable from a malformed one.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::Format(_) => "format",
            RenderError::MissingData(_) => "missing",
            RenderError::DependencyUnavailable(_) => "dependency",
        }
    }

    /// Human-readable placeholder markup substituted for the table
    pub fn placeholder(&self) -> String {
        let message = match self {
            RenderError::Format(detail) => {
                format!("Data is not in the expected tabular format: {detail}")
            }
            RenderError::MissingData(detail) => detail.clone(),
            RenderError::DependencyUnavailable(detail) => {
                format!("Interactive table helper is unavailable: {detail}")
            }
        };
        format!(
            r#"<div class="srs-placeholder srs-placeholder-{kind}"><em>{message}</em></div>"#,
            kind = self.kind(),
            message = crate::html::html_escape(&message),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_classes_are_distinct_per_family() {
        let format = RenderError::Format("mismatched column lengths".to_string());
        let missing = RenderError::MissingData("Summary data is empty".to_string());
        let dependency = RenderError::DependencyUnavailable("no controller".to_string());

        assert!(format.placeholder().contains("srs-placeholder-format"));
        assert!(missing.placeholder().contains("srs-placeholder-missing"));
        assert!(dependency.placeholder().contains("srs-placeholder-dependency"));
        assert_ne!(format.placeholder(), missing.placeholder());
    }

    #[test]
    fn placeholder_escapes_detail_text() {
        let err = RenderError::Format("<script>".to_string());
        assert!(!err.placeholder().contains("<script>"));
        assert!(err.placeholder().contains("&lt;script&gt;"));
    }
}
