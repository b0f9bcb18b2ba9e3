//! Widget rendering invariant tests
//!
//! Validate the end-to-end mount behavior a host runtime observes:
//! placeholder policy, shape normalization, initial filter application,
//! and byte-for-byte idempotent output.

use serde_json::json;
use srsview_core::{FilterState, Widget};

fn cross_study_payload() -> serde_json::Value {
    json!({
        "summary": [
            {"GroupID": "Site01", "NumStudies": 2, "AvgRiskScore": 80.0,
             "MaxRiskScore": 92.0, "MinRiskScore": 68.0,
             "RedFlags": 3, "AmberFlags": 1, "GreenFlags": 4},
            {"GroupID": "Site02", "NumStudies": 1, "AvgRiskScore": 12.5,
             "MaxRiskScore": 12.5, "MinRiskScore": 12.5,
             "RedFlags": 0, "AmberFlags": 0, "GreenFlags": 6}
        ],
        "details": [
            {"GroupID": "Site01", "StudyID": "S1", "SnapshotDate": "2024-03-01",
             "Score": 92.0, "Numerator": 11, "Denominator": 12},
            {"GroupID": "Site01", "StudyID": "S2", "SnapshotDate": "2024-03-01",
             "Score": 68.0, "Numerator": 8, "Denominator": 12},
            {"GroupID": "Site02", "StudyID": "S1", "SnapshotDate": "2024-03-01",
             "Score": 12.5, "Numerator": 1, "Denominator": 8}
        ],
        "groups": [
            {"GroupID": "Site01", "InvestigatorName": "Dr. Alvarez"}
        ],
        "outcome": "srs"
    })
}

#[test]
fn empty_summary_renders_placeholder_without_a_table() {
    let markup = Widget::new().mount(&json!({"summary": []}));
    assert!(markup.contains("srs-placeholder-missing"));
    assert!(markup.contains("Summary data is empty"));
    assert!(!markup.contains("<table"), "no table element may be created");
}

#[test]
fn absent_summary_renders_a_missing_data_placeholder() {
    let markup = Widget::new().mount(&json!({"unrelated": 1}));
    assert!(markup.contains("srs-placeholder-missing"));
    assert!(markup.contains("No summary data found"));
    assert!(!markup.contains("<table"));
}

#[test]
fn malformed_summary_renders_a_distinct_format_warning() {
    let malformed = Widget::new().mount(&json!({"summary": 42}));
    assert!(malformed.contains("srs-placeholder-format"));
    assert!(!malformed.contains("<table"));

    // distinguishable from the empty-collection message
    let empty = Widget::new().mount(&json!({"summary": []}));
    assert_ne!(malformed, empty);
    assert!(!malformed.contains("Summary data is empty"));
}

#[test]
fn null_payload_renders_a_missing_data_placeholder() {
    let markup = Widget::new().mount(&serde_json::Value::Null);
    assert!(markup.contains("No data provided to widget"));
}

#[test]
fn mount_is_idempotent_byte_for_byte() {
    let widget = Widget::new();
    let payload = cross_study_payload();
    let first = widget.mount(&payload);
    let second = widget.mount(&payload);
    assert_eq!(
        first, second,
        "identical payloads must produce byte-identical markup"
    );
}

#[test]
fn column_oriented_summary_transposes_to_one_row_per_site() {
    let payload = json!({
        "summary": {
            "GroupID": ["Site01", "Site02", "Site03"],
            "NumStudies": [2, 1, 3],
            "AvgRiskScore": [80.0, 12.5, 44.0],
            "MaxRiskScore": [92.0, 12.5, 51.0],
            "MinRiskScore": [68.0, 12.5, 30.0],
            "RedFlags": [3, 0, 1],
            "AmberFlags": [1, 0, 2],
            "GreenFlags": [4, 6, 3]
        }
    });
    let markup = Widget::new().mount(&payload);
    assert_eq!(markup.matches("class=\"summary-row\"").count(), 3);
    // positional order is preserved
    let first = markup.find("Site01").expect("Site01 rendered");
    let third = markup.find("Site03").expect("Site03 rendered");
    assert!(first < third);
}

#[test]
fn summary_and_detail_rows_render_with_details_hidden() {
    let markup = Widget::new().mount(&cross_study_payload());

    assert!(markup.contains("srs-summary-table"));
    assert_eq!(markup.matches("class=\"summary-row\"").count(), 2);
    assert_eq!(markup.matches("class=\"detail-row\"").count(), 2);
    // nested detail rows are hidden until expanded
    assert_eq!(
        markup.matches(r#"class="detail-row" data-group="Site01" style="display:none;""#).count(),
        1
    );
    assert!(markup.contains("Loading details"));
    // collapsed glyph on every action button
    assert_eq!(markup.matches("&#9656;").count(), 2);
}

#[test]
fn severity_band_colours_follow_the_average_score() {
    let markup = Widget::new().mount(&cross_study_payload());
    // Site01 avg 80 -> high band, Site02 avg 12.5 -> lowest band
    assert!(markup.contains("band-high"));
    assert!(markup.contains("#ffcdd2"));
    assert!(markup.contains("band-lowest"));
    assert!(markup.contains("#e8f5e8"));
}

#[test]
fn embedded_data_carries_details_outcome_and_study_sets() {
    let markup = Widget::new().mount(&cross_study_payload());
    assert!(markup.contains("window.__srsData"));
    assert!(markup.contains(r#""outcome":"srs""#));
    assert!(markup.contains(r#""S2""#));
}

#[test]
fn investigator_metadata_annotates_the_summary_row() {
    let markup = Widget::new().mount(&cross_study_payload());
    assert!(markup.contains(r#"title="Investigator: Dr. Alvarez""#));
}

#[test]
fn initial_filter_state_hides_rows_server_side() {
    let widget = Widget::new().with_initial_filter(FilterState {
        score_range: (0.0, 50.0),
        min_studies: 0,
        study: None,
    });
    let markup = widget.mount(&cross_study_payload());

    // Site01 (avg 80) starts hidden, Site02 (avg 12.5) starts visible
    assert!(markup.contains(
        r#"class="summary-row" data-group="Site01" data-score="80.0000" data-studies="2" style="display:none;""#
    ));
    assert!(markup.contains(
        r#"class="summary-row" data-group="Site02" data-score="12.5000" data-studies="1""#
    ));
    // the controls reflect the render-time state
    assert!(markup.contains(r#"id="srs-range-max" min="0" max="100" step="1" value="50""#));
}

#[test]
fn filter_controls_list_distinct_studies_in_order() {
    let markup = Widget::new().mount(&cross_study_payload());
    assert!(markup.contains(r#"<option value="all">All Studies</option>"#));
    let s1 = markup.find(r#"<option value="S1">"#).expect("S1 option");
    let s2 = markup.find(r#"<option value="S2">"#).expect("S2 option");
    assert!(s1 < s2);
}

#[test]
fn flat_data_payload_renders_the_combined_score_table() {
    let payload = json!({
        "data": [
            {"Site": "Site01", "RiskScore": 3, "RiskScoreMax": 24, "RiskScoreNormalized": 12.5},
            {"Site": "Site02", "RiskScore": 6, "RiskScoreMax": 24, "RiskScoreNormalized": 25.0}
        ]
    });
    let markup = Widget::new().mount(&payload);
    assert!(markup.contains("risk-score-table"));
    assert!(markup.contains("3 / 24 (12.5%)"));
    // derived source columns are suppressed everywhere
    assert!(!markup.contains("RiskScoreMax"));
}

#[test]
fn flat_data_accepts_a_json_encoded_string() {
    let payload = json!({
        "data": "[{\"Site\":\"Site01\",\"RiskScore\":3,\"RiskScoreMax\":24,\"RiskScoreNormalized\":12.5}]"
    });
    let markup = Widget::new().mount(&payload);
    assert!(markup.contains("risk-score-table"));
}

#[test]
fn empty_flat_data_renders_a_placeholder() {
    let markup = Widget::new().mount(&json!({"data": []}));
    assert!(markup.contains("srs-placeholder-missing"));
    assert!(markup.contains("No data to display"));
}

#[test]
fn markup_contains_no_timestamp() {
    let markup = Widget::new().mount(&cross_study_payload());
    assert!(!markup.contains("Report generated"));
}

#[test]
fn site_names_are_escaped_in_markup() {
    let payload = json!({
        "summary": [
            {"GroupID": "<b>Site</b>", "NumStudies": 1, "AvgRiskScore": 10.0}
        ]
    });
    let markup = Widget::new().mount(&payload);
    assert!(!markup.contains("<b>Site</b>"));
    assert!(markup.contains("&lt;b&gt;Site&lt;/b&gt;"));
}
