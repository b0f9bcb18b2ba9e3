//! Data model for risk-score table rendering
//!
//! Global invariants enforced:
//! - All entities are transient, rebuilt on every render from the payload
//! - Field names mirror the upstream reporting environment's column names
//! - Flag counts are non-negative by construction

use serde::{Deserialize, Serialize};

/// One study-level risk observation for a site.
///
/// Numeric fields are optional: upstream snapshots omit columns freely and
/// the formatter degrades to an empty cell rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskRow {
    #[serde(rename = "GroupID")]
    pub group_id: String,
    #[serde(rename = "StudyID")]
    pub study_id: String,
    #[serde(rename = "SnapshotDate", default)]
    pub snapshot_date: String,
    /// Normalized risk score, 0-100. Invariant: `score <= max` when both set.
    #[serde(rename = "Score", default)]
    pub score: Option<f64>,
    #[serde(rename = "Max", default)]
    pub max: Option<f64>,
    #[serde(rename = "Numerator", default)]
    pub numerator: Option<i64>,
    #[serde(rename = "Denominator", default)]
    pub denominator: Option<i64>,
    #[serde(rename = "RedFlags", default)]
    pub red_flags: u32,
    #[serde(rename = "AmberFlags", default)]
    pub amber_flags: u32,
    #[serde(rename = "GreenFlags", default)]
    pub green_flags: u32,
    #[serde(rename = "InvestigatorName", default, skip_serializing_if = "Option::is_none")]
    pub investigator_name: Option<String>,
    /// Metric the observation belongs to; drill-down filters on the
    /// payload's chosen outcome identifier.
    #[serde(rename = "MetricID", default, skip_serializing_if = "Option::is_none")]
    pub metric_id: Option<String>,
}

/// Aggregated per-site record.
///
/// Invariant: `min_risk_score <= avg_risk_score <= max_risk_score`
/// (produced upstream; not re-derived here).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSummary {
    #[serde(rename = "GroupID")]
    pub group_id: String,
    #[serde(rename = "NumStudies", default)]
    pub num_studies: u32,
    #[serde(rename = "AvgRiskScore", default)]
    pub avg_risk_score: Option<f64>,
    #[serde(rename = "MaxRiskScore", default)]
    pub max_risk_score: Option<f64>,
    #[serde(rename = "MinRiskScore", default)]
    pub min_risk_score: Option<f64>,
    #[serde(rename = "RedFlags", default)]
    pub red_flags: u32,
    #[serde(rename = "AmberFlags", default)]
    pub amber_flags: u32,
    #[serde(rename = "GreenFlags", default)]
    pub green_flags: u32,
}

/// Flag severity colour for the label-with-icon formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagColour {
    Red,
    Amber,
    Green,
}

impl FlagColour {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlagColour::Red => "flag-red",
            FlagColour::Amber => "flag-amber",
            FlagColour::Green => "flag-green",
        }
    }
}

/// Per-column formatter tag
#[derive(Debug, Clone, PartialEq)]
pub enum CellFormat {
    /// Verbatim text
    Plain,
    /// Score rendered with its severity band colour
    ScoreBand,
    /// Non-negative count rendered with a coloured icon
    FlagCount(FlagColour),
    /// `"raw/max (normalized%)"` composed from sibling columns; the named
    /// source columns are suppressed from the rendered table
    Combined { raw_key: String, max_key: String },
}

/// One column definition: lookup key, display label, formatter
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub format: CellFormat,
    /// Raw component consumed by a `Combined` formatter; omitted from the
    /// header and every body cell
    pub derived_source: bool,
}

impl ColumnSpec {
    pub fn new(key: &str, label: &str, format: CellFormat) -> Self {
        ColumnSpec {
            key: key.to_string(),
            label: label.to_string(),
            format,
            derived_source: false,
        }
    }

    pub fn derived(key: &str) -> Self {
        ColumnSpec {
            key: key.to_string(),
            label: String::new(),
            format: CellFormat::Plain,
            derived_source: true,
        }
    }
}

/// Ordered column definitions for one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Columns of the cross-study site summary table
    pub fn site_summary() -> Self {
        TableSpec {
            columns: vec![
                ColumnSpec::new("GroupID", "Site", CellFormat::Plain),
                ColumnSpec::new("NumStudies", "Studies", CellFormat::Plain),
                ColumnSpec::new("AvgRiskScore", "Avg Risk Score", CellFormat::ScoreBand),
                ColumnSpec::new("MaxRiskScore", "Max Risk Score", CellFormat::Plain),
                ColumnSpec::new("MinRiskScore", "Min Risk Score", CellFormat::Plain),
                ColumnSpec::new("RedFlags", "Red Flags", CellFormat::FlagCount(FlagColour::Red)),
                ColumnSpec::new(
                    "AmberFlags",
                    "Amber Flags",
                    CellFormat::FlagCount(FlagColour::Amber),
                ),
                ColumnSpec::new(
                    "GreenFlags",
                    "Green Flags",
                    CellFormat::FlagCount(FlagColour::Green),
                ),
            ],
        }
    }

    /// Columns of the per-site study drill-down table
    pub fn study_detail() -> Self {
        TableSpec {
            columns: vec![
                ColumnSpec::new("StudyID", "Study", CellFormat::Plain),
                ColumnSpec::new("SnapshotDate", "Snapshot Date", CellFormat::Plain),
                ColumnSpec::new("Score", "Risk Score", CellFormat::ScoreBand),
                ColumnSpec::new("Numerator", "Raw Score", CellFormat::Plain),
                ColumnSpec::new("Denominator", "Max Score", CellFormat::Plain),
            ],
        }
    }

    /// Columns visible after derived-source suppression
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.derived_source)
    }
}

/// One cell value as exposed by a record
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Num(f64),
    Int(i64),
    Missing,
}

impl CellValue {
    /// Numeric view of the cell, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Num(v) => Some(*v),
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Text(_) | CellValue::Missing => None,
        }
    }
}

/// Cell access by column key; the seam between typed records and the
/// TableSpec-driven table renderer
pub trait Record {
    fn cell(&self, key: &str) -> CellValue;
}

fn opt_num(value: Option<f64>) -> CellValue {
    value.map_or(CellValue::Missing, CellValue::Num)
}

fn opt_int(value: Option<i64>) -> CellValue {
    value.map_or(CellValue::Missing, CellValue::Int)
}

impl Record for SiteSummary {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "GroupID" => CellValue::Text(self.group_id.clone()),
            "NumStudies" => CellValue::Int(i64::from(self.num_studies)),
            "AvgRiskScore" => opt_num(self.avg_risk_score),
            "MaxRiskScore" => opt_num(self.max_risk_score),
            "MinRiskScore" => opt_num(self.min_risk_score),
            "RedFlags" => CellValue::Int(i64::from(self.red_flags)),
            "AmberFlags" => CellValue::Int(i64::from(self.amber_flags)),
            "GreenFlags" => CellValue::Int(i64::from(self.green_flags)),
            _ => CellValue::Missing,
        }
    }
}

impl Record for RiskRow {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "GroupID" => CellValue::Text(self.group_id.clone()),
            "StudyID" => CellValue::Text(self.study_id.clone()),
            "SnapshotDate" => CellValue::Text(self.snapshot_date.clone()),
            "Score" => opt_num(self.score),
            "Max" => opt_num(self.max),
            "Numerator" => opt_int(self.numerator),
            "Denominator" => opt_int(self.denominator),
            "RedFlags" => CellValue::Int(i64::from(self.red_flags)),
            "AmberFlags" => CellValue::Int(i64::from(self.amber_flags)),
            "GreenFlags" => CellValue::Int(i64::from(self.green_flags)),
            "InvestigatorName" => self
                .investigator_name
                .clone()
                .map_or(CellValue::Missing, CellValue::Text),
            "MetricID" => self
                .metric_id
                .clone()
                .map_or(CellValue::Missing, CellValue::Text),
            _ => CellValue::Missing,
        }
    }
}

/// Untyped row (flat table variant): cells straight from the payload map
impl Record for serde_json::Map<String, serde_json::Value> {
    fn cell(&self, key: &str) -> CellValue {
        match self.get(key) {
            Some(serde_json::Value::String(s)) => CellValue::Text(s.clone()),
            Some(serde_json::Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    n.as_f64().map_or(CellValue::Missing, CellValue::Num)
                }
            }
            Some(serde_json::Value::Bool(b)) => CellValue::Text(b.to_string()),
            Some(serde_json::Value::Null) | None => CellValue::Missing,
            Some(other) => CellValue::Text(other.to_string()),
        }
    }
}
