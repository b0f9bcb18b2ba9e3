//! Static table construction
//!
//! Builds header and body markup from a `TableSpec` and an ordered sequence
//! of records, one body row per record in input order. Derived-source
//! columns (raw components consumed by a combined formatter) are omitted
//! from the header and every body cell.

use crate::format::{combined_score, scale_colour, score_text, Band};
use crate::html::html_escape;
use crate::model::{CellFormat, CellValue, ColumnSpec, Record, TableSpec};

/// Header cells for the visible columns, each sortable
pub fn header_cells(spec: &TableSpec) -> String {
    spec.visible_columns()
        .map(|column| {
            format!(
                r#"<th class="sortable" data-column="{key}">{label}</th>"#,
                key = html_escape(&column.key),
                label = html_escape(&column.label),
            )
        })
        .collect()
}

/// Body cells for one record, visible columns only, formatted per tag
pub fn body_cells(spec: &TableSpec, record: &dyn Record) -> String {
    spec.visible_columns()
        .map(|column| render_cell(column, record))
        .collect()
}

fn render_cell(column: &ColumnSpec, record: &dyn Record) -> String {
    match &column.format {
        CellFormat::Plain => {
            format!("<td>{}</td>", html_escape(&cell_text(record.cell(&column.key))))
        }
        CellFormat::ScoreBand => match record.cell(&column.key).as_f64() {
            Some(score) => {
                let band = Band::from_score(score);
                format!(
                    r#"<td class="score-cell band-{band}" style="background-color:{colour};">{text}</td>"#,
                    band = band.as_str(),
                    colour = band.colour(),
                    text = score_text(Some(score)),
                )
            }
            None => "<td></td>".to_string(),
        },
        CellFormat::FlagCount(colour) => {
            let count = cell_text(record.cell(&column.key));
            format!(
                r#"<td class="flag-cell"><span class="flag {class}">&#9679; {count}</span></td>"#,
                class = colour.css_class(),
                count = html_escape(&count),
            )
        }
        CellFormat::Combined { raw_key, max_key } => {
            let raw = record.cell(raw_key).as_f64();
            let max = record.cell(max_key).as_f64();
            let normalized = record.cell(&column.key).as_f64();
            let text = combined_score(raw, max, normalized);
            match normalized {
                Some(value) if !text.is_empty() => format!(
                    r#"<td class="score-cell" style="background:{colour};">{text}</td>"#,
                    colour = scale_colour((value * 10.0).round() / 10.0),
                    text = html_escape(&text),
                ),
                _ => format!("<td>{}</td>", html_escape(&text)),
            }
        }
    }
}

fn cell_text(value: CellValue) -> String {
    match value {
        CellValue::Text(text) => text,
        CellValue::Num(number) => {
            if number.fract() == 0.0 && number.abs() < 1e15 {
                (number as i64).to_string()
            } else {
                number.to_string()
            }
        }
        CellValue::Int(number) => number.to_string(),
        CellValue::Missing => String::new(),
    }
}

/// Complete table markup: one header row, one body row per record
pub fn render_table(spec: &TableSpec, records: &[&dyn Record], css_class: &str) -> String {
    let rows: String = records
        .iter()
        .map(|record| format!("<tr>{}</tr>", body_cells(spec, *record)))
        .collect();
    format!(
        r#"<table class="{css_class}"><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>"#,
        css_class = css_class,
        header = header_cells(spec),
        rows = rows,
    )
}

/// Column spec for the flat risk-score table variant, derived from the
/// first row's column names. The three risk-score source columns collapse
/// into one combined column; everything else renders plain, in input order.
pub fn flat_spec(keys: &[String]) -> TableSpec {
    let columns = keys
        .iter()
        .map(|key| match key.as_str() {
            "RiskScoreNormalized" => ColumnSpec {
                key: key.clone(),
                label: "Risk Score".to_string(),
                format: CellFormat::Combined {
                    raw_key: "RiskScore".to_string(),
                    max_key: "RiskScoreMax".to_string(),
                },
                derived_source: false,
            },
            "RiskScore" | "RiskScoreMax" => ColumnSpec::derived(key),
            _ => ColumnSpec::new(key, key, CellFormat::Plain),
        })
        .collect();
    TableSpec { columns }
}
