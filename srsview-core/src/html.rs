//! HTML widget generation
//!
//! Produces self-contained markup with embedded CSS and JavaScript: the
//! rendered table works offline, and the embedded controller script carries
//! the live half of the interaction logic (sorting, filtering,
//! expand/collapse). Rendering replaces the mount target's content
//! entirely; there is no incremental patching.
//!
//! Global invariants enforced:
//! - Identical input yields byte-for-byte identical markup
//! - Body rows appear in input order until the user sorts

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::filter::{recompute_visibility, FilterState};
use crate::model::{Record, RiskRow, SiteSummary, TableSpec};
use crate::table::{body_cells, flat_spec, header_cells, render_table};

/// Data handed to the embedded controller script
#[derive(Debug, Serialize)]
struct EmbeddedData<'a> {
    details: &'a [RiskRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a str>,
    studies: &'a BTreeMap<String, BTreeSet<String>>,
}

/// Render the cross-study summary widget: heading, summary cards, filter
/// controls, summary table with hidden per-site detail rows, embedded data
/// and controller script.
pub fn render_summary_widget(
    summaries: &[SiteSummary],
    details: &[RiskRow],
    investigators: &BTreeMap<String, String>,
    state: &FilterState,
    outcome: Option<&str>,
    controller: &str,
) -> String {
    let spec = TableSpec::site_summary();
    let studies = crate::filter::studies_by_group(details);
    let visible = recompute_visibility(state, summaries, &studies);
    let column_count = spec.visible_columns().count() + 1; // + action column

    let rows: String = summaries
        .iter()
        .map(|summary| {
            let hidden = if visible.contains(&summary.group_id) {
                ""
            } else {
                r#" style="display:none;""#
            };
            let title = investigators
                .get(&summary.group_id)
                .map(|name| format!(r#" title="Investigator: {}""#, html_escape(name)))
                .unwrap_or_default();
            format!(
                r#"<tr class="summary-row" data-group="{group}" data-score="{score}" data-studies="{studies}"{hidden}{title}>{cells}<td class="action-cell"><button type="button" class="details-btn" data-group="{group}"><span class="toggle-glyph">&#9656;</span> Details</button></td></tr>
<tr class="detail-row" data-group="{group}" style="display:none;"><td colspan="{colspan}"><div class="detail-content" data-group="{group}">Loading details&#8230;</div></td></tr>"#,
                group = html_escape(&summary.group_id),
                score = summary
                    .avg_risk_score
                    .map(|s| format!("{s:.4}"))
                    .unwrap_or_default(),
                studies = summary.num_studies,
                hidden = hidden,
                title = title,
                cells = body_cells(&spec, summary),
                colspan = column_count,
            )
        })
        .collect();

    let data = EmbeddedData {
        details,
        outcome,
        studies: &studies,
    };
    let data_json = serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"<div class="srs-widget">
<style>{css}</style>
<h3>Cross-Study Site Risk Score Summary</h3>
{cards}
{controls}
<table id="srs-summary-table" class="summary-table">
<thead><tr>{header}<th class="action-header">Action</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
<script>window.__srsData = {data_json};</script>
<script>{controller}</script>
</div>"#,
        css = inline_css(),
        cards = render_summary_cards(summaries),
        controls = render_filter_controls(state, &studies),
        header = header_cells(&spec),
        rows = rows,
        data_json = data_json,
        controller = controller,
    )
}

/// Render the flat risk-score table variant: a single-level table with the
/// combined score column, sortable via the same controller script.
pub fn render_flat_widget(
    rows: &[serde_json::Map<String, serde_json::Value>],
    controller: &str,
) -> String {
    let keys: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    let spec = flat_spec(&keys);
    let records: Vec<&dyn Record> = rows.iter().map(|row| row as &dyn Record).collect();
    format!(
        r#"<div class="srs-widget">
<style>{css}</style>
{table}
<script>{controller}</script>
</div>"#,
        css = inline_css(),
        table = render_table(&spec, &records, "risk-score-table"),
        controller = controller,
    )
}

/// Summary cards above the table (site count, studies, flag totals)
fn render_summary_cards(summaries: &[SiteSummary]) -> String {
    let total_studies: u32 = summaries.iter().map(|s| s.num_studies).sum();
    let red: u32 = summaries.iter().map(|s| s.red_flags).sum();
    let amber: u32 = summaries.iter().map(|s| s.amber_flags).sum();
    let green: u32 = summaries.iter().map(|s| s.green_flags).sum();

    format!(
        r#"<div class="summary-cards">
<div class="summary-card"><h4>Sites</h4><div class="value">{sites}</div></div>
<div class="summary-card"><h4>Studies</h4><div class="value">{studies}</div></div>
<div class="summary-card"><h4>Red Flags</h4><div class="value flag-red">{red}</div></div>
<div class="summary-card"><h4>Amber Flags</h4><div class="value flag-amber">{amber}</div></div>
<div class="summary-card"><h4>Green Flags</h4><div class="value flag-green">{green}</div></div>
</div>"#,
        sites = summaries.len(),
        studies = total_studies,
        red = red,
        amber = amber,
        green = green,
    )
}

/// Filter controls: SRS range, minimum study count, study select, reset.
/// Initial values come from the render-time `FilterState`.
fn render_filter_controls(
    state: &FilterState,
    studies: &BTreeMap<String, BTreeSet<String>>,
) -> String {
    let mut all_studies: BTreeSet<&String> = BTreeSet::new();
    for set in studies.values() {
        all_studies.extend(set.iter());
    }
    let options: String = all_studies
        .iter()
        .map(|study| {
            let selected = if state.study.as_deref() == Some(study.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{value}"{selected}>{value}</option>"#,
                value = html_escape(study),
                selected = selected,
            )
        })
        .collect();

    format!(
        r#"<div class="filters">
<div class="filter-group"><label for="srs-range-min">SRS Min</label><input type="number" id="srs-range-min" min="0" max="100" step="1" value="{min}"></div>
<div class="filter-group"><label for="srs-range-max">SRS Max</label><input type="number" id="srs-range-max" min="0" max="100" step="1" value="{max}"></div>
<div class="filter-group"><label for="srs-min-studies">Min Studies</label><input type="number" id="srs-min-studies" min="0" step="1" value="{min_studies}"></div>
<div class="filter-group"><label for="srs-study-filter">Study</label><select id="srs-study-filter"><option value="all">All Studies</option>{options}</select></div>
<div class="filter-group"><label>&nbsp;</label><button type="button" id="srs-filter-reset" class="reset-btn">Reset</button></div>
</div>"#,
        min = trim(state.score_range.0),
        max = trim(state.score_range.1),
        min_studies = state.min_studies,
        options = options,
    )
}

fn trim(value: f64) -> String {
    if value.fract() == 0.0 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Wrap widget markup in a standalone HTML document
pub fn render_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{title}</h1>
        </header>
        {body}
        <footer>
            <p>Generated by srsview</p>
        </footer>
    </div>
</body>
</html>"#,
        title = html_escape(title),
        css = page_css(),
        body = body,
    )
}

/// Page-level styles for the standalone document shell
fn page_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.6; color: #111827; background: #ffffff; }
.container { max-width: 1400px; margin: 0 auto; padding: 2rem; }
header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 2px solid #e5e7eb; }
header h1 { font-size: 2rem; font-weight: 700; }
footer { margin-top: 3rem; padding-top: 1rem; border-top: 1px solid #e5e7eb; text-align: center; color: #6b7280; font-size: 0.875rem; }
@media (prefers-color-scheme: dark) {
    body { background: #111827; color: #f9fafb; }
    header { border-bottom-color: #374151; }
    footer { border-top-color: #374151; }
}
"#
}

/// Widget-scoped styles, embedded with every mount
pub fn inline_css() -> &'static str {
    r#"
.srs-widget table { width: 100%; border-collapse: collapse; margin-bottom: 1.25rem; }
.srs-widget th { padding: 0.5rem; text-align: left; font-weight: 600; font-size: 0.875rem; color: #374151; background: #f5f5f5; border: 1px solid #ccc; }
.srs-widget td { padding: 0.5rem; border: 1px solid #ccc; font-size: 0.875rem; }
.srs-widget h3 { font-size: 1.25rem; font-weight: 700; margin-bottom: 0.75rem; }
.srs-widget tbody tr.summary-row:hover { background: #f3f4f6; }

/* Sortable headers */
.srs-widget th.sortable { cursor: pointer; user-select: none; }
.srs-widget th.sortable:hover { background: #e5e7eb; }
.srs-widget th.sortable::after { content: ' \2195'; opacity: 0.3; }
.srs-widget th.sortable.asc::after { content: ' \2191'; opacity: 1; }
.srs-widget th.sortable.desc::after { content: ' \2193'; opacity: 1; }

/* Score bands */
.srs-widget td.score-cell { text-align: center; }
.srs-widget .band-lowest { color: #1b5e20; }
.srs-widget .band-low { color: #8d6e00; }
.srs-widget .band-medium { color: #e65100; }
.srs-widget .band-high { color: #b71c1c; font-weight: 600; }

/* Flag counts */
.srs-widget td.flag-cell { text-align: center; }
.srs-widget .flag-red { color: #d32f2f; }
.srs-widget .flag-amber { color: #f57c00; }
.srs-widget .flag-green { color: #388e3c; }

/* Summary cards */
.summary-cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 0.75rem; margin-bottom: 1.25rem; }
.summary-card { background: #f9fafb; padding: 0.75rem; border-radius: 0.5rem; border-left: 4px solid #3b82f6; }
.summary-card h4 { font-size: 0.75rem; font-weight: 600; color: #6b7280; margin-bottom: 0.25rem; }
.summary-card .value { font-size: 1.25rem; font-weight: 700; }

/* Filters */
.filters { display: flex; gap: 1rem; margin-bottom: 1rem; flex-wrap: wrap; align-items: flex-end; }
.filter-group { display: flex; flex-direction: column; gap: 0.25rem; }
.filter-group label { font-size: 0.75rem; font-weight: 600; color: #6b7280; }
.filter-group select, .filter-group input { padding: 0.4rem; border: 1px solid #d1d5db; border-radius: 0.375rem; font-size: 0.875rem; }
.filter-group select:focus, .filter-group input:focus { outline: none; border-color: #3b82f6; }
.reset-btn { padding: 0.4rem 0.8rem; border: 1px solid #d1d5db; border-radius: 0.375rem; background: #ffffff; cursor: pointer; font-size: 0.875rem; }
.reset-btn:hover { background: #f3f4f6; }

/* Details */
.details-btn { padding: 0.25rem 0.6rem; background: #2196f3; color: #ffffff; border: none; border-radius: 3px; cursor: pointer; font-size: 0.8125rem; }
.details-btn:hover { background: #1976d2; }
.srs-widget tr.detail-row > td { background: #f9f9f9; padding: 0.75rem; }
.detail-content h4 { margin-bottom: 0.5rem; font-size: 0.9375rem; }
.detail-content table { margin: 0.5rem 0 0 0; }
.detail-error { color: #b71c1c; background: #fef2f2; border: 1px solid #fecaca; border-radius: 0.375rem; padding: 0.5rem 0.75rem; font-size: 0.8125rem; }

/* Placeholders */
.srs-placeholder { padding: 0.75rem; color: #6b7280; }
.srs-placeholder-format { color: #92400e; }

@media (prefers-color-scheme: dark) {
    .srs-widget th { background: #1f2937; color: #f9fafb; border-color: #374151; }
    .srs-widget td { border-color: #374151; }
    .srs-widget tbody tr.summary-row:hover { background: #1f2937; }
    .srs-widget th.sortable:hover { background: #374151; }
    .summary-card { background: #1f2937; }
    .filter-group select, .filter-group input { background: #1f2937; border-color: #374151; color: #f9fafb; }
    .reset-btn { background: #1f2937; border-color: #374151; color: #f9fafb; }
    .srs-widget tr.detail-row > td { background: #1f2937; }
}
"#
}

/// The interactive controller: sorting for any table in the widget, plus
/// filter and expand/collapse wiring when the summary table is present.
/// Attachment is idempotent and deferred briefly past DOM-ready, matching
/// the host environment's render timing.
pub fn inline_javascript() -> &'static str {
    r#"
(function() {
    var GLYPH_COLLAPSED = '▸';
    var GLYPH_EXPANDED = '▾';

    function numericValue(text) {
        var stripped = String(text).replace(/[^0-9.\-]/g, '');
        if (stripped === '') return NaN;
        return parseFloat(stripped);
    }

    function bandColour(score) {
        if (score >= 75) return '#ffcdd2';
        if (score >= 50) return '#ffe0b2';
        if (score >= 25) return '#fff3e0';
        return '#e8f5e8';
    }

    function escapeHtml(text) {
        return String(text)
            .replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;')
            .replace(/"/g, '&quot;').replace(/'/g, '&#39;');
    }

    function summaryRows(table) {
        return Array.prototype.slice.call(table.querySelectorAll('tbody tr.summary-row'));
    }

    function detailRowFor(table, group) {
        var rows = table.querySelectorAll('tbody tr.detail-row');
        for (var i = 0; i < rows.length; i++) {
            if (rows[i].getAttribute('data-group') === group) return rows[i];
        }
        return null;
    }

    function attachSorting(table) {
        var headers = Array.prototype.slice.call(table.querySelectorAll('th.sortable'));
        headers.forEach(function(th) {
            th.addEventListener('click', function() {
                var ascending = !th.classList.contains('asc');
                headers.forEach(function(other) { other.classList.remove('asc', 'desc'); });
                th.classList.add(ascending ? 'asc' : 'desc');

                var index = th.cellIndex;
                var tbody = table.tBodies[0];
                var rows = summaryRows(table);
                if (rows.length === 0) {
                    rows = Array.prototype.slice.call(tbody.rows);
                }
                rows.sort(function(a, b) {
                    var aText = a.cells[index] ? a.cells[index].textContent : '';
                    var bText = b.cells[index] ? b.cells[index].textContent : '';
                    var aNum = numericValue(aText);
                    var bNum = numericValue(bText);
                    if (!isNaN(aNum) && !isNaN(bNum)) {
                        return ascending ? aNum - bNum : bNum - aNum;
                    }
                    return ascending ? aText.localeCompare(bText) : bText.localeCompare(aText);
                });
                rows.forEach(function(row) {
                    tbody.appendChild(row);
                    var group = row.getAttribute('data-group');
                    if (group !== null) {
                        var detail = detailRowFor(table, group);
                        if (detail) tbody.appendChild(detail);
                    }
                });
            });
        });
    }

    function numberOr(id, fallback) {
        var value = parseFloat(document.getElementById(id).value);
        return isNaN(value) ? fallback : value;
    }

    function readFilterState() {
        return {
            min: numberOr('srs-range-min', 0),
            max: numberOr('srs-range-max', 100),
            minStudies: numberOr('srs-min-studies', 0),
            study: document.getElementById('srs-study-filter').value
        };
    }

    function groupVisible(state, row, data) {
        var score = parseFloat(row.getAttribute('data-score'));
        if (isNaN(score)) score = 0;
        if (score < state.min || score > state.max) return false;
        var studies = parseInt(row.getAttribute('data-studies'), 10) || 0;
        if (studies < state.minStudies) return false;
        if (state.study !== 'all') {
            var group = row.getAttribute('data-group');
            var members = (data.studies && data.studies[group]) || [];
            if (members.indexOf(state.study) === -1) return false;
        }
        return true;
    }

    function applyFilters(table, data, expanded) {
        var state = readFilterState();
        summaryRows(table).forEach(function(row) {
            var group = row.getAttribute('data-group');
            var visible = groupVisible(state, row, data);
            row.style.display = visible ? '' : 'none';
            var detail = detailRowFor(table, group);
            if (detail) {
                detail.style.display = (visible && expanded[group]) ? '' : 'none';
            }
        });
    }

    function buildDetails(group, data) {
        var rows = (data.details || []).filter(function(d) {
            if (d.GroupID !== group) return false;
            if (!data.outcome) return true;
            if (!('MetricID' in d)) return true;
            return d.MetricID === data.outcome;
        });
        if (rows.length === 0) {
            return '<p>No details available for this site.</p>';
        }
        var html = '<h4>Risk Score Details for ' + escapeHtml(group) + '</h4>';
        html += '<table><thead><tr><th>Study</th><th>Snapshot Date</th><th>Risk Score</th><th>Raw Score</th><th>Max Score</th></tr></thead><tbody>';
        rows.forEach(function(d) {
            var score = typeof d.Score === 'number' ? d.Score : NaN;
            var scoreCell = isNaN(score)
                ? '<td></td>'
                : '<td class="score-cell" style="background-color:' + bandColour(score) + ';">' + score.toFixed(1) + '%</td>';
            html += '<tr>'
                + '<td>' + escapeHtml(d.StudyID == null ? '' : d.StudyID) + '</td>'
                + '<td>' + escapeHtml(d.SnapshotDate == null ? '' : d.SnapshotDate) + '</td>'
                + scoreCell
                + '<td>' + escapeHtml(d.Numerator == null ? '' : d.Numerator) + '</td>'
                + '<td>' + escapeHtml(d.Denominator == null ? '' : d.Denominator) + '</td>'
                + '</tr>';
        });
        html += '</tbody></table>';
        return html;
    }

    function attachDetails(table, data, expanded) {
        Array.prototype.slice.call(table.querySelectorAll('button.details-btn')).forEach(function(btn) {
            btn.addEventListener('click', function(event) {
                event.stopPropagation();
                var group = btn.getAttribute('data-group');
                var detail = detailRowFor(table, group);
                if (!detail) return;
                var glyph = btn.querySelector('.toggle-glyph');
                if (expanded[group]) {
                    expanded[group] = false;
                    detail.style.display = 'none';
                    if (glyph) glyph.textContent = GLYPH_COLLAPSED;
                } else {
                    expanded[group] = true;
                    // rebuilt on every expand from the same source rows
                    var content = detail.querySelector('.detail-content');
                    if (content) {
                        try {
                            content.innerHTML = buildDetails(group, data);
                        } catch (err) {
                            content.innerHTML = '<div class="detail-error">Failed to build details: '
                                + escapeHtml(err && err.message ? err.message : String(err)) + '</div>';
                        }
                    }
                    detail.style.display = '';
                    if (glyph) glyph.textContent = GLYPH_EXPANDED;
                }
            });
        });
    }

    function attachFilters(table, data, expanded) {
        var controls = ['srs-range-min', 'srs-range-max', 'srs-min-studies', 'srs-study-filter'];
        controls.forEach(function(id) {
            var el = document.getElementById(id);
            if (!el) return;
            var eventName = el.tagName === 'SELECT' ? 'change' : 'input';
            el.addEventListener(eventName, function() { applyFilters(table, data, expanded); });
        });
        var reset = document.getElementById('srs-filter-reset');
        if (reset) {
            reset.addEventListener('click', function() {
                document.getElementById('srs-range-min').value = 0;
                document.getElementById('srs-range-max').value = 100;
                document.getElementById('srs-min-studies').value = 0;
                document.getElementById('srs-study-filter').value = 'all';
                applyFilters(table, data, expanded);
            });
        }
    }

    function attach() {
        var summaryTable = document.getElementById('srs-summary-table');
        if (summaryTable) {
            if (summaryTable.getAttribute('data-controller') === '1') return;
            summaryTable.setAttribute('data-controller', '1');
            var data = window.__srsData || {};
            var expanded = {};
            attachSorting(summaryTable);
            attachFilters(summaryTable, data, expanded);
            attachDetails(summaryTable, data, expanded);
            return;
        }
        Array.prototype.slice.call(document.querySelectorAll('table.risk-score-table')).forEach(function(table) {
            if (table.getAttribute('data-controller') === '1') return;
            table.setAttribute('data-controller', '1');
            attachSorting(table);
        });
    }

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', function() { setTimeout(attach, 100); });
    } else {
        setTimeout(attach, 100);
    }
})();
"#
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_all_special_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn page_wraps_body_with_title() {
        let page = render_page("Site Risk Report", "<p>body</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Site Risk Report</title>"));
        assert!(page.contains("<p>body</p>"));
    }

    #[test]
    fn controller_script_mirrors_the_band_cuts() {
        let js = inline_javascript();
        for cut in ["75", "50", "25"] {
            assert!(js.contains(&format!("score >= {cut}")));
        }
        for colour in ["#ffcdd2", "#ffe0b2", "#fff3e0", "#e8f5e8"] {
            assert!(js.contains(colour));
        }
    }

    #[test]
    fn controller_detail_table_mirrors_the_detail_columns() {
        let js = inline_javascript();
        for column in TableSpec::study_detail().visible_columns() {
            assert!(
                js.contains(&format!("<th>{}</th>", column.label)),
                "drill-down header {} must match the column spec",
                column.label
            );
        }
    }
}
