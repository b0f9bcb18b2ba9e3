//! Filter state and visibility recomputation
//!
//! The one piece of real logic behind the filter controls, isolated from UI
//! wiring: an explicit `FilterState` plus a pure recomputation over the
//! summary rows. Every control-change handler funnels through
//! `recompute_visibility`; the embedded controller script re-evaluates the
//! same predicates in the live table.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{RiskRow, SiteSummary};

/// Full SRS range: the unfiltered default
pub const FULL_RANGE: (f64, f64) = (0.0, 100.0);

/// Current UI filter for one mounted widget instance.
///
/// Created at render time with full-range defaults, mutated only by user
/// interaction, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Inclusive SRS range a site's average score must fall in
    pub score_range: (f64, f64),
    /// Minimum number of studies a site must have
    pub min_studies: u32,
    /// When set, only sites participating in this study are visible
    pub study: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            score_range: FULL_RANGE,
            min_studies: 0,
            study: None,
        }
    }
}

impl FilterState {
    /// Restore full-range unfiltered defaults
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }
}

/// Distinct study identifiers per site, derived from the detail rows
pub fn studies_by_group(rows: &[RiskRow]) -> BTreeMap<String, BTreeSet<String>> {
    let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        map.entry(row.group_id.clone())
            .or_default()
            .insert(row.study_id.clone());
    }
    map
}

/// Visible site keys under the current filter.
///
/// Predicates are evaluated in order — score-range membership, minimum
/// study count, selected-study membership — and a site is visible only if
/// ALL active predicates pass.
pub fn recompute_visibility(
    state: &FilterState,
    summaries: &[SiteSummary],
    studies: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeSet<String> {
    summaries
        .iter()
        .filter(|summary| passes(state, summary, studies))
        .map(|summary| summary.group_id.clone())
        .collect()
}

fn passes(
    state: &FilterState,
    summary: &SiteSummary,
    studies: &BTreeMap<String, BTreeSet<String>>,
) -> bool {
    let score = summary.avg_risk_score.unwrap_or(0.0);
    if score < state.score_range.0 || score > state.score_range.1 {
        return false;
    }
    if summary.num_studies < state.min_studies {
        return false;
    }
    if let Some(study) = &state.study {
        let participates = studies
            .get(&summary.group_id)
            .is_some_and(|set| set.contains(study));
        if !participates {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(group_id: &str, avg: f64, num_studies: u32) -> SiteSummary {
        SiteSummary {
            group_id: group_id.to_string(),
            num_studies,
            avg_risk_score: Some(avg),
            max_risk_score: Some(avg),
            min_risk_score: Some(avg),
            red_flags: 0,
            amber_flags: 0,
            green_flags: 0,
        }
    }

    fn site_studies(group_id: &str, studies: &[&str]) -> BTreeMap<String, BTreeSet<String>> {
        let mut map = BTreeMap::new();
        map.insert(
            group_id.to_string(),
            studies.iter().map(|s| s.to_string()).collect(),
        );
        map
    }

    #[test]
    fn defaults_hide_nothing() {
        let summaries = vec![summary("A", 0.0, 0), summary("B", 100.0, 9)];
        let visible =
            recompute_visibility(&FilterState::default(), &summaries, &BTreeMap::new());
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn all_active_predicates_must_pass() {
        let summaries = vec![summary("SiteX", 80.0, 2)];
        let studies = site_studies("SiteX", &["S1", "S2"]);

        // range [0,50] hides it
        let mut state = FilterState {
            score_range: (0.0, 50.0),
            ..FilterState::default()
        };
        assert!(recompute_visibility(&state, &summaries, &studies).is_empty());

        // full range again, but minimum study count 3 hides it
        state.reset();
        state.min_studies = 3;
        assert!(recompute_visibility(&state, &summaries, &studies).is_empty());

        // range and count satisfied, but a study it lacks hides it
        state.reset();
        state.study = Some("S3".to_string());
        assert!(recompute_visibility(&state, &summaries, &studies).is_empty());

        // member study passes all predicates
        state.study = Some("S1".to_string());
        let visible = recompute_visibility(&state, &summaries, &studies);
        assert!(visible.contains("SiteX"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let summaries = vec![summary("Lo", 10.0, 1), summary("Hi", 60.0, 1)];
        let state = FilterState {
            score_range: (10.0, 60.0),
            ..FilterState::default()
        };
        let visible = recompute_visibility(&state, &summaries, &BTreeMap::new());
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn reset_restores_unfiltered_defaults() {
        let mut state = FilterState {
            score_range: (20.0, 40.0),
            min_studies: 5,
            study: Some("S9".to_string()),
        };
        state.reset();
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn studies_by_group_collects_distinct_ids() {
        let rows = vec![
            RiskRow {
                group_id: "A".to_string(),
                study_id: "S1".to_string(),
                snapshot_date: String::new(),
                score: None,
                max: None,
                numerator: None,
                denominator: None,
                red_flags: 0,
                amber_flags: 0,
                green_flags: 0,
                investigator_name: None,
                metric_id: None,
            },
            RiskRow {
                group_id: "A".to_string(),
                study_id: "S1".to_string(),
                snapshot_date: String::new(),
                score: None,
                max: None,
                numerator: None,
                denominator: None,
                red_flags: 0,
                amber_flags: 0,
                green_flags: 0,
                investigator_name: None,
                metric_id: None,
            },
        ];
        let map = studies_by_group(&rows);
        assert_eq!(map["A"].len(), 1);
    }
}
