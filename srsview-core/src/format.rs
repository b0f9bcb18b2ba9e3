//! Score banding and cell display formatting
//!
//! Global invariants enforced:
//! - Band assignment is a total function on scores
//! - Boundary values map to the upper band
//! - Missing numeric input degrades to an empty string, never an error

/// Severity band for a 0-100 risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Lowest,   // [0, 25)
    Low,      // [25, 50)
    Medium,   // [50, 75)
    High,     // [75, 100]
}

impl Band {
    /// Classify a score. Total: out-of-range input clamps to the nearest band.
    pub fn from_score(score: f64) -> Band {
        if score >= 75.0 {
            Band::High
        } else if score >= 50.0 {
            Band::Medium
        } else if score >= 25.0 {
            Band::Low
        } else {
            Band::Lowest
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Lowest => "lowest",
            Band::Low => "low",
            Band::Medium => "medium",
            Band::High => "high",
        }
    }

    /// Fixed display colour per band
    pub fn colour(&self) -> &'static str {
        match self {
            Band::Lowest => "#e8f5e8",
            Band::Low => "#fff3e0",
            Band::Medium => "#ffe0b2",
            Band::High => "#ffcdd2",
        }
    }
}

/// Format a score cell: one decimal plus percent sign, empty when absent
pub fn score_text(score: Option<f64>) -> String {
    score.map(|s| format!("{s:.1}%")).unwrap_or_default()
}

/// Combined "raw/max (normalized%)" display string.
///
/// Empty when any required numeric field is absent; the normalized value is
/// rounded to one decimal.
pub fn combined_score(raw: Option<f64>, max: Option<f64>, normalized: Option<f64>) -> String {
    match (raw, max, normalized) {
        (Some(raw), Some(max), Some(normalized)) => {
            let rounded = (normalized * 10.0).round() / 10.0;
            format!(
                "{} / {} ({}%)",
                trim_number(raw),
                trim_number(max),
                trim_number(rounded)
            )
        }
        _ => String::new(),
    }
}

/// Ten-step colour scale on the normalized score, used for combined cells
/// in detail-level tables. Cut points and colours follow the upstream
/// reporting environment's palette.
pub fn scale_colour(normalized: f64) -> &'static str {
    const CUTS: [f64; 9] = [2.0, 4.0, 6.0, 8.0, 10.0, 12.5, 15.0, 20.0, 25.0];
    const COLOURS: [&str; 10] = [
        "#00683777", "#1a985077", "#66bd6377", "#a6d96a77", "#d9ef8b77",
        "#ffffbf77", "#fee08b77", "#fdae6177", "#f46d4377", "#d7302777",
    ];
    for (index, cut) in CUTS.iter().enumerate() {
        if normalized <= *cut {
            return COLOURS[index];
        }
    }
    COLOURS[COLOURS.len() - 1]
}

/// Render a float without a trailing ".0" for whole values
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}
