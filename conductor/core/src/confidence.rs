//! Confidence Classification
//!
//! Buckets the similarity score of an answer into display bands. Purely
//! presentational: nothing in the request path depends on the band.

use serde::{Deserialize, Serialize};

/// Scores at or above this are [`ConfidenceBand::High`]
pub const HIGH_THRESHOLD: f64 = 0.90;

/// Scores at or above this (and below [`HIGH_THRESHOLD`]) are
/// [`ConfidenceBand::Medium`]
pub const MEDIUM_THRESHOLD: f64 = 0.83;

/// Confidence bucket for a similarity score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceBand {
    /// `score >= 0.90`
    High,
    /// `0.83 <= score < 0.90`
    Medium,
    /// `score < 0.83`
    Low,
}

impl ConfidenceBand {
    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High confidence",
            Self::Medium => "Medium confidence",
            Self::Low => "Low confidence",
        }
    }
}

/// Classify a score. Out-of-range values are not rejected.
#[must_use]
pub fn classify(score: f64) -> ConfidenceBand {
    if score >= HIGH_THRESHOLD {
        ConfidenceBand::High
    } else if score >= MEDIUM_THRESHOLD {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Format a score as a one-decimal percentage (`0.9123` → `"91.2%"`)
#[must_use]
pub fn format_similarity(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// What the sources line under an answer shows
#[derive(Clone, Debug, PartialEq)]
pub struct SourcesSummary {
    /// Number of source documents
    pub count: usize,
    /// Band of the answer score, when a score is known
    pub band: Option<ConfidenceBand>,
    /// Raw score, when known
    pub score: Option<f64>,
}

impl SourcesSummary {
    /// Build a summary, or `None` when there is nothing to show
    #[must_use]
    pub fn new(sources: &[String], score: Option<f64>) -> Option<Self> {
        if sources.is_empty() {
            return None;
        }
        Some(Self {
            count: sources.len(),
            band: score.map(classify),
            score,
        })
    }

    /// `"1 source"` / `"N sources"`
    #[must_use]
    pub fn count_text(&self) -> String {
        if self.count == 1 {
            "1 source".to_string()
        } else {
            format!("{} sources", self.count)
        }
    }

    /// One-line rendering, e.g. `"2 sources · High confidence (91.2%)"`
    #[must_use]
    pub fn headline(&self) -> String {
        match (self.band, self.score) {
            (Some(band), Some(score)) => format!(
                "{} · {} ({})",
                self.count_text(),
                band.label(),
                format_similarity(score)
            ),
            _ => self.count_text(),
        }
    }
}
