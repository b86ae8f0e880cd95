//! Score display strategies.
//!
//! Two conventions exist for stored scores and they disagree on direction, so
//! a deployment picks exactly one (see `SCORE_STRATEGY`) and every ranking
//! surface uses it.
//!
//! - `Raw`: higher stored score ranks better; the stored value is displayed.
//! - `Inverted`: lower stored score ranks better (golf style); the displayed
//!   value is `max(0, max_score - raw)` against the global score range.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStrategy {
    Raw,
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Global min/max over every stored score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min_score: f64,
    pub max_score: f64,
}

impl ScoreRange {
    /// Substituted when the global range cannot be loaded.
    pub const FALLBACK: ScoreRange = ScoreRange {
        min_score: 1.0,
        max_score: 1000.0,
    };
}

impl ScoreStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreStrategy::Raw => "raw",
            ScoreStrategy::Inverted => "inverted",
        }
    }

    /// Direction the data source must order by so the best episode comes first.
    pub fn sort_order(&self) -> SortOrder {
        match self {
            ScoreStrategy::Raw => SortOrder::Descending,
            ScoreStrategy::Inverted => SortOrder::Ascending,
        }
    }

    pub fn needs_score_range(&self) -> bool {
        matches!(self, ScoreStrategy::Inverted)
    }

    /// Maps a stored score to the value shown to users.
    ///
    /// `Inverted` without a loaded range yields the placeholder `0.0`.
    pub fn display_score(&self, raw: f64, range: Option<&ScoreRange>) -> f64 {
        match self {
            ScoreStrategy::Raw => raw,
            ScoreStrategy::Inverted => match range {
                Some(range) => (range.max_score - raw).max(0.0),
                None => 0.0,
            },
        }
    }

    /// Ordering of two raw scores, best first.
    pub fn rank_cmp(&self, a: f64, b: f64) -> Ordering {
        match self.sort_order() {
            SortOrder::Ascending => a.total_cmp(&b),
            SortOrder::Descending => b.total_cmp(&a),
        }
    }
}

impl fmt::Display for ScoreStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ScoreStrategy::Raw),
            "inverted" => Ok(ScoreStrategy::Inverted),
            other => Err(format!(
                "unknown score strategy '{other}' (expected raw or inverted)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_is_identity() {
        for raw in [0.0, 1.0, 42.0, 999.5] {
            assert_eq!(ScoreStrategy::Raw.display_score(raw, None), raw);
        }
        let range = ScoreRange::FALLBACK;
        assert_eq!(ScoreStrategy::Raw.display_score(42.0, Some(&range)), 42.0);
    }

    #[test]
    fn test_inverted_against_range() {
        let range = ScoreRange::FALLBACK;
        let s = ScoreStrategy::Inverted;
        assert_eq!(s.display_score(1000.0, Some(&range)), 0.0);
        assert_eq!(s.display_score(1.0, Some(&range)), 999.0);
        assert_eq!(s.display_score(1500.0, Some(&range)), 0.0);
    }

    #[test]
    fn test_inverted_without_range_is_placeholder() {
        assert_eq!(ScoreStrategy::Inverted.display_score(5.0, None), 0.0);
    }

    #[test]
    fn test_sort_direction_follows_strategy() {
        assert_eq!(ScoreStrategy::Raw.sort_order(), SortOrder::Descending);
        assert_eq!(ScoreStrategy::Inverted.sort_order(), SortOrder::Ascending);

        let mut scores = vec![5.0, 12.0, 8.0];
        scores.sort_by(|a, b| ScoreStrategy::Raw.rank_cmp(*a, *b));
        assert_eq!(scores, vec![12.0, 8.0, 5.0]);
        scores.sort_by(|a, b| ScoreStrategy::Inverted.rank_cmp(*a, *b));
        assert_eq!(scores, vec![5.0, 8.0, 12.0]);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(" Inverted ".parse::<ScoreStrategy>(), Ok(ScoreStrategy::Inverted));
        assert!("golf".parse::<ScoreStrategy>().is_err());
    }
}
