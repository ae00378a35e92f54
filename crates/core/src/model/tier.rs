use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TierTableError {
    #[error("tier table is empty")]
    Empty,

    #[error("tier '{title}' has min {min} above max {max}")]
    InvertedRange { title: String, min: u32, max: u32 },

    #[error("tier table must start at 0, first tier starts at {min}")]
    MissingZero { min: u32 },

    #[error("gap in tier table between {after} and {next_min}")]
    Gap { after: u32, next_min: u32 },

    #[error("tiers overlap at score {at}")]
    Overlap { at: u32 },

    #[error("tier table ends at {end}, expected {max_score}")]
    WrongEnd { end: u32, max_score: u32 },

    #[error("invalid tier table json: {0}")]
    Json(String),
}

//
// ─── TIER ──────────────────────────────────────────────────────────────────────
//

/// Named score bracket shown when a session finishes. `min` and `max` are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTier {
    pub min: u32,
    pub max: u32,
    pub title: String,
    pub message: String,
}

impl ScoreTier {
    #[must_use]
    pub fn new(min: u32, max: u32, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            min,
            max,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn contains(&self, score: u32) -> bool {
        score >= self.min && score <= self.max
    }
}

//
// ─── TABLE ─────────────────────────────────────────────────────────────────────
//

/// Ordered tiers partitioning `[0, max_score]` without gaps or overlaps.
///
/// The table is never empty, so the lowest tier always exists and serves as
/// the fallback when a score falls outside every range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<ScoreTier>,
    max_score: u32,
}

impl TierTable {
    /// Question count the built-in table is laid out for.
    pub const CYSIC_MAX_SCORE: u32 = 15;

    /// Build a table, checking that the tiers exactly cover `[0, max_score]`.
    ///
    /// Tiers may be given in any order; they are stored sorted by `min`.
    ///
    /// # Errors
    ///
    /// Returns `TierTableError` for an empty table, an inverted range, or any
    /// gap, overlap, or mismatched end.
    pub fn new(mut tiers: Vec<ScoreTier>, max_score: u32) -> Result<Self, TierTableError> {
        if tiers.is_empty() {
            return Err(TierTableError::Empty);
        }
        tiers.sort_by_key(|t| (t.min, t.max));

        for tier in &tiers {
            if tier.min > tier.max {
                return Err(TierTableError::InvertedRange {
                    title: tier.title.clone(),
                    min: tier.min,
                    max: tier.max,
                });
            }
        }

        if tiers[0].min != 0 {
            return Err(TierTableError::MissingZero { min: tiers[0].min });
        }

        for pair in tiers.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.min <= prev.max {
                return Err(TierTableError::Overlap { at: next.min });
            }
            if next.min != prev.max + 1 {
                return Err(TierTableError::Gap {
                    after: prev.max,
                    next_min: next.min,
                });
            }
        }

        let end = tiers[tiers.len() - 1].max;
        if end != max_score {
            return Err(TierTableError::WrongEnd { end, max_score });
        }

        Ok(Self { tiers, max_score })
    }

    /// Parse a JSON array of tiers and validate it against `max_score`.
    ///
    /// # Errors
    ///
    /// Returns `TierTableError::Json` for malformed input, or any validation error from [`TierTable::new`].
    pub fn from_json(json: &str, max_score: u32) -> Result<Self, TierTableError> {
        let tiers: Vec<ScoreTier> =
            serde_json::from_str(json).map_err(|e| TierTableError::Json(e.to_string()))?;
        Self::new(tiers, max_score)
    }

    /// The congratulation table for the 15-question Cysic quiz.
    #[must_use]
    pub fn cysic() -> Self {
        Self {
            tiers: vec![
                ScoreTier::new(
                    0,
                    5,
                    "Early Block Miner",
                    "Early blocks mined. Retry to finalise your knowledge.",
                ),
                ScoreTier::new(
                    6,
                    11,
                    "Cysic Builder",
                    "Good progress! Keep building your Cysic knowledge proofs.",
                ),
                ScoreTier::new(
                    12,
                    14,
                    "Almost zk-Perfect",
                    "Almost zk-perfect! One step to full Cysic mastery.",
                ),
                ScoreTier::new(
                    15,
                    15,
                    "Zk-Champion",
                    "Flawless proof! You\u{2019}re a true Cysic zk-champion",
                ),
            ],
            max_score: Self::CYSIC_MAX_SCORE,
        }
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    #[must_use]
    pub fn tiers(&self) -> &[ScoreTier] {
        &self.tiers
    }

    /// Tier used whenever no range matches.
    #[must_use]
    pub fn lowest(&self) -> &ScoreTier {
        &self.tiers[0]
    }

    /// Tier whose inclusive range contains `score`, or the lowest tier.
    #[must_use]
    pub fn classify(&self, score: u32) -> &ScoreTier {
        self.tiers
            .iter()
            .find(|t| t.contains(score))
            .unwrap_or_else(|| self.lowest())
    }

    /// Classify a final score out of `_question_count`.
    ///
    /// The lookup is by `score` alone. A score outside every tier resolves to
    /// the lowest tier rather than failing.
    #[must_use]
    pub fn classify_final_score(&self, score: u32, _question_count: u32) -> &ScoreTier {
        self.classify(score)
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::cysic()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
