//! Text posted when a player shares a finished quiz.

use std::fmt;

pub use url::Url;

use crate::model::ScoreTier;

/// Hashtag appended to every shared result.
pub const SHARE_HASHTAG: &str = "#CysicQuiz";

/// Shareable result: fixed-format text plus the page the quiz was taken on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMessage {
    pub text: String,
    pub url: Url,
}

impl ShareMessage {
    #[must_use]
    pub fn new(score: u32, tier: &ScoreTier, page_url: Url) -> Self {
        Self {
            text: share_text(score, &tier.title),
            url: page_url,
        }
    }
}

impl fmt::Display for ShareMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.text, self.url)
    }
}

/// `"I scored {score} on the Cysic Quiz! {tier_title} #CysicQuiz"`
#[must_use]
pub fn share_text(score: u32, tier_title: &str) -> String {
    format!("I scored {score} on the Cysic Quiz! {tier_title} {SHARE_HASHTAG}")
}
