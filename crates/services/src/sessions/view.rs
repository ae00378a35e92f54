use quiz_core::model::ScoreTier;
use quiz_core::share::{ShareMessage, Url};

/// Final score of a finished session and the tier it falls into.
///
/// Presentation-agnostic: the front-end decides how to lay it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub total: u32,
    pub tier: ScoreTier,
}

impl QuizResult {
    #[must_use]
    pub fn share(&self, page_url: Url) -> ShareMessage {
        ShareMessage::new(self.score, &self.tier, page_url)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }
}
