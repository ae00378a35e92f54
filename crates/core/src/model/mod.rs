mod attempt;
mod ids;
mod question;
mod tier;

pub use attempt::AttemptRecord;
pub use ids::QuestionId;
pub use question::{Question, QuestionDraft, QuestionError, MIN_OPTIONS};
pub use tier::{ScoreTier, TierTable, TierTableError};
