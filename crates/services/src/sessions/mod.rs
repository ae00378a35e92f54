mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::{AnswerState, Phase, QuizProgress};
pub use service::{Advance, CheckOutcome, Notice, QuizSession};
pub use view::QuizResult;
pub use workflow::{AnswerOutcome, QuizLoopService};
