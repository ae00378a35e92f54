/// Top-level session status. `Finished` is left only through a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Finished,
}

/// Answer state of the question currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    Unanswered,
    Selected(usize),
    Graded { selected: usize, correct: bool },
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub score: u32,
    /// Distinct questions checked at least once.
    pub answered: usize,
    pub is_last: bool,
    pub can_check: bool,
    pub can_advance: bool,
    pub can_retreat: bool,
}
