use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{AttemptRecord, Question, TierTable};

use super::progress::{AnswerState, Phase, QuizProgress};
use super::view::QuizResult;
use crate::error::SessionError;

//
// ─── NOTICES & OUTCOMES ────────────────────────────────────────────────────────
//

/// User-visible indicator left on the session after a recoverable mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SelectOptionFirst,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SelectOptionFirst => {
                f.write_str("Please select an option before checking your answer.")
            }
        }
    }
}

/// Result of grading the current question.
///
/// `attempt` must be handed to the attempt sink by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub correct: bool,
    /// Whether this check raised the score.
    pub credited: bool,
    pub score: u32,
    pub attempt: AttemptRecord,
}

/// What `advance` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    Finished(QuizResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Single quiz run over a fixed, non-empty question sequence.
///
/// The session is a plain state machine: it never touches storage. Grading
/// returns an [`AttemptRecord`] that the caller forwards to the sink.
///
/// Per-question state (selection, graded flag, last outcome, notice) is reset
/// whenever the current index changes. The score ledger is not: every
/// question is credited at most once, using the outcome of its first check,
/// so revisiting and re-checking a question can never inflate the score.
pub struct QuizSession {
    questions: Vec<Question>,
    tiers: TierTable,
    current: usize,
    selected: Option<usize>,
    graded: bool,
    last_correct: Option<bool>,
    notice: Option<Notice>,
    score: u32,
    first_outcomes: Vec<Option<bool>>,
    phase: Phase,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over `questions`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SourceUnavailable` if `questions` is empty.
    pub fn new(
        questions: Vec<Question>,
        tiers: TierTable,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::SourceUnavailable(
                "no questions available".into(),
            ));
        }

        let first_outcomes = vec![None; questions.len()];
        Ok(Self {
            questions,
            tiers,
            current: 0,
            selected: None,
            graded: false,
            last_correct: None,
            notice: None,
            score: 0,
            first_outcomes,
            phase: Phase::Active,
            started_at,
            finished_at: None,
        })
    }

    /// Swap the tier table, typically for one sized to `total_questions()`.
    #[must_use]
    pub fn with_tiers(mut self, tiers: TierTable) -> Self {
        self.tiers = tiers;
        self
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.graded
    }

    /// Outcome of the last check on the current question; `None` until graded.
    #[must_use]
    pub fn last_correct(&self) -> Option<bool> {
        if self.graded { self.last_correct } else { None }
    }

    #[must_use]
    pub fn answer_state(&self) -> AnswerState {
        match (self.graded, self.selected, self.last_correct) {
            (true, Some(selected), Some(correct)) => AnswerState::Graded { selected, correct },
            (false, Some(selected), _) => AnswerState::Selected(selected),
            _ => AnswerState::Unanswered,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Whether the question at `index` has been checked at least once this run.
    #[must_use]
    pub fn was_graded(&self, index: usize) -> bool {
        self.first_outcomes.get(index).is_some_and(Option::is_some)
    }

    #[must_use]
    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let active = self.phase == Phase::Active;
        QuizProgress {
            position: self.current + 1,
            total: self.questions.len(),
            score: self.score,
            answered: self.first_outcomes.iter().filter(|o| o.is_some()).count(),
            is_last: self.current + 1 == self.questions.len(),
            can_check: active && !self.graded,
            can_advance: active && self.graded,
            can_retreat: active && self.current > 0,
        }
    }

    /// Final result; `Some` only once the session is finished.
    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        self.is_finished().then(|| self.build_result())
    }

    /// Select an option on the current question.
    ///
    /// # Errors
    ///
    /// `NotActive` when finished, `AlreadyGraded` once the question was checked,
    /// `InvalidInput` for an index outside the question's options.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.graded {
            return Err(SessionError::AlreadyGraded);
        }
        let options = self.current_question().option_count();
        if index >= options {
            return Err(SessionError::InvalidInput { index, options });
        }

        self.selected = Some(index);
        self.notice = None;
        Ok(())
    }

    /// Grade the current selection.
    ///
    /// # Errors
    ///
    /// `NotActive` when finished, `AlreadyGraded` on a second check of the same
    /// question, `NoSelection` (which also sets [`Notice::SelectOptionFirst`])
    /// when nothing is selected. None of these change the score.
    pub fn check_answer(&mut self) -> Result<CheckOutcome, SessionError> {
        self.ensure_active()?;
        if self.graded {
            return Err(SessionError::AlreadyGraded);
        }
        let Some(selected) = self.selected else {
            self.notice = Some(Notice::SelectOptionFirst);
            return Err(SessionError::NoSelection);
        };

        let question = &self.questions[self.current];
        let correct = question.is_correct(selected);
        let attempt = AttemptRecord::new(question.id(), correct);

        self.notice = None;
        self.graded = true;
        self.last_correct = Some(correct);

        let first = &mut self.first_outcomes[self.current];
        let credited = first.is_none() && correct;
        if first.is_none() {
            *first = Some(correct);
        }
        if credited {
            self.score += 1;
        }

        Ok(CheckOutcome {
            correct,
            credited,
            score: self.score,
            attempt,
        })
    }

    /// Move past a graded question, finishing the session after the last one.
    ///
    /// # Errors
    ///
    /// `NotActive` when finished, `NotGraded` when the current question has not been checked.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        self.ensure_active()?;
        if !self.graded {
            return Err(SessionError::NotGraded);
        }

        if self.current + 1 >= self.questions.len() {
            self.phase = Phase::Finished;
            self.finished_at = Some(now);
            return Ok(Advance::Finished(self.build_result()));
        }

        self.current += 1;
        self.reset_question_state();
        Ok(Advance::Moved {
            index: self.current,
        })
    }

    /// Step back one question. The score is kept.
    ///
    /// # Errors
    ///
    /// `NotActive` when finished, `AtFirstQuestion` at index 0.
    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        self.ensure_active()?;
        if self.current == 0 {
            return Err(SessionError::AtFirstQuestion);
        }

        self.current -= 1;
        self.reset_question_state();
        Ok(self.current)
    }

    /// Start over with the same questions. Allowed in any phase.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.score = 0;
        self.phase = Phase::Active;
        self.first_outcomes.iter_mut().for_each(|o| *o = None);
        self.started_at = now;
        self.finished_at = None;
        self.reset_question_state();
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Finished => Err(SessionError::NotActive),
        }
    }

    fn reset_question_state(&mut self) {
        self.selected = None;
        self.graded = false;
        self.last_correct = None;
        self.notice = None;
    }

    fn build_result(&self) -> QuizResult {
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        QuizResult {
            score: self.score,
            total,
            tier: self.tiers.classify_final_score(self.score, total).clone(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("selected", &self.selected)
            .field("graded", &self.graded)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, QuestionId, ScoreTier};
    use quiz_core::time::fixed_now;

    fn build_question(id: u64, correct: usize) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            summary: format!("S{id}"),
            question: format!("Q{id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: correct,
            explanation: format!("E{id}"),
        }
        .validate()
        .unwrap()
    }

    fn build_session(n: u64) -> QuizSession {
        let questions = (1..=n).map(|id| build_question(id, 0)).collect();
        QuizSession::new(questions, TierTable::cysic(), fixed_now()).unwrap()
    }

    fn answer(session: &mut QuizSession, option: usize) -> CheckOutcome {
        session.select_option(option).unwrap();
        session.check_answer().unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::new(Vec::new(), TierTable::cysic(), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::SourceUnavailable(_)));
    }

    #[test]
    fn tier_table_sized_to_question_count() {
        let tiers = TierTable::new(
            vec![ScoreTier::new(0, 1, "Keep going", ""), ScoreTier::new(2, 2, "Flawless", "")],
            2,
        )
        .unwrap();
        let mut session = build_session(2).with_tiers(tiers);
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();

        let result = session.result().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.tier.title, "Flawless");
    }

    #[test]
    fn new_session_starts_active_and_unanswered() {
        let session = build_session(2);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.answer_state(), AnswerState::Unanswered);
        assert_eq!(session.last_correct(), None);
        assert!(session.result().is_none());
    }

    #[test]
    fn select_rejects_out_of_range_and_keeps_state() {
        let mut session = build_session(1);
        session.select_option(1).unwrap();
        let err = session.select_option(3).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput { index: 3, options: 3 }));
        assert_eq!(session.selected_option(), Some(1));
    }

    #[test]
    fn check_without_selection_sets_notice_only() {
        let mut session = build_session(2);
        let err = session.check_answer().unwrap_err();
        assert!(matches!(err, SessionError::NoSelection));
        assert_eq!(session.notice(), Some(Notice::SelectOptionFirst));
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_graded());

        // Selecting clears the notice.
        session.select_option(0).unwrap();
        assert_eq!(session.notice(), None);
        assert_eq!(session.answer_state(), AnswerState::Selected(0));
    }

    #[test]
    fn correct_check_scores_once() {
        let mut session = build_session(2);
        let outcome = answer(&mut session, 0);
        assert!(outcome.correct);
        assert!(outcome.credited);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.attempt, AttemptRecord::new(QuestionId::new(1), true));
        assert_eq!(
            session.answer_state(),
            AnswerState::Graded { selected: 0, correct: true }
        );

        let err = session.check_answer().unwrap_err();
        assert!(matches!(err, SessionError::AlreadyGraded));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn selection_locked_after_grading() {
        let mut session = build_session(1);
        answer(&mut session, 2);
        let err = session.select_option(0).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyGraded));
        assert_eq!(session.selected_option(), Some(2));
        assert_eq!(session.last_correct(), Some(false));
    }

    #[test]
    fn advance_requires_grading() {
        let mut session = build_session(2);
        session.select_option(0).unwrap();
        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::NotGraded));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.selected_option(), Some(0));
    }

    #[test]
    fn advance_resets_question_state() {
        let mut session = build_session(2);
        answer(&mut session, 1);
        let moved = session.advance(fixed_now()).unwrap();
        assert_eq!(moved, Advance::Moved { index: 1 });
        assert_eq!(session.answer_state(), AnswerState::Unanswered);
        assert_eq!(session.selected_option(), None);
        assert_eq!(session.last_correct(), None);
    }

    #[test]
    fn retreat_at_first_question_is_rejected() {
        let mut session = build_session(2);
        let err = session.retreat().unwrap_err();
        assert!(matches!(err, SessionError::AtFirstQuestion));
    }

    #[test]
    fn retreat_then_advance_returns_unanswered() {
        let mut session = build_session(3);
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        answer(&mut session, 0);
        assert_eq!(session.score(), 2);

        assert_eq!(session.retreat().unwrap(), 0);
        assert_eq!(session.score(), 2);
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();

        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answer_state(), AnswerState::Unanswered);
        assert!(!session.is_graded());
        assert!(session.was_graded(1));
    }

    #[test]
    fn revisited_question_is_not_credited_twice() {
        let mut session = build_session(2);
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        session.retreat().unwrap();

        let again = answer(&mut session, 0);
        assert!(again.correct);
        assert!(!again.credited);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn revisit_cannot_fix_a_wrong_first_answer() {
        let mut session = build_session(2);
        answer(&mut session, 1);
        session.advance(fixed_now()).unwrap();
        session.retreat().unwrap();

        let retry = answer(&mut session, 0);
        assert!(retry.correct);
        assert!(!retry.credited);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn last_advance_finishes_and_freezes_score() {
        let mut session = build_session(2);
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        answer(&mut session, 0);

        let Advance::Finished(result) = session.advance(fixed_now()).unwrap() else {
            panic!("expected finish");
        };
        assert_eq!(result.score, 2);
        assert_eq!(result.total, 2);
        assert_eq!(result.tier.title, "Early Block Miner");
        assert!(session.is_finished());
        assert_eq!(session.finished_at(), Some(fixed_now()));
        assert_eq!(session.result(), Some(result));

        assert!(matches!(session.select_option(0), Err(SessionError::NotActive)));
        assert!(matches!(session.check_answer(), Err(SessionError::NotActive)));
        assert!(matches!(session.advance(fixed_now()), Err(SessionError::NotActive)));
        assert!(matches!(session.retreat(), Err(SessionError::NotActive)));
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn restart_after_finish_resets_everything() {
        let mut session = build_session(1);
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        assert!(session.is_finished());

        let later = fixed_now() + chrono::Duration::minutes(3);
        session.restart(later);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.answer_state(), AnswerState::Unanswered);
        assert!(!session.was_graded(0));
        assert_eq!(session.started_at(), later);
        assert_eq!(session.finished_at(), None);
        assert_eq!(session.total_questions(), 1);

        // The ledger was cleared, so the question can be credited again.
        assert!(answer(&mut session, 0).credited);
    }

    #[test]
    fn three_question_scenario() {
        let questions = vec![build_question(1, 0), build_question(2, 1), build_question(3, 2)];
        let mut session = QuizSession::new(questions, TierTable::cysic(), fixed_now()).unwrap();

        let mut attempts = Vec::new();
        for pick in [0, 0, 2] {
            attempts.push(answer(&mut session, pick).attempt);
            session.advance(fixed_now()).unwrap();
        }

        assert_eq!(session.score(), 2);
        assert_eq!(session.phase(), Phase::Finished);
        let outcomes: Vec<bool> = attempts.iter().map(|a| a.is_correct).collect();
        assert_eq!(outcomes, vec![true, false, true]);
        let ids: Vec<u64> = attempts.iter().map(|a| a.question_id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn score_stays_within_bounds_and_never_decreases() {
        let mut session = build_session(4);
        let mut last = 0;
        // Wander back and forth re-answering; the score must stay monotone and bounded.
        for step in 0..20 {
            if session.is_finished() {
                break;
            }
            if !session.is_graded() {
                session.select_option(step % 2).unwrap();
                session.check_answer().unwrap();
            }
            if step % 3 == 2 && session.current_index() > 0 {
                session.retreat().unwrap();
            } else {
                session.advance(fixed_now()).unwrap();
            }
            assert!(session.score() >= last);
            assert!(session.score() as usize <= session.total_questions());
            last = session.score();
        }
    }

    #[test]
    fn progress_reflects_controls() {
        let mut session = build_session(2);
        let p = session.progress();
        assert_eq!((p.position, p.total), (1, 2));
        assert!(p.can_check && !p.can_advance && !p.can_retreat && !p.is_last);

        answer(&mut session, 0);
        let p = session.progress();
        assert!(!p.can_check && p.can_advance);
        assert_eq!(p.answered, 1);

        session.advance(fixed_now()).unwrap();
        let p = session.progress();
        assert!(p.is_last && p.can_retreat);
    }
}
