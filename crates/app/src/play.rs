//! Line-driven terminal front-end for a quiz session.

use std::io::Write;

use quiz_core::share::Url;
use services::{AnswerState, QuizLoopService, QuizSession, SessionError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Zero-based option index (the user types it 1-based).
    Select(usize),
    Check,
    Next,
    Prev,
    Restart,
    Share,
    Exit,
    Help,
}

impl Action {
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).map(Self::Select);
        }
        match input.to_ascii_lowercase().as_str() {
            "c" | "check" => Some(Self::Check),
            "n" | "next" | "submit" => Some(Self::Next),
            "p" | "prev" => Some(Self::Prev),
            "r" | "retake" | "restart" => Some(Self::Restart),
            "s" | "share" => Some(Self::Share),
            "q" | "quit" | "exit" => Some(Self::Exit),
            "h" | "help" | "?" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Requested,
    EndOfInput,
}

/// Drive `session` from `input` until the user exits or input ends.
///
/// # Errors
///
/// Returns an I/O error if reading input or writing output fails.
pub async fn run<R, W>(
    svc: &QuizLoopService,
    session: &mut QuizSession,
    input: R,
    out: &mut W,
    share_url: &Url,
) -> std::io::Result<Exit>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    render(session, out)?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(action) = Action::parse(&line) else {
            writeln!(out, "Unknown command: {}. Type h for help.", line.trim())?;
            continue;
        };

        let result = match action {
            Action::Exit => return Ok(Exit::Requested),
            Action::Help => {
                print_help(out)?;
                continue;
            }
            Action::Share => {
                match session.result() {
                    Some(result) => writeln!(out, "{}", result.share(share_url.clone()))?,
                    None => writeln!(out, "Finish the quiz to share your score.")?,
                }
                continue;
            }
            Action::Restart => {
                svc.restart(session);
                Ok(())
            }
            Action::Select(index) => session.select_option(index),
            Action::Check => match svc.check_answer(session).await {
                Ok(outcome) => {
                    if outcome.sink_error.is_some() {
                        // Already logged by the service; grading stands.
                        writeln!(out, "(your answer could not be saved)")?;
                    }
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Action::Next => svc.advance(session).map(|_| ()),
            Action::Prev => svc.retreat(session).map(|_| ()),
        };

        if let Err(err) = result {
            if let Some(message) = describe(&err) {
                writeln!(out, "{message}")?;
            }
        }
        render(session, out)?;
    }

    Ok(Exit::EndOfInput)
}

/// Short user-facing text for a rejected action. `NoSelection` shows up as the
/// session notice instead.
fn describe(err: &SessionError) -> Option<String> {
    let text = match err {
        SessionError::NoSelection => return None,
        SessionError::InvalidInput { options, .. } => {
            format!("Pick an option between 1 and {options}.")
        }
        SessionError::AlreadyGraded => "This question is already checked.".into(),
        SessionError::NotGraded => "Check your answer before moving on.".into(),
        SessionError::AtFirstQuestion => "This is the first question.".into(),
        SessionError::NotActive => "The quiz is finished: r to retake, s to share, q to exit.".into(),
        other => other.to_string(),
    };
    Some(text)
}

fn print_help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  <number>  select an option")?;
    writeln!(out, "  c         check answer")?;
    writeln!(out, "  n         next question (submit on the last one)")?;
    writeln!(out, "  p         previous question")?;
    writeln!(out, "  r         retake the quiz")?;
    writeln!(out, "  s         share your result")?;
    writeln!(out, "  q         exit")
}

/// Write the current screen: the question card while active, the
/// congratulation card once finished.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn render<W: Write>(session: &QuizSession, out: &mut W) -> std::io::Result<()> {
    if let Some(result) = session.result() {
        writeln!(out)?;
        writeln!(out, "Congratulations!")?;
        writeln!(out, "{}", result.tier.title)?;
        writeln!(out, "{}", result.tier.message)?;
        writeln!(out, "You scored {} out of {}.", result.score, result.total)?;
        return writeln!(out, "[r] Retake Quiz  [s] Share  [q] Exit");
    }

    let progress = session.progress();
    let question = session.current_question();
    let state = session.answer_state();

    writeln!(out)?;
    writeln!(out, "Score: {} / {}", progress.score, progress.total)?;
    writeln!(out, "Question {} of {}", progress.position, progress.total)?;
    if !question.summary().is_empty() {
        writeln!(out, "{}", question.summary())?;
    }
    writeln!(out, "{}", question.prompt().to_uppercase())?;

    for (i, option) in question.options().iter().enumerate() {
        let marker = match state {
            AnswerState::Graded { .. } if question.is_correct(i) => "[+]",
            AnswerState::Graded { .. } => "[-]",
            AnswerState::Selected(selected) if selected == i => "(*)",
            _ => "( )",
        };
        writeln!(out, "{marker} {}) {option}", i + 1)?;
    }

    if let Some(notice) = session.notice() {
        writeln!(out, "{notice}")?;
    }

    if let AnswerState::Graded { correct, .. } = state {
        writeln!(out, "{}", if correct { "Correct!" } else { "Wrong." })?;
        if !question.explanation().is_empty() {
            writeln!(out, "Explanation: {}", question.explanation())?;
        }
    }

    let next = if progress.is_last { "Submit" } else { "Next" };
    writeln!(out, "[c] Check  [n] {next}  [p] Prev  [q] Exit")
}
