//! The interactive wizard loop: fetch a step page, build a session, prompt
//! one group at a time, and route the session's transitions until the
//! evaluation is finished or the user leaves.
//!
//! Input comes through any `BufRead` and output goes to any `Write`, so the
//! loop is drivable from tests with scripted lines.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use kagami_core::answer::{AnswerValue, Scalar};
use kagami_core::api::gateway::{AnswerGateway, GatewayError, StepSource};
use kagami_core::evaluatee::{AngleError, Evaluatee};
use kagami_core::form::{Question, QuestionKind};
use kagami_core::session::{
    EntryMode, EvaluationAnswerSession, SessionError, Transition,
};
use kagami_core::{EvaluateeId, EvaluationId};

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Angle group error: {0}")]
    Angle(#[from] AngleError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("API error: {0}")]
    Gateway(#[from] GatewayError),
}

pub type WizardResult<T> = Result<T, WizardError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardOutcome {
    /// True when the whole evaluation was completed
    pub finished: bool,
}

pub async fn run_wizard<R: BufRead, W: Write>(
    source: &dyn StepSource,
    gateway: Arc<dyn AnswerGateway>,
    input: &mut R,
    out: &mut W,
    evaluation_id: EvaluationId,
    evaluatee_id: EvaluateeId,
    start_step: u32,
) -> WizardResult<WizardOutcome> {
    let mut step = start_step;
    let mut entry = EntryMode::Fresh;

    loop {
        let page = source.load_step(evaluation_id, evaluatee_id, step).await?;
        let angle_group = page.angle_group()?;
        let mode = page.entry_mode(entry);
        let mut session = EvaluationAnswerSession::new(
            page.evaluation_id,
            page.part.clone(),
            page.step,
            page.total_steps,
            angle_group,
            &page.existing_answers,
            mode,
            gateway.clone(),
        )?;

        writeln!(
            out,
            "\n=== Step {}/{}: {} ===",
            page.step, page.total_steps, page.part.title
        )?;
        debug!(step = page.step, "step loaded");

        loop {
            let group = session.current_group().clone();
            let progress = *session.progress();
            writeln!(
                out,
                "\n-- Group {}/{}: {}",
                progress.group_index + 1,
                progress.total_groups,
                group.label
            )?;
            if let Some(description) = &group.description {
                writeln!(out, "   {}", description)?;
            }

            let members = session.angle_group().members().to_vec();
            for question in &group.questions {
                for member in &members {
                    prompt_cell(input, out, &mut session, question, member)?;
                }
            }

            let completion = session.group_completion();
            writeln!(
                out,
                "Answered {}/{}",
                completion.answered, completion.required
            )?;

            let Some(command) = prompt_line(input, out, "[n]ext / [b]ack / [q]uit > ")? else {
                return Ok(WizardOutcome { finished: false });
            };

            let transition = match command.trim() {
                "b" | "back" => session.retreat(),
                "q" | "quit" => return Ok(WizardOutcome { finished: false }),
                _ => match session.advance().await {
                    Ok(transition) => transition,
                    Err(SessionError::Gateway(e)) => {
                        // Answers are kept in memory; the user just retries
                        writeln!(out, "Save failed: {}. Nothing was lost, try again.", e)?;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                },
            };

            match transition {
                Transition::NextGroup { .. } | Transition::PrevGroup { .. } => continue,
                Transition::LoadStep {
                    step: next_step,
                    entry: next_entry,
                } => {
                    step = next_step;
                    entry = next_entry;
                    break;
                }
                Transition::Finished => {
                    writeln!(out, "\nEvaluation complete. Thank you!")?;
                    return Ok(WizardOutcome { finished: true });
                }
                Transition::Dashboard => {
                    writeln!(out, "\nLeaving the wizard.")?;
                    return Ok(WizardOutcome { finished: false });
                }
            }
        }
    }
}

/// Prints a per-group completion report for one step.
pub async fn print_status<W: Write>(
    source: &dyn StepSource,
    gateway: Arc<dyn AnswerGateway>,
    out: &mut W,
    evaluation_id: EvaluationId,
    evaluatee_id: EvaluateeId,
    step: u32,
) -> WizardResult<()> {
    let page = source.load_step(evaluation_id, evaluatee_id, step).await?;
    let angle_group = page.angle_group()?;
    let session = EvaluationAnswerSession::new(
        page.evaluation_id,
        page.part.clone(),
        page.step,
        page.total_steps,
        angle_group,
        &page.existing_answers,
        EntryMode::Fresh,
        gateway,
    )?;

    writeln!(
        out,
        "Step {}/{}: {}",
        page.step, page.total_steps, page.part.title
    )?;
    let labels: Vec<String> = page
        .part
        .question_groups()
        .iter()
        .map(|g| g.label.clone())
        .collect();
    for (label, completion) in labels.iter().zip(session.group_completions()) {
        let mark = if completion.is_complete() { "done" } else { "open" };
        writeln!(
            out,
            "  [{}] {} — {}/{}",
            mark, label, completion.answered, completion.required
        )?;
    }
    Ok(())
}

fn prompt_cell<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    session: &mut EvaluationAnswerSession,
    question: &Question,
    member: &Evaluatee,
) -> WizardResult<()> {
    writeln!(out, "\n{}", question.text)?;
    for (index, option) in question.options.iter().enumerate() {
        writeln!(out, "  {}) {}", index + 1, option.label)?;
    }

    let prompt = format!("{} > ", member.name);
    let Some(line) = prompt_line(input, out, &prompt)? else {
        return Ok(());
    };
    let trimmed = line.trim();
    if trimmed.is_empty() {
        // Unanswered cells are simply not counted
        return Ok(());
    }

    match parse_answer(question, trimmed) {
        Some(value) => session.set_answer(question.id, member.id, value)?,
        None => writeln!(out, "Unrecognized answer, skipped.")?,
    }
    Ok(())
}

/// Parses one input line into an answer for the question's kind. Option
/// questions accept a 1-based option number (or the option's raw token);
/// multi-select takes a comma list; a trailing `: text` becomes the
/// other-text rider.
fn parse_answer(question: &Question, line: &str) -> Option<AnswerValue> {
    match question.kind {
        QuestionKind::Rating | QuestionKind::Unknown => {
            pick_option(question, line).map(AnswerValue::Rating)
        }
        QuestionKind::Choice => {
            let (selection, other_text) = split_other(line);
            pick_option(question, selection).map(|value| AnswerValue::Choice { value, other_text })
        }
        QuestionKind::MultipleChoice => {
            let (selection, other_text) = split_other(line);
            let values: Option<Vec<Scalar>> = selection
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| pick_option(question, token))
                .collect();
            values
                .filter(|values| !values.is_empty())
                .map(|values| AnswerValue::MultipleChoice { values, other_text })
        }
        QuestionKind::OpenText => Some(AnswerValue::OpenText(line.to_string())),
    }
}

fn pick_option(question: &Question, token: &str) -> Option<Scalar> {
    if let Ok(index) = token.parse::<usize>() {
        if index >= 1 && index <= question.options.len() {
            return Some(question.options[index - 1].value.clone());
        }
    }
    // Fall back to a literal option token
    question
        .options
        .iter()
        .find(|option| option.value.to_string() == token)
        .map(|option| option.value.clone())
}

fn split_other(line: &str) -> (&str, Option<String>) {
    match line.split_once(':') {
        Some((selection, other)) if !other.trim().is_empty() => {
            (selection.trim(), Some(other.trim().to_string()))
        }
        _ => (line, None),
    }
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
