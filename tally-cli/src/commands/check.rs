//! Offline validation of question definitions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tally_core::{Question, ValidationResult};
use tracing::debug;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON file holding an array of questions
    pub questions: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let questions = load_questions(&args.questions)?;
    debug!("Checking {} questions", questions.len());

    let result = check_questions(&questions);
    if result.is_ok() {
        println!("{} questions OK", questions.len());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Field").fg(Color::Cyan),
        Cell::new("Problem").fg(Color::Cyan),
    ]);
    for violation in result.violations() {
        table.add_row(vec![Cell::new(&violation.field), Cell::new(&violation.reason)]);
    }
    println!("{table}");
    bail!("{} violations in {}", result.len(), args.questions.display());
}

pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid questions in {}", path.display()))
}

/// Per-question checks plus the list-level rules: unique ids and
/// contiguous display order.
pub fn check_questions(questions: &[Question]) -> ValidationResult {
    let mut result = ValidationResult::ok();

    let mut seen = BTreeSet::new();
    for question in questions {
        let prefix = format!("question/{}", question.id);
        result.check(seen.insert(question.id), format!("{prefix}.id"), "duplicate question id");
        result.check(!question.text.trim().is_empty(), format!("{prefix}.text"), "text must not be blank");
        result.merge(question.validate().prefixed(&prefix));
    }

    let mut orders: Vec<u32> = questions.iter().map(|q| q.display_order).collect();
    orders.sort_unstable();
    let contiguous = orders.iter().enumerate().all(|(i, order)| *order as usize == i);
    result.check(
        contiguous,
        "displayOrder",
        format!("display orders must be 0..{} without gaps or repeats", questions.len()),
    );
    result
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use tally_core::kinds::NumericalScaleSettings;
    use tally_core::{QuestionSettings, QuestionType, RecipientScope, SessionId};

    fn question(order: u32) -> Question {
        let mut q = Question::new(SessionId::new(), QuestionType::Text, order);
        q.text = format!("Question {order}");
        q
    }

    #[test]
    fn well_formed_questions_pass() {
        let questions = vec![question(0), question(1), question(2)];
        assert!(check_questions(&questions).is_ok());
    }

    #[test]
    fn gaps_in_display_order_are_reported() {
        let questions = vec![question(0), question(2)];
        assert!(check_questions(&questions).mentions("displayOrder"));
    }

    #[test]
    fn invalid_settings_are_prefixed_with_question() {
        let mut bad = question(0);
        bad.settings = QuestionSettings::NumericalScale(NumericalScaleSettings {
            min: 10.0,
            max: 1.0,
            step: 1.0,
        });
        let result = check_questions(&[bad.clone()]);
        assert!(!result.is_ok());
        let prefix = format!("question/{}.", bad.id);
        assert!(result.violations().iter().all(|v| v.field.starts_with(&prefix)));
    }

    #[test]
    fn unsupported_scope_and_blank_text_are_reported() {
        let mut q = Question::new(SessionId::new(), QuestionType::Contribution, 0);
        q.recipient_scope = RecipientScope::None;
        let result = check_questions(&[q]);
        assert!(result.mentions("recipientScope"));
        assert!(result.mentions("text"));
    }

    #[test]
    fn questions_load_from_json_file() {
        let questions = vec![question(0)];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&questions).unwrap()).unwrap();
        assert_eq!(load_questions(file.path()).unwrap(), questions);
    }
}
