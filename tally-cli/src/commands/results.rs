//! Aggregate submitted responses from files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tally_core::summary::Summary;
use tally_core::{QuestionResult, Response, aggregate_session};
use tracing::debug;

use super::check::load_questions;

#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// JSON file holding an array of questions
    pub questions: PathBuf,

    /// JSON file holding an array of responses
    pub responses: PathBuf,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ResultsArgs) -> Result<()> {
    let mut questions = load_questions(&args.questions)?;
    questions.sort_by_key(|q| q.display_order);
    let responses = load_responses(&args.responses)?;
    debug!("Aggregating {} responses over {} questions", responses.len(), questions.len());

    let results = aggregate_session(&questions, &responses);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        println!("{}", heading(result));
        println!("{}", render(&result.summary));
        println!();
    }
    Ok(())
}

fn load_responses(path: &Path) -> Result<Vec<Response>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid responses in {}", path.display()))
}

fn heading(result: &QuestionResult) -> String {
    format!(
        "{}. [{}] {} ({} responses)",
        result.display_order + 1,
        result.question_type,
        result.text,
        result.summary.response_count()
    )
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// One table per summary shape.
fn render(summary: &Summary) -> Table {
    match summary {
        Summary::Choice(s) => {
            let mut t = table(&["Option", "Count", "%"]);
            for row in &s.options {
                t.add_row(vec![row.option.clone(), row.count.to_string(), format!("{:.1}", row.percentage)]);
            }
            for other in &s.other_answers {
                t.add_row(vec![format!("other: {other}"), "1".to_string(), String::new()]);
            }
            if s.weighted_average.is_some() {
                t.add_row(vec!["weighted average".to_string(), number(s.weighted_average), String::new()]);
            }
            t
        }
        Summary::Scale(s) => {
            let mut t = table(&["Mean", "Median", "Min", "Max"]);
            t.add_row(vec![number(s.mean), number(s.median), number(s.min), number(s.max)]);
            t
        }
        Summary::Text(s) => {
            let mut t = table(&["Respondent", "Recipient", "Answer"]);
            for answer in &s.answers {
                let recipient = answer.recipient.as_ref().map_or_else(String::new, ToString::to_string);
                t.add_row(vec![answer.respondent.to_string(), recipient, answer.answer.clone()]);
            }
            t
        }
        Summary::Rubric(s) => {
            let mut header = vec!["Criterion"];
            header.extend(s.choices.iter().map(String::as_str));
            header.extend(["Mean", "Median"]);
            let mut t = table(&header);
            for criterion in &s.criteria {
                let mut row = vec![criterion.criterion.clone()];
                row.extend(criterion.counts.iter().map(ToString::to_string));
                row.push(number(criterion.mean));
                row.push(number(criterion.median));
                t.add_row(row);
            }
            t
        }
        Summary::Ranking(s) => {
            let mut t = table(&["Rank", "Entry", "Average", "Times ranked"]);
            for entry in &s.entries {
                let rank = entry.overall_rank.map_or_else(|| "-".to_string(), |r| r.to_string());
                t.add_row(vec![rank, entry.label.clone(), number(entry.average_rank), entry.times_ranked.to_string()]);
            }
            t
        }
        Summary::Contribution(s) => {
            let mut t = table(&["Member", "Claimed", "Perceived", "Ratings", "Not sure"]);
            for entry in &s.entries {
                t.add_row(vec![
                    entry.recipient.to_string(),
                    number(entry.claimed),
                    number(entry.perceived),
                    entry.ratings.to_string(),
                    entry.not_sure.to_string(),
                ]);
            }
            t
        }
        Summary::Distribution(s) => {
            let mut t = table(&["Target", "Total", "Average", "%"]);
            for entry in &s.entries {
                t.add_row(vec![
                    entry.label.clone(),
                    entry.total_points.to_string(),
                    format!("{:.2}", entry.average_points),
                    format!("{:.1}", entry.percentage),
                ]);
            }
            t
        }
    }
}
