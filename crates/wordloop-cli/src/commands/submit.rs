//! The `wordloop submit` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use wordloop_core::model::SubmittedAnswer;
use wordloop_core::report::SubmissionReport;

use super::open_service;

fn read_answers(path: &Path) -> Result<Vec<SubmittedAnswer>> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read answers from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers: {}", path.display()))?
    };
    serde_json::from_str(&content).context("answers must be a JSON array of {questionId, answer}")
}

pub async fn execute(
    config_path: Option<&Path>,
    user: String,
    quiz_id: i64,
    answers_path: PathBuf,
    save: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let answers = read_answers(&answers_path)?;

    let service = open_service(config_path)?;
    let report = service.submit(&user, quiz_id, &answers).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = save {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &SubmissionReport) {
    use comfy_table::{Cell, Table};

    if !report.details.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Question", "Type", "Your answer", "Correct answer", "Result"]);

        for detail in &report.details {
            table.add_row(vec![
                Cell::new(&detail.question_id),
                Cell::new(detail.kind),
                Cell::new(&detail.your_answer),
                Cell::new(&detail.correct_answer),
                Cell::new(if detail.correct { "ok" } else { "wrong" }),
            ]);
        }

        println!("{table}");
    }

    println!(
        "Score: {:.1}% ({}/{} correct)",
        report.score, report.correct, report.total
    );

    let mistakes: Vec<&str> = report.mistakes().map(|d| d.correct_answer.as_str()).collect();
    if !mistakes.is_empty() {
        println!("Review again: {}", mistakes.join(", "));
    }
}
