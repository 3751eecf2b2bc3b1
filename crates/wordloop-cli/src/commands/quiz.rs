//! The `wordloop quiz` command.

use std::path::Path;

use anyhow::Result;

use wordloop_core::report::QuizView;

use super::open_service;

pub async fn execute(
    config_path: Option<&Path>,
    user: String,
    count: Option<usize>,
    json: bool,
) -> Result<()> {
    let service = open_service(config_path)?;
    let quiz = service.today_quiz(&user, count).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quiz)?);
    } else {
        print_quiz(&quiz);
    }

    Ok(())
}

fn print_quiz(quiz: &QuizView) {
    println!(
        "Quiz {} for {} ({} item(s){})",
        quiz.quiz_id,
        quiz.for_date,
        quiz.items.len(),
        if quiz.done { ", already submitted" } else { "" }
    );

    if quiz.items.is_empty() {
        println!("Nothing to practise yet. Look up some words first.");
        return;
    }

    for (n, item) in quiz.items.iter().enumerate() {
        println!("\n{}. [{}] ({})", n + 1, item.id, item.kind);
        for line in item.prompt.lines() {
            println!("   {line}");
        }
        if let Some(hint) = &item.hint {
            println!("   hint: {hint}");
        }
        if let Some(options) = &item.options {
            for (label, option) in ('a'..='z').zip(options) {
                println!("   {label}) {option}");
            }
        }
    }
}
