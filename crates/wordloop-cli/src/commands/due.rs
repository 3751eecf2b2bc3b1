//! The `wordloop due` command.

use std::path::Path;

use anyhow::Result;

use wordloop_core::scheduler::{Clock, SystemClock};

use super::open_service;

pub async fn execute(config_path: Option<&Path>, user: String, limit: Option<usize>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let service = open_service(config_path)?;
    let due = service.due_today(&user, limit).await?;

    if due.is_empty() {
        println!("Nothing due today.");
        return Ok(());
    }

    let today = SystemClock.today();
    let mut table = Table::new();
    table.set_header(vec!["Word ID", "Word", "Due", "Overdue"]);

    for word in &due {
        let overdue = (today - word.due_date).num_days().max(0);
        table.add_row(vec![
            Cell::new(word.word_id),
            Cell::new(&word.lemma),
            Cell::new(word.due_date),
            Cell::new(format!("{overdue}d")),
        ]);
    }

    println!("{table}");
    println!("{} word(s) due.", due.len());

    Ok(())
}
