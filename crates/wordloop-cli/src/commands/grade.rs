//! The `wordloop grade` command.

use std::path::Path;

use anyhow::Result;

use super::open_service;

pub async fn execute(
    config_path: Option<&Path>,
    user: String,
    word_id: i64,
    grade: i32,
) -> Result<()> {
    let service = open_service(config_path)?;
    let update = service.manual_grade(&user, word_id, grade).await?;

    println!(
        "Next review in {} day(s) on {}",
        update.next_interval_days, update.due_date
    );

    Ok(())
}
