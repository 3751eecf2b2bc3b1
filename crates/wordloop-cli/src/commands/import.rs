//! The `wordloop import` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use wordloop_core::wordlist::load_word_lists;

use super::open_service;

pub async fn execute(config_path: Option<&Path>, user: String, path: PathBuf) -> Result<()> {
    let lists = load_word_lists(&path)?;
    anyhow::ensure!(!lists.is_empty(), "no word lists found in {}", path.display());

    let service = open_service(config_path)?;

    for list in &lists {
        let summary = service.import_word_list(&user, list).await?;
        println!(
            "Imported {} word(s) from {} ({} skipped)",
            summary.imported, list.name, summary.skipped
        );
    }

    Ok(())
}
