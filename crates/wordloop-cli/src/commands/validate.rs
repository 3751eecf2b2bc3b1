//! The `wordloop validate` command.

use std::path::PathBuf;

use anyhow::Result;

use wordloop_core::wordlist::{load_word_lists, validate_word_list};

pub fn execute(path: PathBuf) -> Result<()> {
    let lists = load_word_lists(&path)?;

    let mut total_warnings = 0;

    for list in &lists {
        println!("Word list: {} ({} words)", list.name, list.entries.len());

        let warnings = validate_word_list(list);
        for w in &warnings {
            let prefix = w
                .lemma
                .as_ref()
                .map(|lemma| format!("  [{lemma}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All word lists valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
