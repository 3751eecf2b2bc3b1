//! The `wordloop search` command.

use std::path::Path;

use anyhow::Result;

use super::open_service;

pub async fn execute(config_path: Option<&Path>, query: String, take: usize) -> Result<()> {
    let service = open_service(config_path)?;
    let words = service.search_words(&query, take).await?;

    if words.is_empty() {
        println!("No words match '{}'.", query.trim());
        return Ok(());
    }

    for word in &words {
        let synonyms = word
            .synonyms
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| format!(" ({})", s.join(", ")))
            .unwrap_or_default();
        println!("{:>6}  {}{synonyms}", word.id, word.lemma);
    }

    Ok(())
}
