//! The `wordloop lookup` command.

use std::path::Path;

use anyhow::Result;

use wordloop_core::model::Enrichment;
use wordloop_core::service::LookupRequest;

use super::open_service;

/// Raw comma-separated enrichment flags.
pub struct ListArgs {
    pub synonyms: Option<String>,
    pub antonyms: Option<String>,
    pub collocations: Option<String>,
}

fn split_list(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    })
}

pub async fn execute(
    config_path: Option<&Path>,
    user: String,
    word: String,
    lists: ListArgs,
    source: Option<String>,
    sentence: Option<String>,
) -> Result<()> {
    let service = open_service(config_path)?;

    let request = LookupRequest {
        text: word,
        source,
        sentence,
        enrichment: Enrichment {
            synonyms: split_list(lists.synonyms),
            antonyms: split_list(lists.antonyms),
            collocations: split_list(lists.collocations),
        },
    };
    let word = service.record_lookup(&user, request).await?;

    println!("Recorded '{}' (word {})", word.lemma, word.id);
    if let Some(synonyms) = word.synonyms.as_ref().filter(|s| !s.is_empty()) {
        println!("  synonyms: {}", synonyms.join(", "));
    }
    if word.needs_enrichment() {
        println!("  (enrichment incomplete)");
    }

    Ok(())
}
