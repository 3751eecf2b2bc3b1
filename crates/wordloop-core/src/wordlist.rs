//! TOML word-list parser.
//!
//! Word lists seed a learner's history: every entry is imported as a lookup,
//! optionally carrying enrichment data. Lists are loaded from single files or
//! whole directories and can be validated before import.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::Enrichment;

/// A named collection of words.
#[derive(Debug, Clone)]
pub struct WordList {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Recorded as the lookup source on import.
    pub source: String,
    pub entries: Vec<WordEntry>,
}

/// One word in a list.
#[derive(Debug, Clone)]
pub struct WordEntry {
    pub lemma: String,
    pub sentence: Option<String>,
    pub enrichment: Enrichment,
}

#[derive(Debug, Deserialize)]
struct TomlWordListFile {
    list: TomlListHeader,
    #[serde(default)]
    words: Vec<TomlWordEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlListHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlWordEntry {
    lemma: String,
    #[serde(default)]
    sentence: Option<String>,
    #[serde(default)]
    synonyms: Option<Vec<String>>,
    #[serde(default)]
    antonyms: Option<Vec<String>>,
    #[serde(default)]
    collocations: Option<Vec<String>>,
}

/// Parse a single TOML file into a `WordList`.
pub fn parse_word_list(path: &Path) -> Result<WordList> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read word list: {}", path.display()))?;

    parse_word_list_str(&content, path)
}

/// Parse a TOML string into a `WordList`.
pub fn parse_word_list_str(content: &str, source_path: &Path) -> Result<WordList> {
    let parsed: TomlWordListFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let source = parsed
        .list
        .source
        .unwrap_or_else(|| format!("wordlist:{}", parsed.list.id));

    let entries = parsed
        .words
        .into_iter()
        .map(|w| WordEntry {
            lemma: w.lemma,
            sentence: w.sentence,
            enrichment: Enrichment {
                synonyms: w.synonyms,
                antonyms: w.antonyms,
                collocations: w.collocations,
            },
        })
        .collect();

    Ok(WordList {
        id: parsed.list.id,
        name: parsed.list.name,
        description: parsed.list.description,
        source,
        entries,
    })
}

/// Recursively load all `.toml` word lists from a directory.
pub fn load_word_list_directory(dir: &Path) -> Result<Vec<WordList>> {
    let mut lists = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();

        if path.is_dir() {
            lists.extend(load_word_list_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_word_list(&path) {
                Ok(list) => lists.push(list),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    lists.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(lists)
}

/// Load a word list file, or every list under a directory.
pub fn load_word_lists(path: &Path) -> Result<Vec<WordList>> {
    if path.is_dir() {
        load_word_list_directory(path)
    } else {
        Ok(vec![parse_word_list(path)?])
    }
}

/// A warning from word-list validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The offending lemma, if the warning concerns one entry.
    pub lemma: Option<String>,
    pub message: String,
}

/// Validate a word list for common issues.
pub fn validate_word_list(list: &WordList) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if list.entries.is_empty() {
        warnings.push(ValidationWarning {
            lemma: None,
            message: "word list has no entries".into(),
        });
    }

    let mut seen = HashSet::new();
    for entry in &list.entries {
        let normalized = entry.lemma.trim().to_lowercase();

        if normalized.is_empty() {
            warnings.push(ValidationWarning {
                lemma: None,
                message: "entry with empty lemma".into(),
            });
            continue;
        }

        if !seen.insert(normalized.clone()) {
            warnings.push(ValidationWarning {
                lemma: Some(entry.lemma.clone()),
                message: format!("duplicate lemma: {normalized}"),
            });
        }

        if entry.lemma != normalized {
            warnings.push(ValidationWarning {
                lemma: Some(entry.lemma.clone()),
                message: format!("lemma will be stored as '{normalized}'"),
            });
        }

        let synonyms = entry.enrichment.synonyms.as_deref().unwrap_or_default();
        if synonyms.iter().any(|s| s.trim().eq_ignore_ascii_case(&normalized)) {
            warnings.push(ValidationWarning {
                lemma: Some(entry.lemma.clone()),
                message: "synonym list contains the lemma itself".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[list]
id = "gre-core"
name = "GRE Core"
description = "High-frequency GRE words"

[[words]]
lemma = "serene"
synonyms = ["calm", "placid", "tranquil"]
antonyms = ["agitated"]
sentence = "The lake was serene at dawn."

[[words]]
lemma = "ardent"
"#;

    #[test]
    fn parse_valid_toml() {
        let list = parse_word_list_str(VALID_TOML, &PathBuf::from("gre.toml")).unwrap();
        assert_eq!(list.id, "gre-core");
        assert_eq!(list.source, "wordlist:gre-core");
        assert_eq!(list.entries.len(), 2);
        assert_eq!(
            list.entries[0].enrichment.synonyms.as_deref().unwrap().len(),
            3
        );
        assert!(list.entries[0].enrichment.collocations.is_none());
        assert!(list.entries[1].enrichment.synonyms.is_none());
        assert!(validate_word_list(&list).is_empty());
    }

    #[test]
    fn validate_duplicates_and_case() {
        let toml = r#"
[list]
id = "dupes"
name = "Dupes"

[[words]]
lemma = "Serene"

[[words]]
lemma = "serene"
synonyms = ["Serene", "calm"]

[[words]]
lemma = "   "
"#;
        let list = parse_word_list_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        let warnings = validate_word_list(&list);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("stored as 'serene'")));
        assert!(warnings.iter().any(|w| w.message.contains("lemma itself")));
        assert!(warnings.iter().any(|w| w.message.contains("empty lemma")));
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_word_list_str("[list\nid = ", &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gre.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let lists = load_word_list_directory(dir.path()).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "GRE Core");
    }
}
