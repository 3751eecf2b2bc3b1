//! The `wordloop init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("wordloop.toml").exists() {
        println!("wordloop.toml already exists, skipping.");
    } else {
        std::fs::write("wordloop.toml", SAMPLE_CONFIG)?;
        println!("Created wordloop.toml");
    }

    std::fs::create_dir_all("wordlists")?;
    let example_path = Path::new("wordlists/example.toml");
    if example_path.exists() {
        println!("wordlists/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_WORD_LIST)?;
        println!("Created wordlists/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: wordloop validate --words wordlists/example.toml");
    println!("  2. Run: wordloop import --user me --words wordlists/example.toml");
    println!("  3. Tomorrow, run: wordloop quiz --user me");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordloop configuration

[store]
type = "sqlite"
path = "./wordloop.db"

# Items per daily quiz
default_count = 12

# Options per multiple-choice item, correct answer included
choice_options = 4
max_choice_attempts = 32

# Uncomment for reproducible option order
# seed = 42
"#;

const EXAMPLE_WORD_LIST: &str = r#"[list]
id = "example"
name = "Example Word List"
description = "A few words to get started"

[[words]]
lemma = "serene"
synonyms = ["calm", "placid", "tranquil"]
antonyms = ["agitated"]
sentence = "The lake was serene at dawn."

[[words]]
lemma = "ardent"
synonyms = ["passionate", "fervent", "zealous"]
collocations = ["ardent supporter"]

[[words]]
lemma = "terse"
synonyms = ["concise", "succinct"]
antonyms = ["verbose"]
"#;
