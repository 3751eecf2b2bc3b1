//! wordloop CLI: vocabulary lookups, daily quizzes and review scheduling.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "wordloop",
    version,
    about = "Spaced-repetition vocabulary quizzes"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a word lookup
    Lookup {
        #[arg(long)]
        user: String,

        /// The looked-up word
        #[arg(long)]
        word: String,

        /// Comma-separated synonyms
        #[arg(long)]
        synonyms: Option<String>,

        /// Comma-separated antonyms
        #[arg(long)]
        antonyms: Option<String>,

        /// Comma-separated collocations
        #[arg(long)]
        collocations: Option<String>,

        /// Where the word was encountered
        #[arg(long)]
        source: Option<String>,

        /// Sentence the word appeared in
        #[arg(long)]
        sentence: Option<String>,
    },

    /// Import a word-list file or directory as lookups
    Import {
        #[arg(long)]
        user: String,

        /// Path to .toml word list or directory
        #[arg(long)]
        words: PathBuf,
    },

    /// Validate word-list TOML files
    Validate {
        /// Path to word list file or directory
        #[arg(long)]
        words: PathBuf,
    },

    /// Show today's quiz, creating it on first request
    Quiz {
        #[arg(long)]
        user: String,

        /// Number of items (only used when the quiz is created)
        #[arg(long)]
        count: Option<usize>,

        /// Print the quiz as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit answers for a quiz
    Submit {
        #[arg(long)]
        user: String,

        /// Quiz id
        #[arg(long)]
        quiz: i64,

        /// JSON answers file, or "-" for stdin
        #[arg(long)]
        answers: PathBuf,

        /// Save the graded report as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grade a word manually (0-5)
    Grade {
        #[arg(long)]
        user: String,

        #[arg(long)]
        word_id: i64,

        #[arg(long, allow_negative_numbers = true)]
        grade: i32,
    },

    /// List words due for review
    Due {
        #[arg(long)]
        user: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search stored words
    Search {
        #[arg(long)]
        query: String,

        #[arg(long, default_value = "10")]
        take: usize,
    },

    /// Create starter config and example word list
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wordloop=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Lookup {
            user,
            word,
            synonyms,
            antonyms,
            collocations,
            source,
            sentence,
        } => {
            commands::lookup::execute(
                config,
                user,
                word,
                commands::lookup::ListArgs {
                    synonyms,
                    antonyms,
                    collocations,
                },
                source,
                sentence,
            )
            .await
        }
        Commands::Import { user, words } => commands::import::execute(config, user, words).await,
        Commands::Validate { words } => commands::validate::execute(words),
        Commands::Quiz { user, count, json } => {
            commands::quiz::execute(config, user, count, json).await
        }
        Commands::Submit {
            user,
            quiz,
            answers,
            save,
            json,
        } => commands::submit::execute(config, user, quiz, answers, save, json).await,
        Commands::Grade {
            user,
            word_id,
            grade,
        } => commands::grade::execute(config, user, word_id, grade).await,
        Commands::Due { user, limit } => commands::due::execute(config, user, limit).await,
        Commands::Search { query, take } => commands::search::execute(config, query, take).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
