//! `quiz`: terminal front-end for the multiple-choice quiz.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use quiz_core::model::TierTable;
use quiz_core::share::Url;
use services::{Clock, QuizLoopService};
use storage::repository::Storage;
use storage::seed::{load_question_file, sample_questions, seed_questions};
use tracing_subscriber::EnvFilter;

mod config;
mod play;

use config::{DEFAULT_DB_URL, DEFAULT_SHARE_URL, normalize_sqlite_url, prepare_sqlite_file};

#[derive(Parser)]
#[command(name = "quiz", version, about = "Sequential multiple-choice quiz")]
struct Cli {
    /// SQLite database URL
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = DEFAULT_DB_URL)]
    db: String,

    /// JSON file with a custom score tier table
    #[arg(long, global = true, env = "QUIZ_TIERS")]
    tiers: Option<PathBuf>,

    /// Options for `play` when no subcommand is given
    #[command(flatten)]
    play: PlayArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct PlayArgs {
    /// Shuffle question order
    #[arg(long)]
    shuffle: bool,

    /// Page URL attached to shared results
    #[arg(long, env = "QUIZ_SHARE_URL", default_value = DEFAULT_SHARE_URL)]
    share_url: Url,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the quiz (default)
    Play(PlayArgs),

    /// Load questions into the database
    Seed {
        /// JSON question file (defaults to the bundled sample set)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Validate and print the score tier table
    Tiers {
        /// Highest possible score the table must cover
        #[arg(long, default_value_t = TierTable::CYSIC_MAX_SCORE)]
        max: u32,
    },
}

fn load_tiers(path: Option<&PathBuf>, max: u32) -> Result<TierTable, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(TierTable::from_json(&raw, max)?)
        }
        None => Ok(TierTable::cysic()),
    }
}

async fn open_storage(raw_url: &str) -> Result<Storage, Box<dyn std::error::Error>> {
    let db_url = normalize_sqlite_url(raw_url)?;
    // Keep connection setup in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    Ok(Storage::sqlite(&db_url).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Play(cli.play));

    match command {
        Commands::Play(PlayArgs { shuffle, share_url }) => {
            let storage = open_storage(&cli.db).await?;
            let loop_svc = QuizLoopService::new(
                Clock::system(),
                storage.questions.clone(),
                storage.attempts.clone(),
            )
            .with_shuffle(shuffle);

            let mut session = loop_svc.start_session().await?;
            let question_count = u32::try_from(session.total_questions())?;
            if cli.tiers.is_some() {
                // A custom table must cover exactly the questions loaded.
                session = session.with_tiers(load_tiers(cli.tiers.as_ref(), question_count)?);
            } else if session.tiers().max_score() != question_count {
                tracing::warn!(
                    questions = question_count,
                    max_score = session.tiers().max_score(),
                    "built-in tier table does not match question count"
                );
            }

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout().lock();
            play::run(&loop_svc, &mut session, stdin, &mut stdout, &share_url).await?;
            Ok(())
        }
        Commands::Seed { file } => {
            let storage = open_storage(&cli.db).await?;
            let questions = match &file {
                Some(path) => load_question_file(path)?,
                None => sample_questions()?,
            };
            let written = seed_questions(storage.questions.as_ref(), &questions).await?;
            println!("Seeded {written} questions into {}", cli.db);
            Ok(())
        }
        Commands::Tiers { max } => {
            let table = load_tiers(cli.tiers.as_ref(), max)?;
            for tier in table.tiers() {
                println!("{:>3}-{:<3} {:<20} {}", tier.min, tier.max, tier.title, tier.message);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout is the quiz screen.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        process::exit(2);
    }
}
