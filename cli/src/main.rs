//! `docqa` binary: ingest documents and ask questions about them.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docqa_cli::{Settings, commands};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docqa", version, about)]
struct Args {
    /// Settings file (defaults to `docqa.toml` in the working directory).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a `.pdf` or `.txt` file and index it.
    Ingest {
        /// Document to ingest.
        path: PathBuf,
    },
    /// Answer a question from the indexed documents.
    Query {
        /// Question to answer.
        question: String,
        /// Number of chunks to ground the answer on.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Print the answer and sources as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the chunks nearest to a question without generating an answer.
    Retrieve {
        /// Question to match.
        question: String,
        /// Number of chunks to show.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Summarize the index and configuration.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    tracing::debug!(data_dir = %settings.data_dir.display(), "settings loaded");

    match args.command {
        Command::Ingest { path } => {
            let outcome = commands::ingest(&settings, &path).await?;
            println!(
                "ingested {}: {} chunks ({} vectors in index)",
                outcome.source_file, outcome.chunks, outcome.total_vectors
            );
        }
        Command::Query {
            question,
            top_k,
            json,
        } => {
            let response = commands::query(&settings, &question, top_k).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", commands::format_response(&response));
            }
        }
        Command::Retrieve { question, top_k } => {
            let results = commands::retrieve(&settings, &question, top_k).await?;
            println!("{}", commands::format_results(&results));
        }
        Command::Status => {
            let report = commands::status(&settings).await?;
            println!("{report}");
        }
    }

    Ok(())
}
