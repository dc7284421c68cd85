use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use resolution::{ResolutionOutcome, ResolutionStats, Ticket};
use tracing::{info, warn};

use triage_desk::{batch, parse_jsonl, parse_ticket, setup, DecisionLog, DeskConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of *.txt knowledge articles
    #[arg(long, global = true)]
    kb_dir: Option<PathBuf>,

    /// JSON knowledge base (overrides --kb-dir)
    #[arg(long, global = true)]
    kb_json: Option<PathBuf>,

    /// Keyword strategies only: no zero-shot model, no embeddings
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a single ticket and print the outcome as JSON
    Resolve {
        #[arg(long, default_value = "cli")]
        id: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Read the ticket from a JSON payload file instead
        #[arg(long, conflicts_with_all = ["subject", "description"])]
        payload: Option<PathBuf>,
    },
    /// Resolve every ticket in a JSONL file in parallel
    Batch {
        input: PathBuf,
        /// Append decisions to this JSONL log
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// List the loaded knowledge base
    Kb,
    /// Summarise a decision log
    Stats { log: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DeskConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.kb_dir {
        config.kb_dir = dir;
    }
    if let Some(path) = cli.kb_json {
        config.kb_json = Some(path);
    }
    if cli.offline {
        config.providers.zero_shot_url = None;
        config.providers.embedding_url = None;
        config.providers.local_embeddings = false;
    }

    match cli.command {
        Command::Resolve {
            id,
            subject,
            description,
            payload,
        } => {
            let ticket = match payload {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    parse_ticket(&raw)?
                }
                None => Ticket::new(id, subject, description),
            };
            let engine = setup::build_engine(&config)?;
            let outcome = engine.resolve(&ticket);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if let Some(path) = &config.decision_log {
                DecisionLog::new(path).append(std::slice::from_ref(&outcome))?;
            }
        }
        Command::Batch { input, log } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let mut tickets = Vec::new();
            for (line, parsed) in parse_jsonl(&content) {
                match parsed {
                    Ok(ticket) => tickets.push(ticket),
                    Err(e) => warn!(line, error = %e, "Skipping payload"),
                }
            }
            if tickets.is_empty() {
                bail!("no resolvable tickets in {}", input.display());
            }

            let engine = setup::build_engine(&config)?;
            info!(tickets = tickets.len(), "Starting batch");
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            let outcomes = runtime.block_on(batch::resolve_all(
                Arc::clone(&engine),
                tickets,
                config.max_in_flight,
            ))?;
            drop(runtime);

            print_jsonl(&outcomes)?;
            eprint!("{}", ResolutionStats::from_outcomes(&outcomes));
            if let Some(path) = log.or(config.decision_log) {
                DecisionLog::new(path).append(&outcomes)?;
            }
        }
        Command::Kb => {
            let corpus = setup::load_corpus(&config)?;
            for doc in corpus.documents() {
                let embedded = if doc.precomputed_embedding.is_some() {
                    "embedded"
                } else {
                    "-"
                };
                println!("{}\t{}\t{}", doc.id, doc.title, embedded);
            }
            info!(documents = corpus.len(), "Knowledge base listed");
        }
        Command::Stats { log } => {
            let records = DecisionLog::new(log).read()?;
            let outcomes: Vec<ResolutionOutcome> =
                records.into_iter().map(|r| r.outcome).collect();
            print!("{}", ResolutionStats::from_outcomes(&outcomes));
        }
    }

    Ok(())
}

fn print_jsonl(outcomes: &[ResolutionOutcome]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for outcome in outcomes {
        writeln!(out, "{}", serde_json::to_string(outcome)?)?;
    }
    Ok(())
}
