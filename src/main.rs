//! # Gita Advisor CLI (`gita-advisor`)
//!
//! ## Usage
//!
//! ```bash
//! gita-advisor --config ./config/gita.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gita-advisor serve` | Index the corpus, then start the HTTP server |
//! | `gita-advisor index` | Index the corpus and report the outcome |
//! | `gita-advisor ask "<situation>"` | Print advice for one situation |
//! | `gita-advisor random` | Print the explanation of a random shloka |
//!
//! `OPENAI_API_KEY` must be set in the environment or in a `.env` file in the
//! working directory. Log verbosity follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gita_advisor::advisor::{Advisor, AdvisorSettings};
use gita_advisor::chat::OpenAiChat;
use gita_advisor::config::{self, Config};
use gita_advisor::embedding::{Embedder, OpenAiEmbedder};
use gita_advisor::indexer::run_startup_indexing;
use gita_advisor::retriever::Retriever;
use gita_advisor::server::{run_server, AppState};
use gita_advisor::store::memory::InMemoryCollection;
use gita_advisor::store::sqlite::SqliteCollection;
use gita_advisor::store::VectorCollection;

const DEFAULT_CONFIG_PATH: &str = "./config/gita.toml";

/// Gita Advisor: semantic Bhagavad Gita retrieval with empathetic LLM
/// explanations.
#[derive(Parser)]
#[command(name = "gita-advisor", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/gita.toml`; when that file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus, then serve the HTTP API.
    ///
    /// Binds to `[server].bind` once startup indexing has finished. An
    /// indexing failure is logged and reported on `/health`; the server
    /// still starts.
    Serve {
        /// Keep the collection in memory instead of the SQLite store.
        #[arg(long)]
        ephemeral: bool,
    },

    /// Index the corpus into the persistent collection and exit.
    Index,

    /// Ask for advice about a life situation.
    Ask {
        /// Free-text description of the situation.
        situation: String,

        /// Number of shlokas to retrieve (defaults to `[retrieval].shloka_count`).
        #[arg(long)]
        count: Option<usize>,
    },

    /// Explain a randomly chosen shloka.
    Random,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { ephemeral } => {
            let collection = open_collection(&cfg, ephemeral).await?;
            let outcome =
                run_startup_indexing(&cfg.dataset.path, collection.as_ref(), cfg.index.max_rows)
                    .await;
            let advisor = build_advisor(&cfg, collection)?;
            let state = AppState::new(Arc::new(advisor), outcome);
            run_server(&cfg.server.bind, state, &cfg.server.allowed_origins).await?;
        }
        Commands::Index => {
            let collection = open_collection(&cfg, false).await?;
            let outcome =
                run_startup_indexing(&cfg.dataset.path, collection.as_ref(), cfg.index.max_rows)
                    .await;
            println!("Loaded {} documents into the collection.", outcome.documents_loaded());
            println!("collection size: {}", collection.count().await?);
            if !outcome.is_ready() {
                anyhow::bail!("indexing failed: {:?}", outcome);
            }
        }
        Commands::Ask { situation, count } => {
            let collection = open_collection(&cfg, false).await?;
            let advisor = build_advisor(&cfg, collection)?;
            let count = count.unwrap_or(cfg.retrieval.shloka_count);
            let advice = advisor.ask(&situation, count).await?;
            println!("{}", advice);
        }
        Commands::Random => {
            let collection = open_collection(&cfg, false).await?;
            let advisor = build_advisor(&cfg, collection)?;
            println!("{}", advisor.random_shloka().await);
        }
    }

    Ok(())
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                config::load_config(default_path)
            } else {
                warn!(path = DEFAULT_CONFIG_PATH, "config file not found; using defaults");
                Ok(Config::default())
            }
        }
    }
}

async fn open_collection(cfg: &Config, ephemeral: bool) -> anyhow::Result<Arc<dyn VectorCollection>> {
    let embedder: Arc<dyn Embedder> = Arc::new(
        OpenAiEmbedder::from_env(&cfg.embedding).context("Failed to create embedder")?,
    );

    if ephemeral {
        info!(collection = %cfg.index.collection, "using in-memory collection");
        return Ok(Arc::new(InMemoryCollection::new(
            cfg.index.collection.clone(),
            embedder,
        )));
    }

    let collection = SqliteCollection::open(&cfg.store.path, &cfg.index.collection, embedder)
        .await
        .with_context(|| format!("Failed to open store at {}", cfg.store.path.display()))?;
    Ok(Arc::new(collection))
}

fn build_advisor(cfg: &Config, collection: Arc<dyn VectorCollection>) -> anyhow::Result<Advisor> {
    let chat = OpenAiChat::from_env(&cfg.chat).context("Failed to create chat client")?;
    Ok(Advisor::new(
        Retriever::new(collection),
        Arc::new(chat),
        AdvisorSettings::from_config(cfg),
    ))
}
