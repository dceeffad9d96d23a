//! CLI interface for the text-matching service

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use textmatch::embedding::{Embedder, HashingEmbedder, MiniLmEmbedder};
use textmatch::store::{EmbeddingStore, DEFAULT_MATCH_THRESHOLD};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "textmatch")]
#[command(about = "A minimal semantic text-matching service", long_about = None)]
struct Cli {
    /// Embedding backend to use
    #[arg(long, value_enum, default_value = "mini-lm")]
    embedder: EmbedderKind,

    /// Data directory for persistence. If set, state is persisted to disk.
    #[arg(long)]
    data_dir: Option<String>,

    /// Similarity threshold for `check` and /check-text
    #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
    threshold: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone)]
enum EmbedderKind {
    /// Local all-MiniLM-L6-v2 inference (downloads the model on first use)
    MiniLm,
    /// Deterministic feature hashing (no model files)
    Hashing,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a text snippet to the store
    Add {
        /// Text to embed and store
        text: String,
    },
    /// Query the nearest stored text
    Query {
        /// Query text
        text: String,
    },
    /// Threshold the nearest match into a yes/no decision
    Check {
        /// Text to check
        text: String,
    },
    /// Delete every entry exactly equal to the given text
    Delete {
        /// Text to delete
        text: String,
    },
    /// Delete everything, including snapshot files
    DeleteAll,
    /// List stored texts in insertion order
    List,
    /// Start the HTTP API server
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

fn build_embedder(kind: &EmbedderKind) -> Result<Box<dyn Embedder>> {
    Ok(match kind {
        EmbedderKind::MiniLm => Box::new(MiniLmEmbedder::new()?),
        EmbedderKind::Hashing => Box::new(HashingEmbedder::default()),
    })
}

fn run(mut store: EmbeddingStore, command: Commands) -> Result<()> {
    match command {
        Commands::Add { text } => {
            store.add(&text)?;
            println!("Added embedding for '{}'", text);
        }
        Commands::Query { text } => match store.query(&text)? {
            Some(hit) => println!("{} (similarity: {:.4})", hit.text, hit.score),
            None => println!("No match (store is empty)"),
        },
        Commands::Check { text } => {
            let decision = store.check(&text)?;
            match (decision.matched, decision.matched_text, decision.similarity_score) {
                (true, Some(matched), Some(score)) => {
                    println!("Matched '{}' (similarity: {:.4})", matched, score);
                }
                (_, _, Some(score)) => {
                    println!(
                        "No match above threshold {:.2} (nearest similarity: {:.4})",
                        store.threshold(),
                        score
                    );
                }
                _ => println!("No match (store is empty)"),
            }
        }
        Commands::Delete { text } => {
            let removed = store.delete_exact(&text)?;
            if removed == 0 {
                println!("No matches found for '{}'", text);
            } else {
                println!("Deleted {} instance(s) of '{}'", removed, text);
            }
        }
        Commands::DeleteAll => {
            store.delete_all()?;
            println!("All embeddings deleted");
        }
        Commands::List => {
            let texts = store.list();
            if texts.is_empty() {
                println!("No embeddings stored");
            } else {
                println!("Stored texts ({} total):", texts.len());
                for text in texts {
                    println!("  - {}", text);
                }
            }
        }
        Commands::Serve { .. } => {
            unreachable!("Serve handled separately");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let embedder = build_embedder(&cli.embedder)?;
    let store = match &cli.data_dir {
        Some(dir) => EmbeddingStore::open(embedder, dir)?,
        None => EmbeddingStore::in_memory(embedder),
    }
    .with_threshold(cli.threshold);

    // The serve command needs the async runtime; everything else is a
    // one-shot operation against the store.
    if let Commands::Serve { ref addr } = cli.command {
        textmatch::server::start(addr, store).await?;
        return Ok(());
    }

    run(store, cli.command)
}
