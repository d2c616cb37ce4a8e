//! Command line front end for embedrank.
//!
//! Results go to stdout; logs go to stderr through `tracing`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use embedrank_embeddings::taste::{self, TastePair};
use embedrank_retrieval::{EmbeddingModel, RetrievalConfig, Retriever, ScoredDocument};

/// Documents ranked by the `demo` command.
pub const DEMO_DOCUMENTS: [&str; 2] = [
    "O gato (nome científico: Felis silvestris catus) ou gato doméstico é um mamífero carnívoro da família dos felídeos, muito popular como animal de estimação...",
    "O cão (nome científico: Canis lupus familiaris), no Brasil também chamado de cachorro, é um mamífero carnívoro da família dos canídeos...",
];

/// Query used by the `demo` command.
pub const DEMO_QUERY: &str = "É um animal que faz au au";

/// Rank documents against a query with text embeddings.
#[derive(Debug, Parser)]
#[command(name = "embedrank", version)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, env = "EMBEDRANK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Embedding backend: `openai` or `sentence-transformer`.
    #[arg(long, global = true)]
    pub model: Option<EmbeddingModel>,

    /// Directory for embedding cache files.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank the two built-in documents against the built-in query.
    Demo,
    /// Rank your own documents against a query.
    Query(QueryArgs),
    /// Print the taste-vector cosine similarity example.
    Taste,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Document text (repeatable).
    #[arg(long = "doc")]
    pub docs: Vec<String>,

    /// File whose whole content is one document (repeatable).
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Number of results to print.
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Query text.
    pub query: String,
}

/// Resolve configuration from file, environment and flags, in that order.
pub async fn resolve_config(cli: &Cli) -> Result<RetrievalConfig> {
    let config = match &cli.config {
        Some(path) => RetrievalConfig::load(path)
            .await
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RetrievalConfig::default(),
    };
    let mut config = config.with_env()?;

    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(dir) = &cli.cache_dir {
        config = config.with_cache_dir(dir.clone());
    }
    if let Some(Command::Query(QueryArgs {
        top_k: Some(top_k), ..
    })) = &cli.command
    {
        config = config.with_top_k(*top_k);
    }

    debug!(
        "Resolved configuration: model={}, cache_dir={}, top_k={}",
        config.embedding.model,
        config.cache_dir.display(),
        config.top_k
    );
    Ok(config)
}

/// Run the parsed command, writing results to `out`.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Some(Command::Taste) => {
            let pairs = taste::pairwise(&taste::PROFILES)?;
            write_taste(out, &pairs)?;
        }
        Some(Command::Query(args)) => {
            let documents = collect_documents(args).await?;
            let config = resolve_config(&cli).await?;
            let retriever = Retriever::new(config)?;
            let results = retriever.rank(documents, &args.query).await?;
            write_results(out, &args.query, &results)?;
        }
        Some(Command::Demo) | None => {
            let documents = DEMO_DOCUMENTS.iter().map(ToString::to_string).collect();
            let config = resolve_config(&cli).await?;
            let retriever = Retriever::new(config)?;
            let results = retriever.rank(documents, DEMO_QUERY).await?;
            write_results(out, DEMO_QUERY, &results)?;
        }
    }
    Ok(())
}

async fn collect_documents(args: &QueryArgs) -> Result<Vec<String>> {
    let mut documents = args.docs.clone();
    for path in &args.files {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        documents.push(content);
    }
    if documents.is_empty() {
        bail!("no documents given; pass --doc or --file");
    }
    Ok(documents)
}

/// Print ranked documents in the `Score:` / document / separator layout.
pub fn write_results(
    out: &mut impl Write,
    query: &str,
    results: &[ScoredDocument],
) -> std::io::Result<()> {
    writeln!(out, "Query: {query}")?;
    for result in results {
        writeln!(out, "Score: {:.4}", result.score)?;
        writeln!(out, "{}", result.document)?;
        writeln!(out, "--------")?;
    }
    Ok(())
}

/// Print one line per listener pair.
pub fn write_taste(out: &mut impl Write, pairs: &[TastePair]) -> std::io::Result<()> {
    for pair in pairs {
        writeln!(
            out,
            "Similarity between {} and {}: {:.4}",
            pair.first, pair.second, pair.similarity
        )?;
    }
    Ok(())
}
