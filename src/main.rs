use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use repomap::config::Config;
use repomap::error::ResolveError;
use repomap::extract::pipeline::{self, PipelineOptions};
use repomap::index;
use repomap::model::RepoMetadata;
use repomap::provider::{ContentProvider, LocalProvider};
use repomap::resolver;
use repomap::staleness;
use repomap::store::{self, RepoMapFile};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Generate repository structure maps and resolve call stacks
#[derive(Parser)]
#[command(name = "repomap", version, long_version = LONG_VERSION, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "REPOMAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a structural map of a repository
    Generate {
        /// Repository root directory
        repo: PathBuf,

        /// Git ref to fingerprint instead of HEAD
        #[arg(long = "ref")]
        ref_name: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker count (default: available parallelism)
        #[arg(long, env = "REPOMAP_WORKERS")]
        workers: Option<usize>,

        /// Regenerate even when the fingerprint is unchanged
        #[arg(long)]
        force: bool,
    },

    /// Resolve the call stack starting at a file/line location
    CallStack {
        /// Repository root directory
        repo: PathBuf,

        /// Repo-relative file containing the starting line
        #[arg(long)]
        file: String,

        /// Line number (1-based) inside the starting definition
        #[arg(long)]
        line: usize,

        /// Maximum expansion depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Map file to reuse or regenerate
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the call stack here instead of stdout
        #[arg(long)]
        output_stack: Option<PathBuf>,
    },

    /// Print the definition containing a file/line location
    PrintFunction {
        /// Repository root directory
        repo: PathBuf,

        /// Repo-relative file containing the line
        #[arg(long)]
        file: String,

        /// Line number (1-based) inside the definition
        #[arg(long)]
        line: usize,

        /// Map file to reuse or regenerate
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Look up all definitions with a given callable name
    Lookup {
        /// Repository root directory
        repo: PathBuf,

        /// Bare callable name to look up
        #[arg(long)]
        name: String,

        /// Map file to reuse or regenerate
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Generate {
            repo,
            ref_name,
            output,
            workers,
            force,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output.path));
            let map = load_or_generate(&repo, ref_name, &output, workers, &config, force)?;
            println!(
                "Map covers {} files, {} definitions",
                map.model.files.len(),
                map.model.definition_count()
            );
        }

        Command::CallStack {
            repo,
            file,
            line,
            max_depth,
            output,
            output_stack,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output.path));
            let map = load_or_generate(&repo, None, &output, None, &config, false)?;

            let max_depth = max_depth.unwrap_or(config.resolver.max_depth);
            let stack = resolver::resolve_call_stack(&map.model, &file, line, max_depth)?;

            let json = serde_json::to_string_pretty(&stack)
                .context("Failed to serialize call stack")?;
            match output_stack {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Call stack saved to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Command::PrintFunction {
            repo,
            file,
            line,
            output,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output.path));
            let map = load_or_generate(&repo, None, &output, None, &config, false)?;

            let def = map.model.definition_at(&file, line).ok_or_else(|| {
                ResolveError::NoEnclosingDefinition {
                    file: file.clone(),
                    line,
                }
            })?;

            let source_path = repo.join(&file);
            let content = std::fs::read_to_string(&source_path)
                .with_context(|| format!("Failed to read {}", source_path.display()))?;
            println!("{}", def.source_text(&content));
        }

        Command::Lookup { repo, name, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output.path));
            let map = load_or_generate(&repo, None, &output, None, &config, false)?;

            let found = index::lookup_definitions_by_name(&map.model, &name);
            if found.is_empty() {
                println!("No definitions named '{}'", name);
            } else {
                for def in found {
                    println!(
                        "{}:{}-{} {} {}",
                        def.file_path,
                        def.start_line,
                        def.end_line,
                        def.kind.display_name(),
                        def.qualified_name()
                    );
                }
            }
        }
    }

    Ok(())
}

/// Reuse the persisted map when the repository fingerprint is unchanged;
/// otherwise regenerate and persist a fresh one.
fn load_or_generate(
    repo: &PathBuf,
    ref_name: Option<String>,
    output: &PathBuf,
    workers: Option<usize>,
    config: &Config,
    force: bool,
) -> Result<RepoMapFile> {
    let provider =
        LocalProvider::new(repo, config.pipeline.max_file_size).with_ref(ref_name.clone());

    if !force {
        let persisted = store::load(output)?;
        // Fingerprint retrieval failure opens the gate, it does not abort
        let current = provider.fingerprint().unwrap_or_else(|e| {
            tracing::warn!("Fingerprint retrieval failed: {}", e);
            None
        });
        if let Some(map) = persisted
            && staleness::is_up_to_date(Some(&map.metadata), current.as_deref())
        {
            return Ok(map);
        }
    }

    let fetched = provider.fetch()?;
    let options = PipelineOptions {
        workers: workers.or(config.workers()),
    };
    let outcome = pipeline::generate(&fetched.files, &options, &CancellationToken::new())?;

    for failure in &outcome.failures {
        tracing::warn!("Skipped {}: {:?}", failure.path, failure.kind);
    }

    let map = RepoMapFile {
        metadata: RepoMetadata::new(
            repo.display().to_string(),
            ref_name,
            fetched.fingerprint,
        ),
        model: outcome.model,
    };
    store::save(output, &map)?;
    tracing::info!("Map saved to {}", output.display());

    Ok(map)
}
