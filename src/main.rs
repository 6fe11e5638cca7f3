//! ASP Graph CLI
//!
//! Usage:
//!   asp-graph fromfile --template <FILE> --as <FILE> [--output <DIR>]
//!   asp-graph fromstr --template <FILE> [--output <DIR>] < answer-sets.json
//!
//! Options:
//!   --keep-going   Emit every graph that resolves, report the others
//!   --compact      Write single-line JSON
//!   -h, --help     Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use asp_graph::{
    parse_document, read_document, validate_answer_sets, validate_template, DocumentFormat, Graph,
    GraphError, GraphResolver, InputError,
};

#[derive(Parser)]
#[command(name = "asp-graph")]
#[command(about = "Turn answer sets into styled graphs using a template")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit every graph that resolves and report the failing answer sets
    #[arg(long, global = true)]
    keep_going: bool,

    /// Write single-line JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Read answer sets from a file
    Fromfile {
        /// Template file (JSON, or TOML by extension)
        #[arg(short, long)]
        template: PathBuf,

        /// Answer sets file (JSON)
        #[arg(short = 'a', long = "as")]
        answer_sets: PathBuf,

        /// Directory receiving one graph-<index>.json per answer set
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read answer sets from stdin
    Fromstr {
        /// Template file (JSON, or TOML by extension)
        #[arg(short, long)]
        template: PathBuf,

        /// Directory receiving one graph-<index>.json per answer set
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("reading from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("writing '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("answer set {index}: {source}")]
    Resolve {
        index: usize,
        #[source]
        source: GraphError,
    },

    #[error("{failed} of {total} answer sets could not be resolved")]
    Partial { failed: usize, total: usize },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        match &e {
            CliError::Graph(err) => eprintln!("{}", err.format("input")),
            CliError::Resolve { index, source } => {
                eprintln!("{}", source.format(&format!("answer set {}", index)))
            }
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let (template_path, output) = match &cli.command {
        Command::Fromfile {
            template, output, ..
        }
        | Command::Fromstr { template, output } => (template, output),
    };
    tracing::info!("Using {} as template file...", template_path.display());
    let template = read_document(template_path)?;

    let answer_sets = match &cli.command {
        Command::Fromfile { answer_sets, .. } => {
            tracing::info!("Using {} as answer sets file...", answer_sets.display());
            read_document(answer_sets)?
        }
        Command::Fromstr { .. } => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Stdin)?;
            parse_document(&buffer, DocumentFormat::Json)?
        }
    };
    let (graphs, total) = resolve(&template, &answer_sets, cli.keep_going)?;

    match output {
        Some(dir) => write_graphs(dir, &graphs, cli.compact)?,
        None => {
            let graphs: Vec<&Graph> = graphs.iter().map(|(_, g)| g).collect();
            println!("{}", to_json(&graphs, cli.compact)?);
        }
    }

    // Failures skipped by --keep-going still fail the run
    if graphs.len() < total {
        return Err(CliError::Partial {
            failed: total - graphs.len(),
            total,
        });
    }
    Ok(())
}

/// Resolve every answer set, keeping each graph's position in the input.
///
/// Also returns how many answer sets there were.
fn resolve(
    template: &Value,
    answer_sets: &Value,
    keep_going: bool,
) -> Result<(Vec<(usize, Graph)>, usize), CliError> {
    let template = validate_template(template).map_err(GraphError::from)?;
    let answer_sets = validate_answer_sets(answer_sets).map_err(GraphError::from)?;
    let resolver = GraphResolver::new(template, answer_sets)?;

    if !keep_going {
        let mut graphs = Vec::with_capacity(resolver.answer_sets().len());
        for (index, answer_set) in resolver.answer_sets().iter().enumerate() {
            let graph = resolver
                .resolve(answer_set)
                .map_err(|source| CliError::Resolve { index, source })?;
            graphs.push((index, graph));
        }
        let total = graphs.len();
        return Ok((graphs, total));
    }

    let results = resolver.parse_each();
    let total = results.len();
    let mut graphs = Vec::with_capacity(total);
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(graph) => graphs.push((index, graph)),
            Err(e) => eprintln!("{}", e.format(&format!("answer set {}", index))),
        }
    }

    tracing::debug!(resolved = graphs.len(), total, "answer sets resolved");
    Ok((graphs, total))
}

fn write_graphs(dir: &Path, graphs: &[(usize, Graph)], compact: bool) -> Result<(), CliError> {
    fs::create_dir_all(dir).map_err(|source| CliError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    for (index, graph) in graphs {
        let path = dir.join(format!("graph-{}.json", index));
        fs::write(&path, to_json(graph, compact)?).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, compact: bool) -> Result<String, CliError> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}
