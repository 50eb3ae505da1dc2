//! nodebind command-line driver.
//!
//! Generates resolver units for a directory of C# sources:
//!
//! ```text
//! nodebind generate game/scripts --out game/generated --kind all
//! nodebind list game/scripts --kind scene-node
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nodebind::codegen::Driver;
use nodebind::{CodegenError, Corpus, GeneratorKind, RunConfig, generate_dir};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nodebind", version, about = "Generate field resolvers for C# sources")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate resolver units into an output directory
    Generate(GenerateArgs),
    /// List the hint names of every candidate without writing
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Directory of C# sources
    source_dir: PathBuf,

    /// Directory generated units are written to
    #[arg(long)]
    out: PathBuf,

    /// Generators to run
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,

    /// TOML run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a diagnostic dump of the run to this file
    #[arg(long)]
    debug_dump: Option<PathBuf>,

    /// Skip candidates whose path contains this segment
    #[arg(long)]
    vendored_segment: Option<String>,

    /// Process candidates one at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    /// Directory of C# sources
    source_dir: PathBuf,

    /// Generators to list candidates for
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,

    /// TOML run configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    Dependency,
    SceneNode,
    All,
}

impl KindArg {
    fn kind(self) -> Option<GeneratorKind> {
        match self {
            Self::Dependency => Some(GeneratorKind::Dependency),
            Self::SceneNode => Some(GeneratorKind::SceneNode),
            Self::All => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::List(args) => run_list(args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, kind: KindArg) -> Result<RunConfig> {
    let config = match path {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => RunConfig::default(),
    };
    Ok(match kind.kind() {
        Some(kind) => config.only(kind),
        None => config,
    })
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), args.kind)?;
    if let Some(segment) = &args.vendored_segment {
        config = config.with_vendored_segment(segment);
    }
    if args.sequential {
        config = config.sequential();
    }
    if let Some(dump) = &args.debug_dump {
        config = config.with_debug_dump(dump);
    }

    let report = generate_dir(&args.source_dir, &args.out, &config).with_context(|| {
        format!(
            "generating {} into {}",
            args.source_dir.display(),
            args.out.display()
        )
    })?;

    for path in &report.written {
        println!("{}", path.display());
    }
    for error in report.errors() {
        eprintln!("error: {error}");
    }
    println!(
        "{} units written, {} candidates failed",
        report.units(),
        report.errors().count()
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(CodegenError::CandidatesFailed {
            failed: report.errors().count(),
            total: report.candidates(),
        }
        .into())
    }
}

fn run_list(args: ListArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.kind)?;
    let corpus = Corpus::load_dir(&args.source_dir)
        .with_context(|| format!("loading {}", args.source_dir.display()))?;
    for generator in &config.generators {
        for hint_name in Driver::new(&corpus, generator).candidates() {
            println!("{hint_name}");
        }
    }
    Ok(())
}
