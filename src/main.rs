//! bench CLI - content-hash directory patching

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use bench::logging::init_logging;
use bench::ops::{fetch, generate};
use bench::{Config, ErrorPolicy, IoResultExt, MANIFEST_FILE};

#[derive(Parser)]
#[command(name = "bench")]
#[command(about = "patch directories by content hash from a file or http origin")]
#[command(version)]
struct Cli {
    /// verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// config file (default: ./bench.toml when present)
    #[arg(long, global = true, env = "BENCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// generate the manifest for a directory
    Generate {
        /// local target
        #[arg(long, default_value = ".")]
        target: PathBuf,

        /// origin label recorded in the manifest
        #[arg(long)]
        source: Option<String>,

        #[command(flatten)]
        pool: PoolArgs,
    },

    /// fetch changed files from a file or http origin
    Fetch {
        /// local target
        #[arg(long, default_value = ".")]
        target: PathBuf,

        /// reference locator (default: the origin recorded in the local manifest)
        #[arg(long)]
        source: Option<String>,

        #[command(flatten)]
        pool: PoolArgs,
    },

    /// print version information
    Version,
}

#[derive(Args)]
struct PoolArgs {
    /// worker count, below 2 runs sequentially
    #[arg(long)]
    worker: Option<usize>,

    /// scale the worker count by the number of cpus
    #[arg(long)]
    dynamic: Option<bool>,

    /// stop on the first file that cannot be hashed or fetched
    #[arg(long)]
    fail_fast: bool,
}

impl PoolArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(worker) = self.worker {
            config.pool.workers = worker;
        }
        if let Some(dynamic) = self.dynamic {
            config.pool.dynamic = dynamic;
        }
        if self.fail_fast {
            config.pool.on_error = ErrorPolicy::Abort;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> bench::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(Path::new("."))?,
    };
    init_logging(&config.log, cli.verbose)?;

    match cli.command {
        Commands::Generate {
            target,
            source,
            pool,
        } => {
            pool.apply(&mut config);
            let target = absolute(&target)?;

            let report = generate(&target, &config.generate_options(source))?;
            println!(
                "wrote {} items to {} ({} ignored)",
                report.items,
                target.join(MANIFEST_FILE).display(),
                report.ignored
            );
        }

        Commands::Fetch {
            target,
            source,
            pool,
        } => {
            pool.apply(&mut config);
            let target = absolute(&target)?;

            let report = fetch(&target, &config.fetch_options(source))?;
            if !report.verified {
                println!(
                    "warning: unverified origin {} (reached through {})",
                    report.reference_origin.as_deref().unwrap_or("<none>"),
                    report.locator
                );
            }
            println!(
                "fetched {} of {} missing files from {}",
                report.fetched.len(),
                report.missing,
                report.locator
            );
            for failure in &report.failed {
                println!("  failed {}: {}", failure.name, failure.error);
            }
        }

        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// make `path` absolute against the working directory, dropping `.` parts
fn absolute(path: &Path) -> bench::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().with_path(".")?.join(path)
    };
    Ok(joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}
