use std::{
    ffi::OsStr,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rewrite_raw_ptr_fields::{CliOverrides, CompilationDatabase, Settings, config::LogLevel, driver, edits, error::RunError};

/// Exit status for configuration and compilation-database errors.
const USAGE_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "rewrite-raw-ptr-fields", version, about = "Rewrites `T* field_` into `CheckedPtr<T> field_`")]
struct Args {
    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Config file; defaults to the nearest rewrite_raw_ptr_fields.toml above the build dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Parallel front-end invocations (0 = one per core).
    #[arg(long, short, global = true)]
    jobs: Option<usize>,

    /// Wrapper template name.
    #[arg(long, global = true)]
    wrapper: Option<String>,

    /// Front-end program replacing the recorded compiler.
    #[arg(long, global = true)]
    clang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print edits for every pointer field in the selected translation units.
    Rewrite {
        /// Build directory holding compile_commands.json.
        #[arg(short = 'p', long = "build-dir")]
        build_dir: PathBuf,
        /// Sources to process; every compile database entry when empty.
        sources: Vec<PathBuf>,
    },
    /// Apply an edit stream read from stdin.
    Apply {
        /// Directory relative edit paths are resolved against.
        #[arg(short = 'p', long = "build-dir")]
        build_dir: PathBuf,
        /// Only touch files under these paths.
        filters: Vec<PathBuf>,
    },
}

impl Command {
    fn build_dir(&self) -> &Path {
        match self {
            Self::Rewrite {
                build_dir, ..
            }
            | Self::Apply {
                build_dir, ..
            } => build_dir,
        }
    }
}

fn init_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) {
    let file_layer = log_file.map(|log_path| {
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(Path::new(".")),
            log_path.file_name().unwrap_or(OsStr::new("rewrite-raw-ptr-fields.log")),
        );
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(false)
            .with_filter(EnvFilter::new(level.filter_directive()))
    });

    // stdout carries the edit stream; logs go to stderr only.
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new(level.filter_directive()));

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let overrides = CliOverrides {
        wrapper: args.wrapper.clone(),
        clang: args.clang.clone(),
        jobs: args.jobs,
        verbose: args.verbose,
    };
    let settings = Settings::discover(args.config.as_deref(), args.command.build_dir())
        .map(|settings| settings.with_overrides(&overrides));

    let level = match &settings {
        Ok(settings) => settings.logging.level,
        Err(_) if args.verbose => LogLevel::Debug,
        Err(_) => LogLevel::Info,
    };
    init_logging(level, args.log_file.as_deref().map(Path::new));

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            let err = RunError::from(err);
            error!("{err}");
            return exit_code(&err);
        },
    };
    info!("rewrite-raw-ptr-fields v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Rewrite {
            build_dir,
            sources,
        } => match run_rewrite(&build_dir, &sources, &settings).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err @ RunError::UnitsFailed { .. }) => {
                error!("{err}; no edits emitted");
                exit_code(&err)
            },
            Err(err) => {
                error!("{err}");
                exit_code(&err)
            },
        },
        Command::Apply {
            build_dir,
            filters,
        } => run_apply(&build_dir, &filters),
    }
}

async fn run_rewrite(
    build_dir: &Path,
    sources: &[PathBuf],
    settings: &Settings,
) -> Result<(), RunError> {
    let units = CompilationDatabase::load(build_dir)?.select(sources)?;
    let records = driver::rewrite_units(units, settings).await?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    edits::write_edit_block(&mut out, &records)?;
    Ok(())
}

fn exit_code(err: &RunError) -> ExitCode {
    match err {
        RunError::CompileDb(_) | RunError::Config(_) => ExitCode::from(USAGE_ERROR),
        RunError::UnitsFailed {
            ..
        }
        | RunError::Output(_) => ExitCode::FAILURE,
    }
}

fn run_apply(
    build_dir: &Path,
    filters: &[PathBuf],
) -> ExitCode {
    let lines = match edits::read_edit_lines(io::stdin().lock()) {
        Ok(lines) => lines,
        Err(err) => {
            error!("failed to read edits: {err}");
            return ExitCode::FAILURE;
        },
    };

    let (records, rejected) = edits::parse_edit_lines(&lines);
    for (line, err) in &rejected {
        warn!("[apply] unable to parse edit ({err}): {line}");
    }

    let grouped = edits::group_by_file(records, build_dir, filters);
    let summary = edits::apply_all(grouped);
    info!("Applied {} edits ({} errors) to {} files", summary.applied, summary.errors, summary.files);

    if summary.errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
