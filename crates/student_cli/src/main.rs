//! `studentdb` interactive entry point.
//!
//! # Responsibility
//! - Build the store configuration once and open the store.
//! - Optionally enable file logging, then hand stdin/stdout to the shell.

mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use shell::Shell;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use student_core::{
    default_log_level, init_logging, ServiceResult, SqliteStudentStore, StoreConfig,
    StudentService,
};

#[derive(Debug, Parser)]
#[command(name = "studentdb", version, about = "Manage student records in a local database")]
struct Cli {
    /// TOML file with url/username/password/driver (default: ./studentdb.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for rolling log files; logging stays off when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = log_level(cli);
        let log_dir = absolute_dir(log_dir)?;
        init_logging(level, &log_dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }

    let config = StoreConfig::load(cli.config.as_deref())?;
    let store = SqliteStudentStore::open(&config).context(
        "failed to initialize database connection; \
         check the database configuration and that the database file is reachable",
    )?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(StudentService::new(store), stdin.lock(), stdout.lock());

    let session = shell.run();
    let closed = shell.close();
    finish_session(session, closed)
}

/// Session I/O errors take precedence; a close failure is attached to them.
fn finish_session(session: io::Result<()>, closed: ServiceResult<()>) -> Result<()> {
    match (session, closed) {
        (Ok(()), closed) => closed.context("failed to close database connection"),
        (Err(err), Ok(())) => Err(err).context("terminal I/O failed"),
        (Err(err), Err(close_err)) => Err(err).context(format!(
            "terminal I/O failed; closing the database connection also failed: {close_err}"
        )),
    }
}

fn log_level(cli: &Cli) -> &str {
    cli.log_level.as_deref().unwrap_or(default_log_level())
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve current directory")?;
    Ok(cwd.join(dir))
}
