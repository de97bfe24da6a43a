//! Log setup and size-based rotation of the optional log file.
//!
//! Console output goes to stderr (stdout carries the report). `RUST_LOG`
//! overrides the level chosen by `--verbose`.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Maximum log file size before rotation (10 MiB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated backup files to keep.
pub const MAX_ROTATED_FILES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve against the terminal once, at startup.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal()
            }
        }
    }
}

/// Global logging flags.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// When to use colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,

    /// Also append plain log lines to this file (rotated at 10 MiB).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Install the global subscriber.
pub fn init(args: &LogArgs) -> Result<()> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let ansi = args.color.enabled();
    match args.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false);

    let file = match &args.log_file {
        Some(path) => {
            let (file, rotated) = LogFile::new(path, MAX_LOG_BYTES, MAX_ROTATED_FILES)
                .open()
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            if rotated {
                eprintln!("rotated log file {}", path.display());
            }
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}

/// Append-only log file capped at `max_bytes`, keeping `backups` numbered
/// copies (`sync.log.1` is the newest).
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
            backups,
        }
    }

    /// Open for append, creating parent directories. A full file is shifted
    /// into the backups first; the flag reports whether that happened. A
    /// failed rotation is reported on stderr and the current file reused.
    pub fn open(&self) -> io::Result<(fs::File, bool)> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let rotated = match self.rotate_if_full() {
            Ok(rotated) => rotated,
            Err(err) => {
                eprintln!("log rotation failed for {}: {err}", self.path.display());
                false
            }
        };
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok((file, rotated))
    }

    fn rotate_if_full(&self) -> io::Result<bool> {
        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };
        if len < self.max_bytes {
            return Ok(false);
        }

        remove_if_present(&self.backup(self.backups))?;
        // generation 0 is the live file
        for generation in (0..self.backups).rev() {
            let from = self.backup(generation);
            if from.exists() {
                fs::rename(&from, self.backup(generation + 1))?;
            }
        }
        remove_if_present(&self.path)?;
        Ok(true)
    }

    fn backup(&self, generation: usize) -> PathBuf {
        if generation == 0 {
            return self.path.clone();
        }
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{generation}"));
        PathBuf::from(name)
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
