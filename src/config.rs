use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::error::{Error, Result};
use crate::logging::LogSink;

pub const DEFAULT_AUTOPLAY_MS: u64 = 3500;

#[derive(Debug, Parser)]
#[command(
    name = "chainrule",
    version,
    about = "Step through backpropagation's chain rule for a single weight"
)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<CommandKind>,
}

#[derive(Debug, Subcommand)]
pub enum CommandKind {
    /// Interactive terminal walkthrough (default)
    Tui(TuiArgs),
    /// Print a single step
    Show(ShowArgs),
    /// Print the scalar model
    Model(ModelArgs),
    /// Apply comma-separated commands and print a frame after each
    Script(ScriptArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub autoplay: AutoplayArgs,

    /// Append logs here while the walkthrough is on screen (discarded otherwise)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct AutoplayArgs {
    /// Milliseconds between autoplay advances
    #[arg(long, env = "CHAINRULE_AUTOPLAY_MS", default_value_t = DEFAULT_AUTOPLAY_MS)]
    pub autoplay_ms: u64,
}

impl Default for AutoplayArgs {
    fn default() -> Self {
        AutoplayArgs {
            autoplay_ms: DEFAULT_AUTOPLAY_MS,
        }
    }
}

impl AutoplayArgs {
    pub fn delay(&self) -> Result<Duration> {
        if self.autoplay_ms == 0 {
            return Err(Error::InvalidDelay);
        }
        Ok(Duration::from_millis(self.autoplay_ms))
    }
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Step index (0-8) or key such as `dz_dw`
    #[arg(long, default_value = "0")]
    pub step: String,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ScriptArgs {
    /// e.g. `next,next,play,tick,tick,back`
    #[arg(value_name = "COMMANDS")]
    pub commands: String,

    #[command(flatten)]
    pub autoplay: AutoplayArgs,
}

impl Cli {
    /// Default `EnvFilter` directive implied by `-v` flags.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// The interactive view draws over stderr, so it never logs there.
    pub fn log_sink(&self) -> LogSink {
        match &self.command {
            None => LogSink::Discard,
            Some(CommandKind::Tui(args)) => match &args.log_file {
                Some(path) => LogSink::File(path.clone()),
                None => LogSink::Discard,
            },
            Some(_) => LogSink::Stderr,
        }
    }
}
