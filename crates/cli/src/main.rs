// Armorsmith CLI - batch slot/keyword patcher over a record snapshot

mod exit_codes;
mod patch;

use std::path::PathBuf;
use std::process::ExitCode;

use armorsmith_recon::{parse_slot_list, SlotMask};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "armorsmith")]
#[command(about = "Reconcile equipment slot coverage, keywords and crafting requirements")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the patcher from a TOML config file
    #[command(after_help = "\
Examples:
  armorsmith run armorsmith.toml
  armorsmith run armorsmith.toml --json
  armorsmith run armorsmith.toml --output report.json
  armorsmith run armorsmith.toml --dry-run --json")]
    Run {
        /// Path to the armorsmith.toml config file
        config: PathBuf,

        /// Print the JSON run report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON run report to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Decide and report without writing the patch or guess files
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a config, its slot taxonomy and override sources without running
    #[command(after_help = "\
Examples:
  armorsmith validate armorsmith.toml")]
    Validate {
        /// Path to the armorsmith.toml config file
        config: PathBuf,
    },

    /// Convert between a slot list and a hex slot mask
    #[command(after_help = "\
Examples:
  armorsmith slots 30,31        # 0x00000003
  armorsmith slots 0x00000003   # 30,31")]
    Slots {
        /// Comma-separated slot numbers, or a 0x-prefixed mask
        value: String,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  armorsmith-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "armorsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ============================================================================
// slots
// ============================================================================

fn convert_slots(value: &str) -> Result<String, CliError> {
    let value = value.trim();
    let hex = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"));
    match hex {
        Some(digits) => {
            let bits = u32::from_str_radix(digits, 16)
                .map_err(|e| CliError::args(format!("invalid slot mask '{value}': {e}")))?;
            Ok(SlotMask::from_bits(bits).to_string())
        }
        None => {
            let mask = parse_slot_list(value)
                .map_err(|e| CliError::args(e.to_string()).with_hint("slots range from 30 to 61"))?;
            Ok(format!("0x{:08X}", mask.bits()))
        }
    }
}

fn cmd_slots(value: String) -> Result<(), CliError> {
    println!("{}", convert_slots(&value)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Run { config, json, output, dry_run } => patch::cmd_run(config, json, output, dry_run),
        Commands::Validate { config } => patch::cmd_validate(config),
        Commands::Slots { value } => cmd_slots(value),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
