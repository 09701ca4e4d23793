// pprl CLI - privacy-preserving record linkage over CSV datasets

mod exit_codes;
mod link;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};
use pprl_linkage::{DateOrder, LinkageError};

#[derive(Parser)]
#[command(name = "pprl")]
#[command(about = "Link personal records across two datasets without exchanging raw identifiers")]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link dataset A against dataset B as described by a TOML config
    #[command(after_help = "\
Examples:
  pprl link linkage.toml
  pprl link linkage.toml --json
  pprl link linkage.toml --output matches.json --threshold 0.85")]
    Link {
        /// Path to the linkage .toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of the human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides [output].json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override [matching].threshold
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Validate a linkage config without running
    #[command(after_help = "\
Examples:
  pprl validate linkage.toml")]
    Validate {
        /// Path to the linkage .toml config file
        config: PathBuf,
    },

    /// Print the canonical forms used for matching
    #[command(after_help = "\
Examples:
  pprl normalize --name 'Jon Smith' --dob 01/02/1990 --address '12-14 Main Str.'
  pprl normalize --dob 02/01/1990 --date-order month-first --json")]
    Normalize {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        dob: Option<String>,

        #[arg(long)]
        address: Option<String>,

        /// How to read ambiguous numeric dates
        #[arg(long, value_enum, default_value_t = DateOrderArg::DayFirst)]
        date_order: DateOrderArg,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DateOrderArg {
    DayFirst,
    MonthFirst,
}

impl From<DateOrderArg> for DateOrder {
    fn from(arg: DateOrderArg) -> Self {
        match arg {
            DateOrderArg::DayFirst => DateOrder::DayFirst,
            DateOrderArg::MonthFirst => DateOrder::MonthFirst,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "pprl=info,pprl_linkage=info",
        1 => "pprl=debug,pprl_linkage=debug",
        _ => "pprl=trace,pprl_linkage=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Link { config, json, output, threshold } => link::cmd_link(config, json, output, threshold),
        Commands::Validate { config } => link::cmd_validate(config),
        Commands::Normalize { name, dob, address, date_order, json } => {
            link::cmd_normalize(name, dob, address, date_order.into(), json)
        }
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<LinkageError> for CliError {
    fn from(err: LinkageError) -> Self {
        let hint = match &err {
            LinkageError::MissingColumn { dataset, .. } => {
                Some(format!("map the CSV headers under [datasets.{dataset}.columns]"))
            }
            LinkageError::InvalidBloomParams { .. } => {
                Some("[bloom] size and hash_count must both be at least 1".to_string())
            }
            _ => None,
        };
        let code = match &err {
            LinkageError::ConfigParse(_)
            | LinkageError::ConfigValidation(_)
            | LinkageError::InvalidBloomParams { .. } => EXIT_INVALID_CONFIG,
            LinkageError::MissingColumn { .. }
            | LinkageError::MissingField { .. }
            | LinkageError::Csv { .. }
            | LinkageError::Io(_) => EXIT_RUNTIME,
        };
        Self { code, message: err.to_string(), hint }
    }
}
