use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use abacus_common::{CalculatorConfig, Decimal, Rounding};
use abacus_engine::{AutoSaveObserver, Calculator, LoggingObserver};
use abacus_history::HistoryStore;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Parser)]
#[command(name = "abacus", about = "Decimal calculator with undo/redo and persistent history")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "CALCULATOR_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Directory holding the history file
    #[arg(long, env = "CALCULATOR_HISTORY_DIR", default_value = "history")]
    history_dir: PathBuf,

    /// Maximum number of calculations kept in history
    #[arg(long, env = "CALCULATOR_MAX_HISTORY_SIZE", default_value_t = 1000)]
    max_history: usize,

    /// Save history after every operation
    #[arg(long, env = "CALCULATOR_AUTO_SAVE", default_value_t = true, action = ArgAction::Set)]
    auto_save: bool,

    /// Fractional digits shown in results
    #[arg(long, env = "CALCULATOR_PRECISION", default_value_t = 10)]
    precision: u32,

    /// Rounding mode for displayed results: half-even, half-up, down, up
    #[arg(long, env = "CALCULATOR_ROUNDING", default_value = "half-even")]
    rounding: Rounding,

    /// Reject operands with a larger magnitude
    #[arg(long, env = "CALCULATOR_MAX_INPUT_VALUE")]
    max_input_value: Option<Decimal>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive calculator (default)
    Repl,
    /// Evaluate a single operation and print the result
    Eval {
        /// Operation name, e.g. add or divide
        operation: String,
        #[arg(allow_hyphen_values = true)]
        operand1: String,
        #[arg(allow_hyphen_values = true)]
        operand2: String,
    },
    /// Print the saved history
    History {
        /// Print the history snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print version, history location and available operations
    Info,
}

impl Cli {
    fn config(&self) -> CalculatorConfig {
        CalculatorConfig {
            history_dir: self.history_dir.clone(),
            max_history_size: self.max_history,
            auto_save: self.auto_save,
            precision: self.precision,
            rounding: self.rounding,
            max_input_value: self.max_input_value,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let config = cli.config();
    let mut calc = Calculator::new(config.clone())?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            start_session(&mut calc, &config, std::io::stderr())?;
            install_interrupt_handler()?;
            let stdin = std::io::stdin();
            repl::run(&mut calc, stdin.lock(), std::io::stdout().lock())?;
        }
        Commands::Eval {
            operation,
            operand1,
            operand2,
        } => {
            let result = calc.perform_operation(&operation, &operand1, &operand2)?;
            println!("{}", config.format_result(result));
        }
        Commands::History { json } => {
            calc.load_history()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&calc.snapshot().to_record())?);
            } else if calc.history().is_empty() {
                println!("No calculations in history");
            } else {
                for entry in calc.show_history() {
                    println!("{entry}");
                }
            }
        }
        Commands::Info => {
            println!("abacus v{}", env!("CARGO_PKG_VERSION"));
            println!("history file: {}", config.history_file().display());
            let names: Vec<&str> = calc.registry().names().collect();
            println!("operations: {}", names.join(", "));
        }
    }

    Ok(())
}

/// Load the saved history and attach the session observers.
///
/// An unreadable history file is moved aside before autosave is attached, so
/// the first operation cannot overwrite it. If it cannot be moved the session
/// does not start.
fn start_session<W: Write>(
    calc: &mut Calculator,
    config: &CalculatorConfig,
    mut warnings: W,
) -> anyhow::Result<()> {
    if let Err(e) = calc.load_history() {
        tracing::warn!("could not load history: {e}");
        writeln!(warnings, "Warning: could not load history: {e}")?;

        let store = HistoryStore::new(config.history_file());
        let backup = store.quarantine().with_context(|| {
            format!(
                "history file {} is unreadable and could not be moved aside",
                store.path().display()
            )
        })?;
        writeln!(
            warnings,
            "Warning: unreadable history kept at {}, starting empty",
            backup.display()
        )?;
    }

    calc.add_observer(LoggingObserver);
    calc.add_observer(AutoSaveObserver::from_config(config));
    Ok(())
}

/// Ctrl-C leaves the REPL running so `exit` can still save the history.
fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| eprintln!("\n{}", repl::INTERRUPT_HINT))
}

/// Stderr only carries warnings unless `--verbose`, so it does not clutter
/// the REPL; a log file gets everything from info up.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = match (verbose, log_file) {
        (true, _) => "debug",
        (false, Some(_)) => "info",
        (false, None) => "warn",
    };
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
