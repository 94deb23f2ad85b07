//! `basic`: run or check a line-numbered BASIC program.
//!
//! ```bash
//! basic run game.bas --seed 7
//! basic check game.bas --json
//! RUST_LOG=basic_eval=trace basic run game.bas
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use basic_eval::{run_program, RunConfig, StdConsole, DEFAULT_TAB_WIDTH};
use basic_parser::{parse_file, Program};
use basic_types::Diagnostics;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "basic")]
#[command(version, about = "Line-numbered BASIC interpreter", long_about = None)]
struct Cli {
    /// Log interpreter activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop with an error after this many statements
        #[arg(long, value_name = "N")]
        max_steps: Option<u64>,

        /// Column width of PRINT tab stops
        #[arg(long, value_name = "N", default_value_t = DEFAULT_TAB_WIDTH)]
        tab_width: usize,

        /// Seed for RND
        #[arg(long, value_name = "N")]
        seed: Option<u64>,

        /// Report errors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load and parse a program without running it
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Report the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct CheckSummary<'a> {
    file: &'a str,
    lines: usize,
    statements: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match cli.command {
        Commands::Run {
            file,
            max_steps,
            tab_width,
            seed,
            json,
        } => {
            let mut config = RunConfig::default().with_tab_width(tab_width);
            if let Some(max) = max_steps {
                config = config.with_max_steps(max);
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            run(&file, config, json)
        }
        Commands::Check { file, json } => check(&file, json),
    }
}

fn load(file: &Path, json: bool) -> Option<Program> {
    match parse_file(file) {
        Ok(program) => {
            debug!(
                file = %file.display(),
                lines = program.len(),
                statements = program.statement_count(),
                "parsed"
            );
            Some(program)
        }
        Err(diagnostics) => {
            report(&diagnostics, json);
            None
        }
    }
}

fn run(file: &Path, config: RunConfig, json: bool) -> ExitCode {
    let Some(program) = load(file, json) else {
        return ExitCode::FAILURE;
    };
    let mut console = StdConsole::new();
    match run_program(&program, &mut console, config) {
        Ok(outcome) => {
            info!(?outcome, "program finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&Diagnostics::from(err.to_diagnostic()), json);
            ExitCode::FAILURE
        }
    }
}

fn check(file: &Path, json: bool) -> ExitCode {
    let Some(program) = load(file, json) else {
        return ExitCode::FAILURE;
    };
    let name = file.display().to_string();
    let summary = CheckSummary {
        file: &name,
        lines: program.len(),
        statements: program.statement_count(),
    };
    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!(
            "{}: {} lines, {} statements, no errors",
            summary.file, summary.lines, summary.statements
        );
    }
    ExitCode::SUCCESS
}

/// Print diagnostics to stderr, as text or JSON.
fn report(diagnostics: &Diagnostics, json: bool) {
    if !json {
        eprintln!("{diagnostics}");
        return;
    }
    match serde_json::to_string_pretty(diagnostics) {
        Ok(text) => eprintln!("{text}"),
        Err(e) => eprintln!("error: {e}\n{diagnostics}"),
    }
}
