use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Parser};

use lineasm::frontend::token_dumper::TokenDumper;
use lineasm::lexer::tokenize_program;
use lineasm::load_error::LoadError;
use lineasm::loader::{load_file, read_source};
use lineasm::log::{self, Level};
use lineasm::vm::{Engine, EngineConfig, RunOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "lineasm",
    version,
    about = "Line-oriented instruction interpreter (SET/INC/ADD/JL/PRINT/DUMP ...)"
)]
struct Cli {
    /// Program to run.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[arg(
        long = "tokens",
        action = ArgAction::SetTrue,
        long_help = "Print the tokenized program instead of running it."
    )]
    tokens: bool,

    #[arg(
        long = "pretty",
        action = ArgAction::SetTrue,
        requires = "tokens",
        long_help = "With --tokens, print only the canonical form of each instruction."
    )]
    pretty: bool,

    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    no_color: bool,

    #[arg(
        long = "max-steps",
        value_name = "N",
        long_help = "Stop after N executed instructions. Exits with status 2 when the limit is hit."
    )]
    max_steps: Option<u64>,

    #[arg(
        long = "keep-going",
        action = ArgAction::SetTrue,
        long_help = "Keep executing after a runtime error instead of halting on the first one."
    )]
    keep_going: bool,

    #[arg(
        long = "state",
        action = ArgAction::SetTrue,
        long_help = "Print the final program state after the run."
    )]
    state: bool,

    #[arg(
        long = "json",
        action = ArgAction::SetTrue,
        long_help = "Print the final program state as JSON after the run."
    )]
    json: bool,

    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        log::USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.quiet {
        log::set_min_level(Level::Warn);
    }

    let result = if cli.tokens {
        dump_tokens(&cli)
    } else {
        run_program(&cli)
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            lineasm::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("output error: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode state: {0}")]
    Json(#[from] serde_json::Error),
}

fn dump_tokens(cli: &Cli) -> Result<ExitCode, CliError> {
    let source = read_source(&cli.file)?;
    let tokens = tokenize_program(&source)?;

    let mut dumper = TokenDumper::new();
    if cli.no_color {
        dumper = dumper.no_color();
    }
    if cli.pretty {
        dumper = dumper.pretty();
    }

    let stdout = io::stdout();
    dumper.dump(&tokens, &mut stdout.lock())?;
    Ok(ExitCode::SUCCESS)
}

fn run_program(cli: &Cli) -> Result<ExitCode, CliError> {
    let start = Instant::now();
    let state = load_file(&cli.file)?;

    for warning in &state.warnings {
        lineasm::warn!("{}", warning);
    }

    let config = EngineConfig {
        max_steps: cli.max_steps,
        halt_on_error: !cli.keep_going,
    };
    let mut engine = Engine::with_config(state, config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = engine.run(&mut out)?;

    let state = engine.into_state();
    for e in &state.errors {
        lineasm::error!("{}", e);
    }

    if cli.state {
        writeln!(out, "{}", state)?;
    }
    if cli.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
    }
    out.flush()?;

    lineasm::info!(
        "Program finished in {:.6} seconds ({} steps)",
        start.elapsed().as_secs_f64(),
        summary.steps
    );

    Ok(match summary.outcome {
        RunOutcome::StepLimit => {
            lineasm::warn!("step limit of {} reached", cli.max_steps.unwrap_or_default());
            ExitCode::from(2)
        }
        _ if state.has_errors() => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
