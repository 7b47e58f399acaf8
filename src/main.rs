use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fess::level::Level;
use fess::parser::parse_board;
use fess::report::{write_record, SolutionRecord};
use fess::search::config::default_worker_count;
use fess::{SolveResult, SolveStatus, Solver, SolverConfig, Strategy};

// --- Command Line Arguments ---

#[derive(Parser, Debug)]
#[command(name = "fess")]
#[command(about = "fess - adaptive multi-strategy Sokoban solver")]
#[command(version)]
struct Args {
    /// Level file in XSB format
    input: Option<PathBuf>,

    /// Time allocation in seconds
    #[arg(short = 't', long = "time", default_value_t = 60)]
    time: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output file (accepted for compatibility, the report always goes to <input stem>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads: 1, 2, 4, 8 or "auto"
    #[arg(long, default_value = "1", value_parser = parse_cores)]
    cores: usize,

    /// Run a single strategy (A-H) with the whole time budget
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Added to the search tree log size of every worker
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    extra_mem: i32,

    /// Base-2 logarithm of the search tree node capacity
    #[arg(long, default_value_t = 20)]
    log_size: u32,
}

fn parse_cores(s: &str) -> Result<usize, String> {
    if s.eq_ignore_ascii_case("auto") {
        return Ok(default_worker_count());
    }
    s.parse::<usize>()
        .map_err(|e| format!("expected a core count or \"auto\": {}", e))
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = solver_config(&args);
    init_tracing(config.verbose);

    match run(&args, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn solver_config(args: &Args) -> SolverConfig {
    SolverConfig::default()
        .with_time_limit(Duration::from_secs(args.time))
        .with_workers(args.cores)
        .with_forced_strategy_option(args.strategy)
        .with_log_size(args.log_size)
        .with_extra_mem(args.extra_mem)
        .with_verbose(args.verbose)
}

fn run(args: &Args, config: SolverConfig) -> Result<ExitCode> {
    let Some(input) = args.input.as_deref() else {
        eprintln!("Error: Input file required.");
        return Ok(ExitCode::FAILURE);
    };
    if let Some(output) = &args.output {
        debug!(output = %output.display(), "ignoring --output");
    }

    let map_text = fs::read_to_string(input).with_context(|| format!("can't open map file {}", input.display()))?;
    let board = match parse_board(&map_text) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error parsing file: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if config.verbose {
        println!("Initial board:");
        print!("{}", board);
    }

    let mut solver = Solver::new(config).context("invalid solver configuration")?;

    let result = solver.solve(&board);
    match &result.status {
        SolveStatus::Solved => report_solution(solver.config().verbose, input, &map_text, &result),
        SolveStatus::Unsolved => {
            eprintln!("No solution found within time limit");
            Ok(ExitCode::SUCCESS)
        }
        SolveStatus::PreprocessFailed(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_solution(verbose: bool, input: &Path, map_text: &str, result: &SolveResult) -> Result<ExitCode> {
    let replay = result.replay().context("solution does not replay")?;

    if verbose {
        println!("Solution found! {} moves in solution", result.moves.len());
        if let Some(level) = &result.level {
            print_raw_moves(level, result);
        }
        println!("LURD: {} ({} steps, {} pushes)", replay.lurd, replay.steps, replay.pushes);
    }

    let record = SolutionRecord::new(input, map_text, &replay.lurd, result.statistics.elapsed_secs());
    if let Err(e) = write_record(Path::new("."), input, &record) {
        eprintln!("Error: {}", e);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_raw_moves(level: &Level, result: &SolveResult) {
    println!("Raw moves:");
    for (i, m) in result.moves.iter().enumerate() {
        let (fy, fx) = level.map.coords(m.from).unwrap_or_default();
        let (ty, tx) = level.map.coords(m.to).unwrap_or_default();
        println!(
            "Move {}: from={}({},{}) to={}({},{}) pull={}",
            i, m.from, fy, fx, m.to, ty, tx, m.pull as u8
        );
    }
}
