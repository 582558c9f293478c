//! Kuhn poker solver binary.
//!
//! Usage:
//!   cargo run --release --bin solve_kuhn -- [OPTIONS]
//!
//! Options:
//!   --iterations <N>     Training iterations (default: 100000)
//!   --seed <N>           Random seed for the randomized-start variant
//!   --randomize          Start from random instead of uniform strategies
//!   --clamp <VALUE>      Average-strategy clamp threshold (default: 0.001)
//!   --output <FILE>      Write the full report as JSON
//!   --help               Show this help

use std::env;
use std::fs::File;
use std::io::Write;
use std::process::ExitCode;

use indicatif::ProgressBar;
use serde::Serialize;

use kuhn_cfr::cfr::{KuhnSolver, SolverConfig, TrainStats};
use kuhn_cfr::kuhn::{Card, History};

/// One row of the strategy table.
#[derive(Serialize)]
struct StrategyRow {
    card: String,
    history: String,
    pass: f64,
    bet: f64,
}

/// One row of the range table.
#[derive(Serialize)]
struct RangeRow {
    observer: String,
    history: String,
    low_card: String,
    low: f64,
    high_card: String,
    high: f64,
}

/// Everything the run produced, for the JSON report.
#[derive(Serialize)]
struct SolveReport {
    config: SolverConfig,
    stats: TrainStats,
    game_value: f64,
    exploitability: f64,
    strategies: Vec<StrategyRow>,
    ranges: Vec<RangeRow>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut iterations: u64 = 100_000;
    let mut seed: Option<u64> = None;
    let mut randomize = false;
    let mut clamp: Option<f64> = None;
    let mut output_file: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--iterations" | "-i" => {
                i += 1;
                if i < args.len() {
                    iterations = args[i].parse().unwrap_or(iterations);
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--randomize" | "-r" => {
                randomize = true;
            }
            "--clamp" | "-c" => {
                i += 1;
                if i < args.len() {
                    clamp = args[i].parse().ok();
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let mut config = SolverConfig::default().with_randomized_initial(randomize);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(clamp) = clamp {
        config = config.with_average_clamp(clamp);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    println!("=================================================");
    println!("  Kuhn Poker CFR Solver");
    println!("=================================================");
    println!();
    println!("Iterations: {}", iterations);
    if randomize {
        match seed {
            Some(seed) => println!("Initial strategies: random (seed {})", seed),
            None => println!("Initial strategies: random (entropy seed)"),
        }
    } else {
        println!("Initial strategies: uniform");
    }
    println!();

    let mut solver = KuhnSolver::new(config.clone());

    let progress = ProgressBar::new(iterations);
    let callback_interval = (iterations / 100).max(1);
    let value = solver.train_with_callback(iterations, callback_interval, |stats| {
        progress.set_position(stats.iterations);
    });
    progress.finish_and_clear();

    let stats = solver.stats();
    println!(
        "Trained {} iterations in {:.2}s ({:.0} it/s), {} info sets",
        stats.iterations, stats.elapsed_seconds, stats.iterations_per_second, stats.info_sets
    );
    println!();
    println!("Game value (first player):  {:+.4}  (expected: -1/18 = -0.0556)", value);
    println!("Average-strategy value:     {:+.4}", solver.game_value());
    println!("Exploitability:             {:.3e}", solver.exploitability());
    println!();

    let decision_histories = ["", "p", "b", "pb"];

    println!("Average strategies (pass / bet):");
    let mut strategies = Vec::new();
    for history_str in decision_histories {
        let history: History = history_str.parse().expect("static history");
        let seat = if history.to_move() == 0 { "P0" } else { "P1" };
        println!("  {} at {}:", seat, history);
        for card in Card::ALL {
            match solver.average_strategy(card, &history) {
                Ok(strategy) => {
                    println!(
                        "    {}: pass={:.3}, bet={:.3}",
                        card, strategy.pass, strategy.bet
                    );
                    strategies.push(StrategyRow {
                        card: card.to_string(),
                        history: history_str.to_string(),
                        pass: strategy.pass,
                        bet: strategy.bet,
                    });
                }
                Err(e) => println!("    {}: no data ({})", card, e),
            }
        }
    }
    println!();

    println!("Opponent ranges after the last action:");
    let mut ranges = Vec::new();
    for history_str in ["p", "b", "pb"] {
        let history: History = history_str.parse().expect("static history");
        println!("  after {}:", history);
        for observer in Card::ALL {
            let range = solver.opponent_range(observer, &history);
            let [low_card, high_card] = observer.others();
            println!(
                "    observer {}: {}={:.3}, {}={:.3}",
                observer, low_card, range.low, high_card, range.high
            );
            ranges.push(RangeRow {
                observer: observer.to_string(),
                history: history_str.to_string(),
                low_card: low_card.to_string(),
                low: range.low,
                high_card: high_card.to_string(),
                high: range.high,
            });
        }
    }

    if let Some(path) = output_file {
        let report = SolveReport {
            config,
            stats: stats.clone(),
            game_value: value,
            exploitability: solver.exploitability(),
            strategies,
            ranges,
        };
        match write_report(&path, &report) {
            Ok(()) => println!("\nReport written to {}", path),
            Err(e) => {
                eprintln!("Failed to write {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn write_report(path: &str, report: &SolveReport) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn print_help() {
    println!("Kuhn Poker CFR Solver");
    println!();
    println!("Usage: solve_kuhn [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -i, --iterations <N>  Training iterations (default: 100000)");
    println!("  -s, --seed <N>        Random seed for the randomized-start variant");
    println!("  -r, --randomize       Start from random instead of uniform strategies");
    println!("  -c, --clamp <VALUE>   Average-strategy clamp threshold (default: 0.001)");
    println!("  -o, --output <FILE>   Write the full report as JSON");
    println!("  -h, --help            Show this help");
}
