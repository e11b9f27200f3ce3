use std::sync::Arc;
use std::time::Instant;

use cluedo::constants::{MAX_PLAYERS, MIN_PLAYERS};
use cluedo::env_config;
use cluedo::logging;
use cluedo::simulation::{aggregate_statistics, save_statistics, simulate_batch, GameConfig};
use cluedo::SuggestionSearch;

struct Args {
    num_games: usize,
    players: usize,
    seed: u64,
    max_turns: usize,
    output: Option<String>,
}

const USAGE: &str =
    "Usage: cluedo-selfplay [--games N] [--players P] [--seed S] [--max-turns T] [--output FILE]";

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut num_games = 100usize;
    let mut players = 4usize;
    let mut seed = env_config::seed().unwrap_or(42);
    let mut max_turns = GameConfig::default().max_turns;
    let mut output: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                if i < args.len() {
                    num_games = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --games value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--players" => {
                i += 1;
                if i < args.len() {
                    players = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --players value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--max-turns" => {
                i += 1;
                if i < args.len() {
                    max_turns = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --max-turns value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                println!();
                println!("Options:");
                println!("  --games N        Number of games to play (default: 100)");
                println!("  --players P      Seats at the table, {MIN_PLAYERS}-{MAX_PLAYERS} (default: 4)");
                println!("  --seed S         RNG seed (default: $CLUE_SEED or 42)");
                println!("  --max-turns T    Seat turns before a game is abandoned (default: {max_turns})");
                println!("  --output FILE    Write statistics as JSON to FILE");
                println!();
                println!("Environment: CLUE_SEARCH_THREADS, CLUE_EXHAUSTIVE_LIMIT, CLUE_SEED, RUST_LOG");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
        eprintln!("--players must be between {} and {}", MIN_PLAYERS, MAX_PLAYERS);
        std::process::exit(1);
    }

    Args {
        num_games,
        players,
        seed,
        max_turns,
        output,
    }
}

fn main() {
    logging::init();
    let args = parse_args();

    let threads = env_config::init_rayon_threads_lenient();
    println!("Rayon threads: {}", threads);

    let search = match SuggestionSearch::new(&env_config::search_config_on_global_pool()) {
        Ok(search) => Arc::new(search),
        Err(e) => {
            eprintln!("Failed to set up suggestion search: {}", e);
            std::process::exit(1);
        }
    };
    let config = GameConfig {
        player_count: args.players,
        max_turns: args.max_turns,
        exhaustive_limit: env_config::exhaustive_limit(),
    };

    println!(
        "Playing {} games with {} players (seed {}, exhaustive limit {})...",
        args.num_games, args.players, args.seed, config.exhaustive_limit
    );
    let start = Instant::now();
    let summaries = match simulate_batch(&config, &search, args.num_games, args.seed) {
        Ok(summaries) => summaries,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed().as_secs_f64();

    let stats = aggregate_statistics(&summaries, args.seed);
    println!(
        "Done in {:.2}s ({:.1} games/s)",
        elapsed,
        args.num_games as f64 / elapsed.max(1e-9)
    );
    println!();
    println!("  Won by accusation:  {}", stats.finishes.accusation);
    println!("  Last standing:      {}", stats.finishes.last_standing);
    println!("  Turn limit:         {}", stats.finishes.turn_limit);
    println!("  Errors:             {}", stats.finishes.error);
    println!(
        "  Turns to win:       {:.2} ± {:.2} (min {}, median {}, max {})",
        stats.turns.mean, stats.turns.std_dev, stats.turns.min, stats.turns.median, stats.turns.max
    );
    println!("  Mean rounds:        {:.2}", stats.turns.mean_rounds);
    println!("  Undisproved rate:   {:.3}", stats.undisproved_rate);
    println!("  Wrong accusations:  {}", stats.wrong_accusations);
    println!("  Audit failures:     {}", stats.audit_failures);
    for (seat, wins) in stats.wins_by_seat.iter().enumerate() {
        println!("  Seat {} wins:        {}", seat, wins);
    }
    for error in &stats.errors {
        eprintln!("  {}", error);
    }

    if let Some(path) = &args.output {
        if let Err(e) = save_statistics(&stats, path) {
            eprintln!("Failed to write {}: {}", path, e);
            std::process::exit(1);
        }
        println!("Statistics written to {}", path);
    }

    if stats.audit_failures > 0 || stats.finishes.error > 0 {
        std::process::exit(2);
    }
}
