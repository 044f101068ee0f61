//! `tsetlin` command-line driver.
//!
//! Examples:
//!   tsetlin
//!   tsetlin run --rounds 20000 --states 6 --seed 7
//!   tsetlin run --population 3 --table 0,0.5,0.5,0.1 --json
//!   tsetlin sweep --states-list 1,2,4,8 --seed 7
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;
use tracing_subscriber::EnvFilter;

use tsetlin::experiments::sweep;
use tsetlin::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Sweep,
}

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    rounds: Option<usize>,
    states: Option<u32>,
    population: Option<usize>,
    seed: Option<u64>,
    tail: Option<usize>,
    low: Option<String>,
    high: Option<String>,
    table: Option<Vec<f64>>,
    parallel: bool,
    json: bool,
    states_list: Option<Vec<u32>>,
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.first().map(String::as_str) {
        Some("--help" | "-h" | "help") => {
            print_help();
            return;
        }
        Some("run") => (Command::Run, &args[1..]),
        Some("sweep") => (Command::Sweep, &args[1..]),
        Some(flag) if flag.starts_with("--") => (Command::Run, &args[..]),
        None => (Command::Run, &args[..]),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage_error();
            process::exit(2);
        }
    };

    let opts = match parse_options(rest) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage_error();
            process::exit(2);
        }
    };

    let result = match command {
        Command::Run => run_single(&opts),
        Command::Sweep => run_sweep(&opts),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(exit_code(&e));
    }
}

fn exit_code(e: &SimError) -> i32 {
    match e {
        SimError::Config(_) => 2,
        _ => 1,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

const USAGE: &str = "\
tsetlin (population of Tsetlin automata under collective feedback)
usage:
  tsetlin [run] [options]
  tsetlin sweep --states-list 1,2,4,8 [options]
  tsetlin --help

options:
  --rounds <N>          rounds to run (default 10000)
  --states <N>          states per action (default 4)
  --population <N>      automata in the population (default 5)
  --seed <S>            RNG seed (default: time-derived, logged)
  --tail <K>            history values shown in the report (default 100)
  --low <LABEL>         label of the low action (default No)
  --high <LABEL>        label of the high action (default Yes)
  --table p0,p1,...     reward probability per M (needed unless population is 5)
  --parallel            apply feedback via rayon (needs the `parallel` feature)
  --json                print the report as JSON
  --config <FILE>       JSON config; flags override its fields";

fn print_help() {
    println!("{USAGE}");
}

fn print_usage_error() {
    eprintln!("{USAGE}");
}

fn parse_options(args: &[String]) -> Result<Options, ConfigError> {
    let mut opts = Options::default();
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--parallel" => opts.parallel = true,
            "--json" => opts.json = true,
            "--config" => opts.config = Some(PathBuf::from(value(flag, it.next())?)),
            "--rounds" => opts.rounds = Some(parse_value(flag, it.next())?),
            "--states" => opts.states = Some(parse_value(flag, it.next())?),
            "--population" => opts.population = Some(parse_value(flag, it.next())?),
            "--seed" => opts.seed = Some(parse_value(flag, it.next())?),
            "--tail" => opts.tail = Some(parse_value(flag, it.next())?),
            "--low" => opts.low = Some(value(flag, it.next())?.to_string()),
            "--high" => opts.high = Some(value(flag, it.next())?.to_string()),
            "--table" => opts.table = Some(parse_list(flag, it.next())?),
            "--states-list" => opts.states_list = Some(parse_list(flag, it.next())?),
            other => {
                return Err(ConfigError::Parse {
                    flag: other.to_string(),
                    value: "unknown flag".to_string(),
                })
            }
        }
    }
    Ok(opts)
}

fn value<'a>(flag: &str, v: Option<&'a String>) -> Result<&'a str, ConfigError> {
    v.map(String::as_str).ok_or_else(|| ConfigError::Parse {
        flag: flag.to_string(),
        value: "missing value".to_string(),
    })
}

fn parse_value<T: FromStr>(flag: &str, v: Option<&String>) -> Result<T, ConfigError> {
    let raw = value(flag, v)?;
    raw.trim().parse().map_err(|_| ConfigError::Parse {
        flag: flag.to_string(),
        value: raw.to_string(),
    })
}

fn parse_list<T: FromStr>(flag: &str, v: Option<&String>) -> Result<Vec<T>, ConfigError> {
    let raw = value(flag, v)?;
    raw.split(',')
        .map(|part| {
            part.trim().parse().map_err(|_| ConfigError::Parse {
                flag: flag.to_string(),
                value: raw.to_string(),
            })
        })
        .collect()
}

fn build_config(opts: &Options) -> Result<SimConfig, SimError> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            let cfg: SimConfig = serde_json::from_reader(reader)?;
            info!(path = %path.display(), "loaded config file");
            cfg
        }
        None => SimConfig::default(),
    };

    if let Some(v) = opts.rounds {
        cfg.rounds = v;
    }
    if let Some(v) = opts.states {
        cfg.states_per_action = v;
    }
    if let Some(v) = opts.population {
        cfg.population_size = v;
    }
    if let Some(v) = opts.seed {
        cfg.seed = Some(v);
    }
    if let Some(v) = opts.tail {
        cfg.history_tail = v;
    }
    if let Some(v) = &opts.low {
        cfg.labels.low = v.clone();
    }
    if let Some(v) = &opts.high {
        cfg.labels.high = v.clone();
    }
    if let Some(v) = &opts.table {
        cfg.feedback = FeedbackRule::Table(v.clone());
    }
    if opts.parallel {
        cfg.tier = ExecutionTier::Parallel;
    }

    if cfg.seed.is_none() {
        let seed = time_seed();
        info!(seed, "no seed given; pass --seed {} to reproduce this run", seed);
        cfg.seed = Some(seed);
    }

    cfg.validate()?;
    Ok(cfg)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

fn run_single(opts: &Options) -> Result<(), SimError> {
    let cfg = build_config(opts)?;
    let mut sim = Simulation::new(cfg)?;
    if sim.config().tier != sim.effective_execution_tier() {
        info!("parallel feature not compiled in; running scalar");
    }
    sim.run()?;

    let report = sim.report();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run_sweep(opts: &Options) -> Result<(), SimError> {
    let cfg = build_config(opts)?;
    let states = opts
        .states_list
        .clone()
        .unwrap_or_else(|| vec![1, 2, 4, 8]);

    let rows = sweep::sweep_states(&cfg, &states)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        sweep::print_rows(&rows);
    }
    Ok(())
}
