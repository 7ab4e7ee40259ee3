use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use intersection_sim::simulation::{NetworkConfig, OverflowPolicy, RunParameters, SimTime};
use intersection_sim::stats::SimulationReport;

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Discrete-event simulation of traffic through signalled intersections")]
struct Cli {
    /// Simulation horizon; prompted for when omitted
    #[arg(allow_negative_numbers = true)]
    total_time: Option<SimTime>,

    /// Period between signal ring toggles; prompted for when omitted
    #[arg(allow_negative_numbers = true)]
    semaphore_frequency: Option<SimTime>,

    /// Seed the RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// JSON network description (defaults to the built-in two intersections)
    #[arg(long)]
    network: Option<PathBuf>,

    /// What happens to a vehicle whose destination lane is full
    #[arg(long, value_enum, default_value_t = OverflowPolicy::Drop)]
    overflow: OverflowPolicy,

    /// Print the built-in network as JSON and exit
    #[arg(long)]
    dump_network: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.dump_network {
        println!("{}", NetworkConfig::two_intersections().to_json()?);
        return Ok(());
    }

    let (total_time, semaphore_frequency) = match (cli.total_time, cli.semaphore_frequency) {
        (Some(total_time), Some(frequency)) => (total_time, frequency),
        _ => prompt_parameters()?,
    };

    let params = RunParameters::new(total_time, semaphore_frequency)?
        .with_seed(cli.seed)
        .with_overflow(cli.overflow);

    let network = match &cli.network {
        Some(path) => NetworkConfig::load(path)?,
        None => NetworkConfig::two_intersections(),
    };

    let mut world = network
        .build_world(&params)
        .context("Invalid network configuration")?;
    world
        .run(params.total_time)
        .context("Simulation aborted")?;

    let report = SimulationReport::from_world(&world);
    report.log_summary();
    print!("{}", report);
    Ok(())
}

/// Ask for the horizon and the semaphore frequency on stdin
fn prompt_parameters() -> Result<(SimTime, SimTime)> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |question: &str| -> Result<SimTime> {
        print!("{}: ", question);
        io::stdout().flush()?;
        let line = lines
            .next()
            .context("No input provided")?
            .context("Failed to read input")?;
        line.trim()
            .parse()
            .with_context(|| format!("'{}' is not an integer", line.trim()))
    };

    let total_time = ask("Total simulation time")?;
    let semaphore_frequency = ask("Semaphore frequency")?;
    Ok((total_time, semaphore_frequency))
}
