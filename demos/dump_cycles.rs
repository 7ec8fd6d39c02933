// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fastwave_sim::{Cycle, HeaderInfo, Simulation, VariableInfo, WaveError};

#[derive(Parser)]
struct Cli {
    /// The path to the file to read
    path: std::path::PathBuf,

    /// Only track variables with this name, may be repeated
    #[arg(short = 'r', long = "only")]
    only: Vec<String>,

    /// Number of cycles to dump
    #[arg(short = 'n', long, default_value_t = 10)]
    num_cycles: usize,
}

fn value_str(var: &VariableInfo, cycle: &Cycle) -> String {
    let width = var.variable.width as usize;
    match cycle.decode(&var.variable) {
        Ok(value) => format!("0x{value:0digits$x}", digits = width.div_ceil(4)),
        Err(_) => "?".to_string(),
    }
}

fn dump_signals(tracked: &[&VariableInfo], cycle: &Cycle) {
    for var in tracked {
        let logic = cycle.render_id(&var.variable.id).unwrap_or_default();
        println!(
            "{:<2}: {:20} -> {logic} {}",
            var.variable.id,
            var.variable.path(),
            value_str(var, cycle)
        );
    }
}

fn main() -> Result<(), WaveError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Cli::parse();

    use std::time::Instant;

    let now = Instant::now();
    let mut sim = Simulation::open(&args.path)?;
    let schema = sim.load_header()?;
    for line in schema.scope_tree() {
        println!("{line}");
    }

    let only: Vec<&str> = args.only.iter().map(String::as_str).collect();
    sim.allocate_state(Some(only.as_slice()))?;

    let info: HeaderInfo = sim.header_info()?;
    let mut tracked: Vec<&VariableInfo> = info
        .variables
        .iter()
        .filter(|var| var.offset.is_some())
        .collect();
    tracked.sort_by_key(|var| var.offset);
    // aliases share their slot, show it once
    tracked.dedup_by_key(|var| var.offset);

    let mut num_cycles = 0;
    while num_cycles < args.num_cycles {
        let Some(cycle) = sim.advance()? else {
            println!("simulation stopped after {num_cycles} cycles");
            break;
        };
        if cycle.index() == -1 {
            println!("== Initial State (cycle = -1)");
        } else {
            println!();
            println!("== Cycle {}", cycle.index());
        }
        dump_signals(&tracked, &cycle);
        num_cycles += 1;
    }

    let elapsed = now.elapsed();
    println!("Simulated {} : {:.2?}", args.path.display(), elapsed);

    Ok(())
}
