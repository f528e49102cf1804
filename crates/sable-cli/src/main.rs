//! sable: command-line driver for the SAT and bit-vector decision
//! procedures.
//!
//! Two subcommands map to the two pipelines:
//!
//! ```text
//! sable sat problem.cnf     # DIMACS CNF → CDCL
//! sable bv  problem.bv      # constraint file → normalize → ILP → B&B
//! ```
//!
//! `--json` renders the outcome as a single JSON object on stdout. Logging
//! goes to stderr and is controlled through `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sable_ilp::{BvOutcome, BvSolver};
use sable_sat::{CdclSolver, SatResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

mod dimacs;
mod parse;

#[derive(Parser)]
#[command(name = "sable", version, about = "SAT and bit-vector decision procedures")]
struct Cli {
    /// Emit the outcome as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide satisfiability of a DIMACS CNF file
    Sat { file: PathBuf },
    /// Decide satisfiability of a bit-vector constraint file
    Bv { file: PathBuf },
}

fn main() {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Sat { file } => run_sat(file, cli.json),
        Commands::Bv { file } => run_bv(file, cli.json),
    };
    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run_sat(file: &Path, json: bool) -> Result<()> {
    let input =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let formula = dimacs::parse(&input)?;
    info!(
        vars = formula.num_vars(),
        clauses = formula.clauses().len(),
        "parsed dimacs"
    );

    match CdclSolver::new(&formula).solve() {
        SatResult::Sat(model) => {
            let lits: Vec<i64> = model
                .iter()
                .enumerate()
                .map(|(i, &v)| if v { i as i64 + 1 } else { -(i as i64 + 1) })
                .collect();
            if json {
                println!("{}", serde_json::json!({ "status": "sat", "model": lits }));
            } else {
                println!("s SATISFIABLE");
                let values: Vec<String> = lits.iter().map(i64::to_string).collect();
                println!("v {} 0", values.join(" "));
            }
        }
        SatResult::Unsat => {
            if json {
                println!("{}", serde_json::json!({ "status": "unsat" }));
            } else {
                println!("s UNSATISFIABLE");
            }
        }
    }
    Ok(())
}

fn run_bv(file: &Path, json: bool) -> Result<()> {
    let input =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let problem = parse::parse(&input)?;
    info!(
        vars = problem.variables.len(),
        conjuncts = problem.conjuncts.len(),
        "parsed constraints"
    );

    let mut solver = BvSolver::new();
    for conjunct in problem.conjuncts {
        solver.add(conjunct);
    }
    let outcome = solver.solve()?;
    if json {
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }
    match outcome {
        BvOutcome::Sat(model) => {
            // declared-but-unconstrained variables are free; print them as 0
            for (name, _) in &problem.variables {
                println!("{name} = {}", model.get(name).copied().unwrap_or(0));
            }
        }
        BvOutcome::Unsat => println!("UNSAT"),
    }
    Ok(())
}
