// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lampwalk CLI entrypoint.
//!
//! ```text
//! lampwalk evaluate <arrangement.json> [--rule R] [--step S] [--json]
//! lampwalk trace <arrangement.json> [--every N] [--json]
//! lampwalk order --path-length N --speeds 2,0.5,1 [--order 2,0,1]
//! lampwalk example
//! ```
//!
//! Arrangement files use the `POST /simulate` request schema; `-` reads
//! stdin. Exits non-zero on any evaluation error.

// The CLI is expected to print to stdout.
#![allow(clippy::print_stdout)]

mod render;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lampwalk_core::{EvaluationConfig, IlluminationRule};
use lampwalk_proto::{
    decode_request, ordering::ordered_individuals, run_request, SimulateRequest,
    EXAMPLE_ARRANGEMENT_JSON,
};

#[derive(Parser, Debug)]
#[command(name = "lampwalk", author, version, about = "Lamp-lit path traversal simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an arrangement and print per-individual verdicts
    Evaluate {
        /// Arrangement JSON (`-` for stdin)
        file: PathBuf,
        /// Illumination rule (lamped_nodes, continuous, node_crossings)
        #[arg(long)]
        rule: Option<IlluminationRule>,
        /// Fixed step in seconds
        #[arg(long)]
        step: Option<f64>,
        /// Print the raw response JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the sampled positions and lamp states
    Trace {
        /// Arrangement JSON (`-` for stdin)
        file: PathBuf,
        /// Keep every N-th snapshot (the last one is always kept)
        #[arg(long, default_value_t = 1)]
        every: usize,
        /// Fixed step in seconds
        #[arg(long)]
        step: Option<f64>,
        /// Print frames as JSON
        #[arg(long)]
        json: bool,
    },
    /// Derive sequential start delays from speeds and a traversal order
    Order {
        /// Number of nodes on the path
        #[arg(long)]
        path_length: usize,
        /// Speeds, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        speeds: Vec<f64>,
        /// Walking order as indices into `speeds`; input order when omitted
        #[arg(long, value_delimiter = ',')]
        order: Vec<usize>,
    },
    /// Print the sample arrangement
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Evaluate {
            file,
            rule,
            step,
            json,
        } => {
            let mut req = read_request(&file)?;
            if rule.is_some() {
                req.rule = rule;
            }
            if step.is_some() {
                req.step_seconds = step;
            }
            let resp = run_request(&req, EvaluationConfig::default(), None)
                .with_context(|| format!("evaluate {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                println!("{}", render::verdict_table(&resp));
                println!("{}", render::summary(&resp));
            }
        }
        Commands::Trace {
            file,
            every,
            step,
            json,
        } => {
            let mut req = read_request(&file)?;
            req.include_trace = true;
            if step.is_some() {
                req.step_seconds = step;
            }
            let resp = run_request(&req, EvaluationConfig::default(), None)
                .with_context(|| format!("trace {}", file.display()))?;
            let frames = resp
                .trace
                .as_ref()
                .map(|t| render::thin(&t.frames, every))
                .unwrap_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&frames)?);
            } else {
                println!("{}", render::trace_table(&frames));
            }
        }
        Commands::Order {
            path_length,
            speeds,
            order,
        } => {
            let order = if order.is_empty() {
                (0..speeds.len()).collect()
            } else {
                order
            };
            let individuals = ordered_individuals(path_length, &speeds, &order)?;
            println!("{}", serde_json::to_string_pretty(&individuals)?);
        }
        Commands::Example => print!("{EXAMPLE_ARRANGEMENT_JSON}"),
    }
    Ok(())
}

fn read_request(path: &Path) -> Result<SimulateRequest> {
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("read {}", path.display()))?
    };
    decode_request(&bytes).with_context(|| format!("decode {}", path.display()))
}
