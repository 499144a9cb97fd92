//! supplyindex CLI — engine info and a local simulation harness.
//!
//! Usage:
//! ```bash
//! supplyindex sim [listen-addr] [block-count]
//! supplyindex info
//! supplyindex version
//! ```

use std::env;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use supplyindex_core::{SupplyConfig, SupplyEngine};

mod sim;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "info" => cmd_info(),
        "sim" => {
            if let Err(err) = cmd_sim(&args[2..]) {
                eprintln!("error: {err:#}");
                process::exit(1);
            }
        }
        "version" | "--version" | "-V" => {
            println!("supplyindex {}", env!("CARGO_PKG_VERSION"));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("supplyindex {}", env!("CARGO_PKG_VERSION"));
    println!("Incremental coin-supply aggregation engine\n");
    println!("USAGE:");
    println!("    supplyindex <COMMAND>\n");
    println!("COMMANDS:");
    println!("    sim [addr] [blocks]  Run the engine against a simulated chain");
    println!("                         (default 127.0.0.1:3000, 120 blocks)");
    println!("    info                 Show SupplyIndex configuration info");
    println!("    version              Print version");
    println!("    help                 Print this help");
}

fn cmd_info() {
    println!("SupplyIndex v{}", env!("CARGO_PKG_VERSION"));
    println!("  Supply scale: 1e8 base units per coin");
    println!("  Block variants: proof-of-work (coinbase), proof-of-stake (coinstake)");
    println!("  Commit model: per-block cursor, per-pass range-sum commit");
    println!("  Endpoints: /supply/total, /supply/circulating, /utils/estimatefee, /health");
}

fn cmd_sim(args: &[String]) -> anyhow::Result<()> {
    let addr: SocketAddr = args
        .first()
        .map(String::as_str)
        .unwrap_or("127.0.0.1:3000")
        .parse()
        .context("invalid listen address")?;
    let blocks: u64 = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("120")
        .parse()
        .context("invalid block count")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(run_sim(addr, blocks))
}

async fn run_sim(addr: SocketAddr, blocks: u64) -> anyhow::Result<()> {
    let chain = sim::SimChain::new(blocks, Duration::from_millis(500));
    let config = SupplyConfig::default();
    let min_estimate_fee = config.min_estimate_fee;
    let engine = SupplyEngine::start(Arc::clone(&chain), config)
        .await
        .context("failed to start engine")?;
    chain.start_ticking();

    let state = supplyindex_http::ApiState {
        ledger: engine.ledger(),
        source: chain,
        min_estimate_fee,
    };
    tracing::info!(%addr, blocks, "simulation running");
    supplyindex_http::serve(addr, state)
        .await
        .context("API server failed")?;
    Ok(())
}
