//! PartGraph CLI
//!
//! Command-line tools for PartGraph binary graph files.
//!
//! # Commands
//!
//! - `inspect` - Display the header and region layout of a graph file
//! - `convert` - Convert a text edge list into a binary graph file
//! - `load` - Load a node range and walk it with worker threads
//! - `verify` - Check the structure of a graph file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PartGraph command-line graph tools.
#[derive(Parser)]
#[command(name = "partgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the header and region layout of a graph file
    Inspect {
        /// Graph file
        graph: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Convert a whitespace-separated edge list into a graph file
    Convert {
        /// Edge list: one `src dst [weight]` per line, `#` starts a comment
        input: PathBuf,

        /// Output graph file
        output: PathBuf,

        /// Store the third column as 4-byte edge data
        #[arg(short, long)]
        weighted: bool,

        /// Node count (default: largest node id + 1)
        #[arg(short, long)]
        nodes: Option<u64>,
    },

    /// Load a node range and walk its adjacency
    Load {
        /// Graph file
        graph: PathBuf,

        /// First node to load
        #[arg(short, long, default_value = "0")]
        start: u64,

        /// One past the last node to load (default: all nodes)
        #[arg(short, long)]
        end: Option<u64>,

        /// Worker threads walking the loaded range
        #[arg(short, long, default_value = "1")]
        threads: usize,
    },

    /// Verify the structure of a graph file
    Verify {
        /// Graph file
        graph: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { graph, format } => {
            commands::inspect::run(&graph, &format)?;
        }
        Commands::Convert {
            input,
            output,
            weighted,
            nodes,
        } => {
            commands::convert::run(&input, &output, weighted, nodes)?;
        }
        Commands::Load {
            graph,
            start,
            end,
            threads,
        } => {
            commands::load::run(&graph, start, end, threads)?;
        }
        Commands::Verify { graph } => {
            commands::verify::run(&graph)?;
        }
        Commands::Version => {
            println!("PartGraph CLI v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "Graph format v{}",
                partgraph_format::GRAPH_FORMAT_VERSION
            );
        }
    }

    Ok(())
}
