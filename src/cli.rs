use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Route-to-class relationship explorer for exported application snapshots.
///
/// route-explorer resolves a route identifier against a snapshot's route
/// table, then walks the handler's class graph (inheritance, interfaces,
/// traits, injected dependencies, scanned method-body usages) to a bounded
/// depth and presents the result.
#[derive(Parser, Debug)]
#[command(
    name = "route-explorer",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for exploration results.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable columnar table with ANSI bold headers when stdout is a terminal (default).
    #[default]
    Table,
    /// Indented discovery-order tree with kind glyphs.
    Tree,
    /// Structured JSON suitable for programmatic consumption.
    Json,
    /// Graphviz DOT digraph of the relationship map.
    Dot,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explore a route's class relationship graph.
    ///
    /// The identifier may be a route name, a URI, or a "METHOD URI" pair,
    /// including a line copy-pasted from a route listing, with irregular
    /// whitespace and pipe-joined methods.
    Explore {
        /// Route identifier (e.g. "notes.show", "notes/{note}", "GET notes/{note}").
        route: String,

        /// Path to the application snapshot JSON.
        #[arg(long)]
        app: PathBuf,

        /// Maximum exploration depth (overrides the configured default).
        #[arg(long)]
        depth: Option<usize>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List all routes in the snapshot (method, URI, name, action).
    Routes {
        /// Path to the application snapshot JSON.
        #[arg(long)]
        app: PathBuf,

        /// Output format (table or json; tree and dot fall back to table).
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}
