mod classify;
mod cli;
mod config;
mod engine;
mod export;
mod inflect;
mod present;
mod resolver;
mod routes;
mod scanner;
mod snapshot;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Result, bail};
use clap::Parser;

use cli::{Cli, Commands, OutputFormat};
use config::ExplorerConfig;
use engine::AnalysisEngine;
use routes::{RouteLocator, RouteMatch};
use snapshot::AppSnapshot;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Explore {
            route,
            app,
            depth,
            format,
        } => explore(&route, &app, depth, format),

        Commands::Routes { app, format } => list_routes(&app, format),
    }
}

fn explore(
    identifier: &str,
    app: &Path,
    depth: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = AppSnapshot::load(app)?;
    let config = ExplorerConfig::load(&snapshot.base_dir);

    let locator = RouteLocator::new(&snapshot.routes);
    let route = match locator.locate(identifier) {
        RouteMatch::Found(route) => route.clone(),
        RouteMatch::Ambiguous(candidates) => {
            print!("{}", present::render_ambiguous(identifier, &candidates));
            bail!("ambiguous route identifier '{identifier}'");
        }
        RouteMatch::NotFound(suggestions) => {
            print!("{}", present::render_not_found(identifier, &suggestions));
            bail!("route '{identifier}' not found");
        }
    };

    let max_depth = depth.unwrap_or(config.max_depth);

    // Machine formats keep stdout clean: no panel, narration discarded.
    let map = match format {
        OutputFormat::Json | OutputFormat::Dot => {
            AnalysisEngine::new(&snapshot, &config, max_depth, std::io::sink())
                .explore_route(&route)?
        }
        OutputFormat::Table | OutputFormat::Tree => {
            print!("{}", present::route_panel(&route));
            println!();
            AnalysisEngine::new(&snapshot, &config, max_depth, std::io::stdout())
                .explore_route(&route)?
        }
    };

    match format {
        OutputFormat::Table => {
            println!();
            print!(
                "{}",
                present::render_table(&map, std::io::stdout().is_terminal())
            );
        }
        OutputFormat::Tree => {
            println!();
            print!("{}", present::render_tree(&map));
        }
        OutputFormat::Json => println!("{}", present::render_json(&route, &map)),
        OutputFormat::Dot => print!("{}", export::render_dot(&map)),
    }

    Ok(())
}

fn list_routes(app: &Path, format: OutputFormat) -> Result<()> {
    let snapshot = AppSnapshot::load(app)?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&snapshot.routes).unwrap_or_default()
        ),
        _ => print!(
            "{}",
            present::render_route_list(&snapshot.routes, std::io::stdout().is_terminal())
        ),
    }

    Ok(())
}
