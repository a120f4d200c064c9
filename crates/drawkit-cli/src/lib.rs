//! Drawkit CLI library
//!
//! This module contains the core CLI logic for the Drawkit diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};
pub use error_adapter::ErrorAdapter;

use log::info;
use serde::de::DeserializeOwned;

use drawkit::{
    DiagramTools, DrawkitError, LayoutRequest, NewEdge, NewNode, NodeEdit, ToolOutput,
};

/// Run the Drawkit CLI application
///
/// Loads the configuration and runs the selected diagram operation.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `DrawkitError` for:
/// - Configuration loading errors
/// - Invalid JSON or request fields
/// - File I/O errors and malformed diagram files
/// - Unknown ids and layout failures
pub fn run(args: &Args) -> Result<ToolOutput, DrawkitError> {
    info!(path = args.command.path(); "Processing diagram");

    let app_config = config::load_config(args.config.as_ref())?;
    let mut tools = DiagramTools::new(&app_config);

    match &args.command {
        Command::New { path } => tools.new_diagram(path),
        Command::Add {
            path,
            nodes,
            layout,
            direction,
        } => {
            let nodes: Vec<NewNode> = parse_items("nodes", nodes)?;
            let request = layout.as_ref().map(|algorithm| {
                let request = LayoutRequest::new(algorithm);
                match direction {
                    Some(direction) => request.with_direction(direction),
                    None => request,
                }
            });
            tools.add_nodes(path, &nodes, request.as_ref())
        }
        Command::Edit { path, nodes } => {
            let edits: Vec<NodeEdit> = parse_items("nodes", nodes)?;
            tools.edit_nodes(path, &edits)
        }
        Command::Link { path, edges } => {
            let edges: Vec<NewEdge> = parse_items("edges", edges)?;
            tools.link_nodes(path, &edges)
        }
        Command::Remove { path, ids } => tools.remove_nodes(path, ids),
        Command::Info { path } => tools.get_diagram_info(path),
        Command::Stats { path } => {
            let stats = tools.diagram_stats(path);
            Ok(ToolOutput::new(format!(
                "Nodes: {}, Edges: {}",
                stats.node_count, stats.edge_count
            )))
        }
        Command::Layout {
            path,
            algorithm,
            direction,
        } => {
            let mut request = LayoutRequest::new(algorithm);
            if let Some(direction) = direction {
                request = request.with_direction(direction);
            }
            tools.apply_layout(path, &request)
        }
    }
}

/// Parses a JSON array of items, or a single object as a one-item list.
fn parse_items<T: DeserializeOwned>(flag: &str, json: &str) -> Result<Vec<T>, DrawkitError> {
    let invalid =
        |err: serde_json::Error| DrawkitError::Validation(format!("invalid JSON in --{flag}: {err}"));

    if json.trim_start().starts_with('[') {
        serde_json::from_str(json).map_err(invalid)
    } else {
        serde_json::from_str(json).map(|item| vec![item]).map_err(invalid)
    }
}
