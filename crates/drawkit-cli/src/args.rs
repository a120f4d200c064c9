//! Command-line argument definitions for the Drawkit CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Every subcommand maps onto one diagram operation; node
//! and edge lists are passed as JSON.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Drawkit diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Diagram operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new empty diagram file
    New {
        /// Path of the diagram file (should end with .drawio.svg)
        path: String,
    },

    /// Add nodes to a diagram, optionally laying it out afterwards
    Add {
        path: String,

        /// JSON object or array of nodes, e.g. '[{"id":"a","title":"A","kind":"ellipse"}]'
        #[arg(long)]
        nodes: String,

        /// Layout algorithm to apply after adding
        #[arg(long)]
        layout: Option<String>,

        /// Direction of the hierarchical layout (top-down, left-right)
        #[arg(long, requires = "layout")]
        direction: Option<String>,
    },

    /// Edit nodes or edges
    Edit {
        path: String,

        /// JSON object or array of edits, e.g. '{"id":"a","title":"Renamed"}'
        #[arg(long)]
        nodes: String,
    },

    /// Connect nodes
    Link {
        path: String,

        /// JSON object or array of links, e.g. '[{"from":"a","to":"b","dashed":true}]'
        #[arg(long)]
        edges: String,
    },

    /// Remove nodes or edges by id
    Remove {
        path: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Print the diagram model as XML
    Info { path: String },

    /// Print node and edge counts
    Stats { path: String },

    /// Lay out the top-level nodes of a diagram
    Layout {
        path: String,

        /// One of hierarchical, circle, organic, compact-tree, radial-tree, partition, stack
        algorithm: String,

        /// Direction of the hierarchical layout (top-down, left-right)
        #[arg(long)]
        direction: Option<String>,
    },
}

impl Command {
    /// The diagram file the command works on.
    pub fn path(&self) -> &str {
        match self {
            Command::New { path }
            | Command::Add { path, .. }
            | Command::Edit { path, .. }
            | Command::Link { path, .. }
            | Command::Remove { path, .. }
            | Command::Info { path }
            | Command::Stats { path }
            | Command::Layout { path, .. } => path,
        }
    }
}
