//! Drawkit - create, edit, lay out and persist draw.io diagrams.
//!
//! Diagrams live in SVG files that embed the compressed diagram model, so
//! they render as plain images and reopen in draw.io. This crate ties the
//! graph model of `drawkit-core` and the codecs of `drawkit-codec` to the
//! file system and adds automatic layout.
//!
//! # Overview
//!
//! - [`DiagramTools`] - The file-level operations: create, add, edit, link, remove, inspect.
//! - [`DiagramStore`] - Loading and atomically saving diagram files.
//! - [`layout`] - The layout dispatcher and its engines.
//! - [`config`] - Layout parameters and editing behavior, loadable from TOML.
//!
//! # Example
//!
//! ```rust,no_run
//! use drawkit::{DiagramTools, LayoutRequest};
//! use drawkit_core::{NewEdge, NewNode};
//!
//! let mut tools = DiagramTools::default();
//! tools.new_diagram("architecture.drawio.svg")?;
//! tools.add_nodes(
//!     "architecture.drawio.svg",
//!     &[NewNode::new("api"), NewNode::new("db")],
//!     Some(&LayoutRequest::new("hierarchical")),
//! )?;
//! tools.link_nodes("architecture.drawio.svg", &[NewEdge::new("api", "db")])?;
//! println!("{}", tools.get_diagram_info("architecture.drawio.svg")?);
//! # Ok::<(), drawkit::DrawkitError>(())
//! ```

pub mod config;
pub mod layout;
pub mod store;
pub mod tools;

mod error;

pub use drawkit_core::{NewEdge, NewNode, NodeEdit, RemovalPolicy, ShapeKind};

pub use error::DrawkitError;
pub use layout::{Algorithm, Direction, LayoutDispatcher, LayoutRequest};
pub use store::{DiagramStats, DiagramStore};
pub use tools::{DiagramTools, ToolOutput};
