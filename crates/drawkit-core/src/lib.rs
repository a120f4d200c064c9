//! Drawkit Core Types
//!
//! This crate provides the in-memory model of a draw.io diagram. It includes:
//!
//! - **Identifiers**: String-interned cell identifiers ([`identifier::Id`])
//! - **Styles**: The style codec between maps and `key=value;` strings ([`style`] module)
//! - **Shapes**: The constant archetype table of shape kinds ([`kind`] module)
//! - **Geometry**: Positions, sizes and bounding boxes ([`geometry`] module)
//! - **Cells**: Vertices and edges ([`cell`] module)
//! - **Graph**: The diagram graph and its mutation operations ([`graph`] module)

pub mod cell;
pub mod geometry;
pub mod graph;
pub mod identifier;
pub mod kind;
pub mod style;

pub use cell::{Cell, CellBody, Edge, Parent, Vertex};
pub use graph::{DiagramGraph, GraphError, NewEdge, NewNode, NodeEdit, RemovalPolicy};
pub use identifier::Id;
pub use kind::ShapeKind;
pub use style::{Style, StyleSource, StyleValue};
