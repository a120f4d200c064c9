//! Drawkit Codecs
//!
//! Converts a [`drawkit_core::DiagramGraph`] to the on-disk form in two
//! steps:
//!
//! - [`xml`]: graph to and from mxGraph model XML
//! - [`container`]: XML to and from an SVG document carrying it as an
//!   encoded `content` attribute

pub mod container;
pub mod xml;

mod error;

pub use container::{embed, extract};
pub use error::{ContainerError, XmlError};
pub use xml::{from_xml, to_xml};
