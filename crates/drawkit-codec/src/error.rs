//! Error types for the diagram codecs.

use std::{io, str::Utf8Error};

use thiserror::Error;

/// Failure while writing or reading the diagram XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("utf8 error: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("missing required attribute: {0}")]
    MissingAttr(&'static str),

    #[error("invalid number for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unexpected structure: {0}")]
    Structure(String),

    #[error("document is empty")]
    Empty,

    #[error("failed to write xml: {0}")]
    Write(String),
}

/// Failure while decoding the payload embedded in a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("deflate error: {0}")]
    Deflate(#[from] io::Error),

    #[error("payload is not valid utf-8: {0}")]
    Utf8(#[from] Utf8Error),
}
