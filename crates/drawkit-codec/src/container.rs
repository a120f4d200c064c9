//! Container codec: the diagram XML embedded in an SVG document.
//!
//! The XML travels in the `content` attribute of the root `<svg>` element as
//! an escaped `mxfile` wrapper around a payload:
//!
//! ```text
//! xml -> percent-encode -> raw deflate -> base64
//! ```
//!
//! which is the encoding draw.io itself reads and writes, so the saved files
//! open in the draw.io editors.

use std::{io::Read, sync::OnceLock};

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{
    Compression,
    read::{DeflateDecoder, DeflateEncoder},
};
use log::{debug, trace};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;

use drawkit_core::geometry::Bounds;

use crate::error::ContainerError;

/// Characters left unescaped by `encodeURIComponent`.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Fixed diagram metadata written into the `mxfile` wrapper.
pub const DIAGRAM_ID: &str = "d";
pub const DIAGRAM_NAME: &str = "P";

const CONTENT_PLACEHOLDER: &str = "replaceme";

fn content_regex() -> &'static Regex {
    static CONTENT: OnceLock<Regex> = OnceLock::new();
    CONTENT.get_or_init(|| Regex::new(r#"content="([^"]+)""#).expect("valid content regex"))
}

fn diagram_regex() -> &'static Regex {
    static DIAGRAM: OnceLock<Regex> = OnceLock::new();
    DIAGRAM.get_or_init(|| {
        Regex::new(r"<diagram[^>]*>([^<]+)</diagram>").expect("valid diagram regex")
    })
}

fn inline_model_regex() -> &'static Regex {
    static INLINE: OnceLock<Regex> = OnceLock::new();
    INLINE.get_or_init(|| {
        Regex::new(r"(?s)<diagram[^>]*>\s*(<mxGraphModel.*</mxGraphModel>)\s*</diagram>")
            .expect("valid inline model regex")
    })
}

/// Percent-encodes, deflates and base64-encodes the XML.
pub fn encode_payload(xml: &str) -> Result<String, ContainerError> {
    let encoded_xml = utf8_percent_encode(xml, ENCODE_SET).to_string();
    let mut encoder = DeflateEncoder::new(encoded_xml.as_bytes(), Compression::default());
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed)?;
    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`encode_payload`]. Whitespace inside the payload is ignored.
pub fn decode_payload(payload: &str) -> Result<String, ContainerError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = STANDARD.decode(compact)?;
    let mut decoder = DeflateDecoder::new(&decoded[..]);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    let inflated_str = std::str::from_utf8(&inflated)?;
    let decoded = percent_decode_str(inflated_str).decode_utf8()?;
    Ok(decoded.into_owned())
}

/// Builds the escaped `mxfile` wrapper stored in the `content` attribute.
pub fn content_attribute(xml: &str) -> Result<String, ContainerError> {
    let payload = encode_payload(xml)?;
    Ok(format!(
        "&lt;mxfile&gt;&lt;diagram id=&quot;{DIAGRAM_ID}&quot; name=&quot;{DIAGRAM_NAME}&quot;&gt;{payload}&lt;/diagram&gt;&lt;/mxfile&gt;"
    ))
}

/// Wraps the XML in an SVG document sized to `bounds`.
///
/// The document is rendered with a placeholder `content` attribute which is
/// then replaced by the already escaped wrapper, so the wrapper is not escaped
/// a second time.
pub fn embed(xml: &str, bounds: Option<Bounds>) -> Result<String, ContainerError> {
    let content = content_attribute(xml)?;

    let (min_x, min_y, width, height) = bounds
        .map(|b| (b.min_x(), b.min_y(), b.width() + 1.0, b.height() + 1.0))
        .unwrap_or((0.0, 0.0, 1.0, 1.0));

    let document = svg::Document::new()
        .set("width", width)
        .set("height", height)
        .set(
            "viewBox",
            format!("{} {} {} {}", min_x - 0.5, min_y - 0.5, width, height),
        )
        .set("content", CONTENT_PLACEHOLDER);

    let svg = document
        .to_string()
        .replacen(CONTENT_PLACEHOLDER, &content, 1);
    debug!(xml_bytes = xml.len(), svg_bytes = svg.len(); "Embedded diagram in container");
    Ok(svg)
}

/// Recovers the diagram XML from a container document.
///
/// Returns `Ok(None)` when the document has no `content` attribute or the
/// attribute holds no `<diagram>` element. A `<diagram>` holding a plain
/// `<mxGraphModel>` instead of an encoded payload is returned as is.
///
/// # Errors
///
/// Fails when the payload is not valid base64, not a raw deflate stream, or
/// does not decode to UTF-8.
pub fn extract(container: &str) -> Result<Option<String>, ContainerError> {
    let Some(content) = content_regex().captures(container) else {
        trace!("No content attribute in container");
        return Ok(None);
    };
    let unescaped = unescape_entities(&content[1]);

    if let Some(payload) = diagram_regex().captures(&unescaped) {
        return decode_payload(&payload[1]).map(Some);
    }
    if let Some(model) = inline_model_regex().captures(&unescaped) {
        return Ok(Some(model[1].to_string()));
    }

    trace!("No diagram element in container content");
    Ok(None)
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
