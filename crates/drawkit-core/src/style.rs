//! Style codec: structured style maps and their flattened string form.
//!
//! A cell style is a set of `key → value` entries. It travels in two
//! equivalent shapes:
//!
//! - structured: a [`Style`] map (insertion ordered)
//! - flattened: `key=value;key2;` as stored in the diagram XML
//!
//! [`StyleSource`] is the tagged union callers hand in; both variants convert
//! into a [`Style`] with [`StyleSource::to_style`].
//!
//! # Round trips
//!
//! `Style::parse(&style.stringify()) == style` holds whenever every value is a
//! [`StyleValue::Text`]. Falsy values other than the empty string (`0`,
//! `false`) flatten to a bare key and come back as `Text("")`, so a caller
//! relying on numeric or boolean falsy values loses that distinction. The
//! string direction is lossless up to the trailing `;`:
//!
//! ```
//! # use drawkit_core::style::Style;
//! let flattened = "ellipse;whiteSpace=wrap;html=1";
//! assert_eq!(Style::parse(flattened).stringify(), format!("{flattened};"));
//! ```

use std::{convert::Infallible, fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single style value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// "No opinion": omitted when flattening and ignored when merging.
    /// Deserializes from `null`.
    Unset,
}

impl StyleValue {
    /// Empty text, zero, NaN and `false` are falsy and flatten to a bare key.
    pub fn is_falsy(&self) -> bool {
        match self {
            StyleValue::Bool(value) => !value,
            StyleValue::Number(value) => *value == 0.0 || value.is_nan(),
            StyleValue::Text(value) => value.is_empty(),
            StyleValue::Unset => true,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, StyleValue::Unset)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Bool(value) => write!(f, "{value}"),
            StyleValue::Number(value) => write!(f, "{value}"),
            StyleValue::Text(value) => f.write_str(value),
            StyleValue::Unset => Ok(()),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        StyleValue::Bool(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

/// Structured style: an insertion-ordered map of style entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(IndexMap<String, StyleValue>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flattened style string.
    ///
    /// Tokens are split on `;` (empty tokens dropped) and then on the first
    /// `=`. A bare token yields an empty text value: the key is present, with
    /// no value. A repeated key keeps its first position and its last value.
    pub fn parse(flattened: &str) -> Self {
        flattened
            .split(';')
            .filter(|token| !token.is_empty())
            .map(|token| match token.split_once('=') {
                Some((key, value)) => (key.to_string(), StyleValue::from(value)),
                None => (token.to_string(), StyleValue::from("")),
            })
            .collect()
    }

    /// Flattens the style, every entry terminated by `;`.
    ///
    /// Falsy values emit the bare key, [`StyleValue::Unset`] entries are
    /// skipped entirely.
    pub fn stringify(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.0 {
            if value.is_unset() {
                continue;
            }
            out.push_str(key);
            if !value.is_falsy() {
                out.push('=');
                out.push_str(&value.to_string());
            }
            out.push(';');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    /// Returns the value of `key` rendered as text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.0.get(key).map(ToString::to_string)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces an entry. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`Style::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        self.0.shift_remove(key)
    }

    /// Layers `overlay` on top of this style. Unset overlay values are ignored.
    pub fn merge(&mut self, overlay: &Style) {
        for (key, value) in &overlay.0 {
            if !value.is_unset() {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Owned variant of [`Style::merge`].
    pub fn merged(mut self, overlay: &Style) -> Self {
        self.merge(overlay);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Style
where
    K: Into<String>,
    V: Into<StyleValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl FromStr for Style {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

/// Style as supplied by a caller: either a map or a flattened string.
///
/// Deserializes from a JSON/TOML object or from a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSource {
    Flattened(String),
    Structured(Style),
}

impl StyleSource {
    /// Converts to a structured style.
    ///
    /// A structured source is copied, so the result never aliases the
    /// caller's map.
    pub fn to_style(&self) -> Style {
        match self {
            StyleSource::Flattened(flattened) => Style::parse(flattened),
            StyleSource::Structured(style) => style.clone(),
        }
    }

    /// Converts to the flattened string form.
    ///
    /// A flattened source is returned untouched.
    pub fn to_flattened(&self) -> String {
        match self {
            StyleSource::Flattened(flattened) => flattened.clone(),
            StyleSource::Structured(style) => style.stringify(),
        }
    }
}

impl From<Style> for StyleSource {
    fn from(style: Style) -> Self {
        StyleSource::Structured(style)
    }
}

impl From<&str> for StyleSource {
    fn from(flattened: &str) -> Self {
        StyleSource::Flattened(flattened.to_string())
    }
}
