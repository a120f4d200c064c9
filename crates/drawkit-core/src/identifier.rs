//! Cell identifiers backed by a process-wide string interner.
//!
//! Diagram cells are addressed by caller-supplied strings. Those strings are
//! interned once and then passed around as the small, `Copy` [`Id`] handle, so
//! graph lookups hash a symbol rather than a whole string.

use std::{
    fmt,
    sync::{Mutex, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for cell identifiers.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`; a poisoned lock is recovered because the
/// interner is append-only and cannot be left half-updated.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<T>(f: impl FnOnce(&mut DefaultStringInterner) -> T) -> T {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut interner)
}

/// Interned identifier of a diagram cell.
///
/// # Examples
///
/// ```
/// use drawkit_core::identifier::Id;
///
/// let node = Id::new("db");
/// assert_eq!(node, "db");
///
/// // Edge ids are derived from their endpoints.
/// let edge = Id::edge_between(Id::new("app"), node);
/// assert_eq!(edge, "app-2-db");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Builds the deterministic id of the edge linking `from` to `to`.
    ///
    /// Linking the same pair twice yields the same id, which turns a second
    /// link into an update of the first one.
    pub fn edge_between(from: Id, to: Id) -> Self {
        let name = format!("{from}-2-{to}");
        Self::new(&name)
    }

    /// Returns the identifier text as an owned `String`.
    pub fn as_string(&self) -> String {
        with_interner(|interner| interner.resolve(self.0).unwrap_or_default().to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
