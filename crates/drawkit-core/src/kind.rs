//! Shape archetypes.
//!
//! Every vertex is created from a [`ShapeKind`]. The kind selects an entry of
//! the constant [`ARCHETYPES`] table, which supplies the default style and
//! default size. The table is never mutated at runtime.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::style::Style;

/// Arc size used by rounded rectangles when no usable corner radius is given.
pub const DEFAULT_ARC_SIZE: f64 = 24.0;

/// Supported shape kinds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Cylinder,
    Cloud,
    Square,
    Circle,
    Step,
    Actor,
    Text,
    RoundedRectangle,
}

/// Default style and size of a shape kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub kind: ShapeKind,
    pub name: &'static str,
    pub style: &'static str,
    pub width: f64,
    pub height: f64,
}

/// The archetype table, indexed by [`ShapeKind`] declaration order.
pub static ARCHETYPES: [Archetype; 10] = [
    Archetype {
        kind: ShapeKind::Rectangle,
        name: "rectangle",
        style: "rounded=1;whiteSpace=wrap;html=1;",
        width: 120.0,
        height: 60.0,
    },
    Archetype {
        kind: ShapeKind::Ellipse,
        name: "ellipse",
        style: "ellipse;whiteSpace=wrap;html=1;",
        width: 120.0,
        height: 80.0,
    },
    Archetype {
        kind: ShapeKind::Cylinder,
        name: "cylinder",
        style: "shape=cylinder3;whiteSpace=wrap;html=1;boundedLbl=1;backgroundOutline=1;size=15;",
        width: 60.0,
        height: 80.0,
    },
    Archetype {
        kind: ShapeKind::Cloud,
        name: "cloud",
        style: "ellipse;shape=cloud;whiteSpace=wrap;html=1;",
        width: 120.0,
        height: 80.0,
    },
    Archetype {
        kind: ShapeKind::Square,
        name: "square",
        style: "whiteSpace=wrap;html=1;aspect=fixed;rounded=1;",
        width: 80.0,
        height: 80.0,
    },
    Archetype {
        kind: ShapeKind::Circle,
        name: "circle",
        style: "ellipse;whiteSpace=wrap;html=1;aspect=fixed;",
        width: 80.0,
        height: 80.0,
    },
    Archetype {
        kind: ShapeKind::Step,
        name: "step",
        style: "shape=step;perimeter=stepPerimeter;whiteSpace=wrap;html=1;fixedSize=1;",
        width: 120.0,
        height: 80.0,
    },
    Archetype {
        kind: ShapeKind::Actor,
        name: "actor",
        style: "shape=umlActor;verticalLabelPosition=bottom;verticalAlign=top;html=1;outlineConnect=0;",
        width: 30.0,
        height: 60.0,
    },
    Archetype {
        kind: ShapeKind::Text,
        name: "text",
        style: "text;html=1;strokeColor=none;fillColor=none;align=center;verticalAlign=middle;whiteSpace=wrap;rounded=0;",
        width: 60.0,
        height: 30.0,
    },
    Archetype {
        kind: ShapeKind::RoundedRectangle,
        name: "rounded-rectangle",
        style: "rounded=1;whiteSpace=wrap;html=1;absoluteArcSize=1;arcSize=24;",
        width: 120.0,
        height: 60.0,
    },
];

/// Kind-specific creation parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindParams {
    /// Corner radius of a rounded rectangle. Ignored by other kinds.
    #[serde(default)]
    pub corner_radius: Option<f64>,
}

impl ShapeKind {
    /// Every kind, in table order.
    pub fn all() -> impl Iterator<Item = ShapeKind> {
        ARCHETYPES.iter().map(|archetype| archetype.kind)
    }

    pub fn archetype(self) -> &'static Archetype {
        &ARCHETYPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.archetype().name
    }

    /// Parsed default style of this kind.
    pub fn default_style(self) -> Style {
        Style::parse(self.archetype().style)
    }

    /// Style adjustments derived from kind parameters, if any apply.
    ///
    /// Only rounded rectangles react: a corner radius becomes an absolute arc
    /// size of twice the radius, or [`DEFAULT_ARC_SIZE`] when the radius is
    /// below 1.
    pub fn adjustments(self, params: &KindParams) -> Option<Style> {
        match (self, params.corner_radius) {
            (ShapeKind::RoundedRectangle, Some(radius)) => {
                let arc_size = if radius >= 1.0 {
                    radius * 2.0
                } else {
                    DEFAULT_ARC_SIZE
                };
                Some(
                    Style::new()
                        .with("absoluteArcSize", 1)
                        .with("arcSize", arc_size),
                )
            }
            _ => None,
        }
    }

    /// Guesses the kind a style was created from.
    ///
    /// The diagram XML does not record kinds, so reloaded cells recover theirs
    /// from the distinguishing style keys.
    pub fn infer(style: &Style) -> Option<ShapeKind> {
        let shape = style.get_str("shape");
        let fixed_aspect = style.get_str("aspect").as_deref() == Some("fixed");

        match shape.as_deref() {
            Some("cylinder3") => return Some(ShapeKind::Cylinder),
            Some("cloud") => return Some(ShapeKind::Cloud),
            Some("step") => return Some(ShapeKind::Step),
            Some("umlActor") => return Some(ShapeKind::Actor),
            Some(_) => return None,
            None => {}
        }

        if style.contains_key("text") {
            Some(ShapeKind::Text)
        } else if style.contains_key("ellipse") {
            Some(if fixed_aspect {
                ShapeKind::Circle
            } else {
                ShapeKind::Ellipse
            })
        } else if style.contains_key("absoluteArcSize") {
            Some(ShapeKind::RoundedRectangle)
        } else if fixed_aspect {
            Some(ShapeKind::Square)
        } else if style.contains_key("rounded") {
            Some(ShapeKind::Rectangle)
        } else {
            None
        }
    }
}

/// Error returned when a kind name is not in the archetype table.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unsupported shape kind '{name}', expected one of: {}", allowed_kinds())]
pub struct UnknownKind {
    pub name: String,
}

fn allowed_kinds() -> String {
    ShapeKind::all()
        .map(ShapeKind::name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for ShapeKind {
    type Err = UnknownKind;

    /// Accepts `rounded-rectangle`, `rounded_rectangle` and
    /// `RoundedRectangle` alike. `elipse` is kept as an alias of `ellipse`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "rectangle" => Ok(Self::Rectangle),
            "ellipse" | "elipse" => Ok(Self::Ellipse),
            "cylinder" => Ok(Self::Cylinder),
            "cloud" => Ok(Self::Cloud),
            "square" => Ok(Self::Square),
            "circle" => Ok(Self::Circle),
            "step" => Ok(Self::Step),
            "actor" => Ok(Self::Actor),
            "text" | "plaintext" => Ok(Self::Text),
            "roundedrectangle" => Ok(Self::RoundedRectangle),
            _ => Err(UnknownKind {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ShapeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ShapeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
