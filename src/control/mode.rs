use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How atoms are colored in the viewer.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ColoringMode {
    /// Engine default coloring (by element / structure).
    Structure,
    /// Charges mapped onto a per-structure automatic scale.
    #[default]
    ChargesRelative,
    /// Charges mapped onto a fixed scale bounded by the max value.
    ChargesAbsolute,
}

impl ColoringMode {
    /// All modes in display order.
    pub const ALL: [Self; 3] =
        [Self::Structure, Self::ChargesRelative, Self::ChargesAbsolute];

    /// Wire name used by UI actions and option files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::ChargesRelative => "charges-relative",
            Self::ChargesAbsolute => "charges-absolute",
        }
    }

    /// Human-readable label for select widgets.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::ChargesRelative => "Charges (relative)",
            Self::ChargesAbsolute => "Charges (absolute)",
        }
    }

    /// Whether the max value scale feeds into this mode.
    #[must_use]
    pub fn uses_max_value(self) -> bool {
        self == Self::ChargesAbsolute
    }
}

/// Molecular representation used by the viewer.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStyle {
    /// Atoms as spheres, bonds as sticks.
    #[default]
    BallsAndSticks,
    /// The engine's default polymer representation (secondary structure).
    Cartoon,
    /// Molecular surface.
    Surface,
}

impl RenderStyle {
    /// All styles in display order.
    pub const ALL: [Self; 3] =
        [Self::Cartoon, Self::BallsAndSticks, Self::Surface];

    /// Wire name used by UI actions and option files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BallsAndSticks => "balls-and-sticks",
            Self::Cartoon => "cartoon",
            Self::Surface => "surface",
        }
    }

    /// Human-readable label for select widgets.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BallsAndSticks => "Balls and Sticks",
            Self::Cartoon => "Cartoon",
            Self::Surface => "Surface",
        }
    }
}

/// A control value that does not name any known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    /// Which control dimension was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for ColoringMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseModeError {
                kind: "coloring mode",
                value: s.to_owned(),
            })
    }
}

impl FromStr for RenderStyle {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| ParseModeError {
                kind: "render style",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for ColoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
