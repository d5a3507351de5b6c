//! Anchor grid for positioning text relative to a point

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an anchor code is not part of the grid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown anchor: {0:?}")]
pub struct ParseAnchorError(pub String);

/// Horizontal part of an anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HAlign {
    #[default]
    Left,
    Middle,
    Right,
}

impl HAlign {
    /// X offset that places a box of `width` against the anchor point
    pub fn offset(self, width: f32) -> f32 {
        match self {
            HAlign::Left => 0.0,
            HAlign::Middle => -width / 2.0,
            HAlign::Right => -width,
        }
    }

    fn code(self) -> char {
        match self {
            HAlign::Left => 'l',
            HAlign::Middle => 'm',
            HAlign::Right => 'r',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        match c {
            'l' => Some(HAlign::Left),
            'm' => Some(HAlign::Middle),
            'r' => Some(HAlign::Right),
            _ => None,
        }
    }
}

/// Vertical part of an anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VAlign {
    /// The anchor point sits on the first line's baseline
    #[default]
    Baseline,
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    /// Y offset that places a box of `height` against the anchor point
    pub fn offset(self, height: f32, ascent: f32) -> f32 {
        match self {
            VAlign::Baseline => -ascent,
            VAlign::Top => 0.0,
            VAlign::Middle => -height / 2.0,
            VAlign::Bottom => -height,
        }
    }

    fn code(self) -> char {
        match self {
            VAlign::Baseline => 'a',
            VAlign::Top => 't',
            VAlign::Middle => 'm',
            VAlign::Bottom => 'b',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        match c {
            'a' => Some(VAlign::Baseline),
            't' => Some(VAlign::Top),
            'm' => Some(VAlign::Middle),
            'b' => Some(VAlign::Bottom),
            _ => None,
        }
    }
}

/// Alignment of a field's content relative to its position
///
/// Serialized as a two-letter code: horizontal (`l`, `m`, `r`) followed by
/// vertical (`a` baseline, `t`, `m`, `b`). The grid is 3×4, so `lm` and `rm`
/// exist alongside the historical ten codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Anchor {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Anchor {
    pub const LA: Anchor = Anchor::new(HAlign::Left, VAlign::Baseline);
    pub const LT: Anchor = Anchor::new(HAlign::Left, VAlign::Top);
    pub const LM: Anchor = Anchor::new(HAlign::Left, VAlign::Middle);
    pub const LB: Anchor = Anchor::new(HAlign::Left, VAlign::Bottom);
    pub const MA: Anchor = Anchor::new(HAlign::Middle, VAlign::Baseline);
    pub const MT: Anchor = Anchor::new(HAlign::Middle, VAlign::Top);
    pub const MM: Anchor = Anchor::new(HAlign::Middle, VAlign::Middle);
    pub const MB: Anchor = Anchor::new(HAlign::Middle, VAlign::Bottom);
    pub const RA: Anchor = Anchor::new(HAlign::Right, VAlign::Baseline);
    pub const RT: Anchor = Anchor::new(HAlign::Right, VAlign::Top);
    pub const RM: Anchor = Anchor::new(HAlign::Right, VAlign::Middle);
    pub const RB: Anchor = Anchor::new(HAlign::Right, VAlign::Bottom);

    /// Every anchor in the grid, row by row
    pub const ALL: [Anchor; 12] = [
        Anchor::LA,
        Anchor::LT,
        Anchor::LM,
        Anchor::LB,
        Anchor::MA,
        Anchor::MT,
        Anchor::MM,
        Anchor::MB,
        Anchor::RA,
        Anchor::RT,
        Anchor::RM,
        Anchor::RB,
    ];

    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Two-letter code, e.g. `"mm"`
    pub fn code(self) -> String {
        let mut s = String::with_capacity(2);
        s.push(self.horizontal.code());
        s.push(self.vertical.code());
        s
    }

    /// Offset from the anchor point to the top-left of a `width`×`height` box
    ///
    /// `ascent` is only used for baseline anchors.
    pub fn offset(self, width: f32, height: f32, ascent: f32) -> (f32, f32) {
        (
            self.horizontal.offset(width),
            self.vertical.offset(height, ascent),
        )
    }
}

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(h), Some(v), None) => HAlign::from_code(h).zip(VAlign::from_code(v)),
            _ => None,
        };
        parsed
            .map(|(h, v)| Anchor::new(h, v))
            .ok_or_else(|| ParseAnchorError(s.to_string()))
    }
}

impl TryFrom<String> for Anchor {
    type Error = ParseAnchorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.code()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}
