use std::{path::PathBuf, str::FromStr};

use crate::{foundation::core::Rgb8, pattern::Pattern};

/// Vertical anchor of the annotation bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAnchor {
    /// Top edge.
    North,
    /// Bottom edge.
    South,
}

/// Horizontal anchor of the annotation text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAnchor {
    /// Left edge.
    West,
    /// Centered.
    Center,
    /// Right edge.
    East,
}

/// Compass-style text location such as `SW`, `NE`, `S` or `N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLocation {
    /// Top or bottom.
    pub vertical: VerticalAnchor,
    /// Left, center or right.
    pub horizontal: HorizontalAnchor,
}

impl Default for TextLocation {
    fn default() -> Self {
        Self {
            vertical: VerticalAnchor::South,
            horizontal: HorizontalAnchor::West,
        }
    }
}

impl FromStr for TextLocation {
    type Err = std::convert::Infallible;

    /// Any string is accepted: `S` anywhere selects the bottom edge (top otherwise), `W` or `E`
    /// select a side and neither means centered.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        let vertical = if s.contains('S') {
            VerticalAnchor::South
        } else {
            VerticalAnchor::North
        };
        let horizontal = if s.contains('W') {
            HorizontalAnchor::West
        } else if s.contains('E') {
            HorizontalAnchor::East
        } else {
            HorizontalAnchor::Center
        };
        Ok(Self {
            vertical,
            horizontal,
        })
    }
}

/// Styling for the text annotation bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSettings {
    /// Where the text and its background bar go.
    pub location: TextLocation,
    /// Font file; `None` uses the built-in cascade.
    pub font: Option<PathBuf>,
    /// Font size in pixels.
    pub font_size: u32,
    /// Text fill color.
    pub text_color: Rgb8,
    /// Background bar color.
    pub bg_color: Rgb8,
    /// Horizontal distance between the text and the image edge.
    pub x_margin: u32,
    /// Vertical padding above and below the text.
    pub y_margin: u32,
    /// When set, the bar only spans the text plus this many pixels each side.
    pub bg_extra_width: Option<u32>,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            location: TextLocation::default(),
            font: None,
            font_size: 12,
            text_color: Rgb8::BLACK,
            bg_color: Rgb8::WHITE,
            x_margin: 10,
            y_margin: 3,
            bg_extra_width: None,
        }
    }
}

/// Text pattern plus styling; composed per output with the relevant tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextAnnotation {
    /// Pattern composed into the annotation string.
    pub pattern: Pattern,
    /// Styling.
    pub settings: TextSettings,
}
