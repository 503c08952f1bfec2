use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{BBox, Point};
use crate::style::Color;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Unknown {kind} type '{value}'")]
    UnknownAlignment { kind: &'static str, value: String },
}

/// Horizontal anchoring of a widget on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Right,
    Center,
    /// Use the widget's absolute `position_x`.
    Position,
}

/// Vertical anchoring of a widget on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Bottom,
    Center,
    /// Use the widget's absolute `position_y`.
    Position,
}

impl FromStr for HorizontalAlignment {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            "position" => Ok(Self::Position),
            _ => Err(WidgetError::UnknownAlignment {
                kind: "HorizontalAlignment",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for VerticalAlignment {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "center" => Ok(Self::Center),
            "position" => Ok(Self::Position),
            _ => Err(WidgetError::UnknownAlignment {
                kind: "VerticalAlignment",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for HorizontalAlignment {
    type Error = WidgetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for VerticalAlignment {
    type Error = WidgetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for HorizontalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Center => "Center",
            Self::Position => "Position",
        };
        f.write_str(name)
    }
}

impl fmt::Display for VerticalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::Center => "Center",
            Self::Position => "Position",
        };
        f.write_str(name)
    }
}

impl From<HorizontalAlignment> for String {
    fn from(value: HorizontalAlignment) -> Self {
        value.to_string()
    }
}

impl From<VerticalAlignment> for String {
    fn from(value: VerticalAlignment) -> Self {
        value.to_string()
    }
}

/// A clickable text label drawn on top of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperlink {
    pub text: String,
    pub url: Option<String>,
    pub text_color: Color,
    pub back_color: Color,
    pub text_size: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub corner_radius: f32,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub position_x: f64,
    pub position_y: f64,
    /// Screen rectangle occupied by the last draw, used for hit testing.
    #[serde(skip)]
    pub envelope: Option<BBox>,
}

impl Default for Hyperlink {
    fn default() -> Self {
        Self {
            text: String::new(),
            url: None,
            text_color: Color::BLACK,
            back_color: Color::WHITE,
            text_size: 12.0,
            padding_x: 3.0,
            padding_y: 1.0,
            margin_x: 2.0,
            margin_y: 2.0,
            corner_radius: 4.0,
            horizontal_alignment: HorizontalAlignment::Right,
            vertical_alignment: VerticalAlignment::Bottom,
            position_x: 0.0,
            position_y: 0.0,
            envelope: None,
        }
    }
}

impl Hyperlink {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_alignment(mut self, horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position_x = x;
        self.position_y = y;
        self
    }

    /// Whether `point` (screen pixels) falls inside the last drawn envelope.
    pub fn hit_test(&self, point: &Point) -> bool {
        self.envelope.is_some_and(|env| env.contains_point(point))
    }
}

/// Url of the topmost hyperlink under `point`. Later widgets are drawn on top.
pub fn touched_url<'a>(widgets: &'a [Hyperlink], point: &Point) -> Option<&'a str> {
    widgets
        .iter()
        .rev()
        .find(|w| w.hit_test(point))
        .and_then(|w| w.url.as_deref())
}
