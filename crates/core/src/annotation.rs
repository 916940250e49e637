//! On-frame annotation payloads attached to comments.
//!
//! A comment's type and its payload are one value: point and text comments
//! carry nothing, region comments carry a normalized rectangle, drawing
//! comments carry vector strokes. All coordinates are normalized to `[0, 1]`
//! relative to the frame so they survive resolution changes between versions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of strokes in one drawing.
pub const MAX_STROKES_PER_DRAWING: usize = 50;

/// Maximum stroke width in pixels.
pub const MAX_STROKE_WIDTH: f64 = 20.0;

/// Minimum stroke width in pixels.
pub const MIN_STROKE_WIDTH: f64 = 0.5;

/// Maximum number of path points in a freehand pen stroke.
pub const MAX_PATH_POINTS: usize = 5000;

/// Tolerance for rectangles that touch the frame edge after float rounding.
const EDGE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Drawing tool types
// ---------------------------------------------------------------------------

/// Available drawing tools for on-frame annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingToolType {
    Pen,
    Circle,
    Rectangle,
    Arrow,
    Highlight,
}

/// All valid drawing tool type strings.
const VALID_TOOL_STRINGS: &[&str] = &["pen", "circle", "rectangle", "arrow", "highlight"];

impl DrawingToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Arrow => "arrow",
            Self::Highlight => "highlight",
        }
    }
}

impl FromStr for DrawingToolType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pen" => Ok(Self::Pen),
            "circle" => Ok(Self::Circle),
            "rectangle" => Ok(Self::Rectangle),
            "arrow" => Ok(Self::Arrow),
            "highlight" => Ok(Self::Highlight),
            _ => Err(CoreError::InvalidAnnotation(format!(
                "Invalid drawing tool type '{s}'. Must be one of: {}",
                VALID_TOOL_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// A normalized point on the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A normalized rectangle on the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One vector stroke of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub tool: DrawingToolType,
    pub color: String,
    pub width: f64,
    pub points: Vec<Point>,
}

/// Vector drawing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub strokes: Vec<Stroke>,
}

/// Kind of a comment, derived from its annotation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentType {
    Point,
    Region,
    Drawing,
    Text,
}

/// A comment's type together with the payload that type allows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentAnnotation {
    #[default]
    Point,
    Region(Region),
    Drawing(Drawing),
    Text,
}

impl CommentAnnotation {
    pub fn comment_type(&self) -> CommentType {
        match self {
            Self::Point => CommentType::Point,
            Self::Region(_) => CommentType::Region,
            Self::Drawing(_) => CommentType::Drawing,
            Self::Text => CommentType::Text,
        }
    }

    /// Whether the payload draws something over the frame.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::Region(_) | Self::Drawing(_))
    }

    /// Validate the payload geometry.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Point | Self::Text => Ok(()),
            Self::Region(region) => validate_region(region),
            Self::Drawing(drawing) => validate_drawing(drawing),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

fn validate_unit(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::InvalidAnnotation(format!(
            "{name} must be a finite number"
        )));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::InvalidAnnotation(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a region lies inside the unit square and has a positive area.
pub fn validate_region(region: &Region) -> Result<(), CoreError> {
    validate_unit(region.x, "region x")?;
    validate_unit(region.y, "region y")?;
    validate_unit(region.width, "region width")?;
    validate_unit(region.height, "region height")?;

    if region.width == 0.0 || region.height == 0.0 {
        return Err(CoreError::InvalidAnnotation(
            "region must have a non-zero width and height".to_string(),
        ));
    }
    if region.x + region.width > 1.0 + EDGE_EPSILON
        || region.y + region.height > 1.0 + EDGE_EPSILON
    {
        return Err(CoreError::InvalidAnnotation(
            "region extends past the frame edge".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a stroke width is within the allowed range.
///
/// Must be between [`MIN_STROKE_WIDTH`] and [`MAX_STROKE_WIDTH`] inclusive.
pub fn validate_stroke_width(width: f64) -> Result<(), CoreError> {
    if width.is_nan() || width.is_infinite() {
        return Err(CoreError::InvalidAnnotation(
            "stroke width must be a finite number".to_string(),
        ));
    }
    if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&width) {
        return Err(CoreError::InvalidAnnotation(format!(
            "stroke width must be between {MIN_STROKE_WIDTH} and {MAX_STROKE_WIDTH}, got {width}"
        )));
    }
    Ok(())
}

/// Validate a drawing: stroke count, widths, colors and point coordinates.
pub fn validate_drawing(drawing: &Drawing) -> Result<(), CoreError> {
    if drawing.strokes.is_empty() {
        return Err(CoreError::InvalidAnnotation(
            "drawing must contain at least one stroke".to_string(),
        ));
    }
    if drawing.strokes.len() > MAX_STROKES_PER_DRAWING {
        return Err(CoreError::InvalidAnnotation(format!(
            "drawing has {} strokes, maximum is {MAX_STROKES_PER_DRAWING}",
            drawing.strokes.len()
        )));
    }

    for (i, stroke) in drawing.strokes.iter().enumerate() {
        validate_stroke_width(stroke.width)?;
        validate_color_hex(&stroke.color)?;
        if stroke.points.is_empty() {
            return Err(CoreError::InvalidAnnotation(format!(
                "strokes[{i}] has no points"
            )));
        }
        if stroke.points.len() > MAX_PATH_POINTS {
            return Err(CoreError::InvalidAnnotation(format!(
                "strokes[{i}] has {} points, maximum is {MAX_PATH_POINTS}",
                stroke.points.len()
            )));
        }
        for point in &stroke.points {
            validate_unit(point.x, "point x")?;
            validate_unit(point.y, "point y")?;
        }
    }
    Ok(())
}

/// Validate that a color string matches `#RRGGBB` or `#RRGGBBAA` hex format.
pub fn validate_color_hex(color: &str) -> Result<(), CoreError> {
    let valid_length = color.len() == 7 || color.len() == 9;

    if !valid_length {
        return Err(CoreError::InvalidAnnotation(format!(
            "Invalid color '{color}'. Must be in #RRGGBB or #RRGGBBAA hex format"
        )));
    }

    let Some(hex_part) = color.strip_prefix('#') else {
        return Err(CoreError::InvalidAnnotation(format!(
            "Invalid color '{color}'. Must start with '#'"
        )));
    };

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidAnnotation(format!(
            "Invalid color '{color}'. Must contain only hex digits after '#'"
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
