use crate::color::Color;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// A placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Unique id within the map, `0` when absent.
    pub id: u32,
    /// Object name.
    pub name: String,
    /// `class` attribute, or the pre-1.9 `type` attribute.
    pub class_name: String,
    /// X position in pixels.
    pub x: f32,
    /// Y position in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Degrees clockwise around `(x, y)`.
    pub rotation: f32,
    /// Whether the object is shown.
    pub visible: bool,
    /// Path of the template this object instantiates.
    pub template: Option<String>,
    /// Geometry.
    pub shape: ObjectShape,
    /// Custom properties.
    pub properties: Properties,
}

impl Object {
    /// Raw gid of a tile object, flip flags included.
    pub fn gid(&self) -> Option<u32> {
        match self.shape {
            ObjectShape::Tile { gid } => Some(gid),
            _ => None,
        }
    }
}

/// Geometry of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectShape {
    /// Axis-aligned box.
    Rectangle,
    /// Ellipse inscribed in the box.
    Ellipse,
    /// Single point.
    Point,
    /// Points are relative to the object position.
    Polygon(Vec<(f32, f32)>),
    /// Open path, points relative to the object position.
    Polyline(Vec<(f32, f32)>),
    /// Text box.
    Text(Text),
    /// A tile drawn at the object's position.
    Tile {
        /// Raw gid, flip flags included.
        gid: u32,
    },
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    /// Left.
    Left,
    /// Centered.
    Center,
    /// Right.
    Right,
    /// Justified.
    Justify,
}

/// Vertical text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalAlignment {
    /// Top.
    Top,
    /// Centered.
    Center,
    /// Bottom.
    Bottom,
}

/// Text object settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Font family.
    pub font_family: String,
    /// Font size in pixels.
    pub pixel_size: u32,
    /// Word wrapping.
    pub wrap: bool,
    /// Text color.
    pub color: Color,
    /// Bold.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Struck out.
    pub strikeout: bool,
    /// Kerning.
    pub kerning: bool,
    /// Horizontal alignment.
    pub halign: HorizontalAlignment,
    /// Vertical alignment.
    pub valign: VerticalAlignment,
    /// Text content.
    pub contents: String,
}
