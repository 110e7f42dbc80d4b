//! Typed attribute lookup with explicit required / defaulted / optional policies.

use crate::color::Color;
use crate::error::{MapError, Result};
use crate::layer::{Compression, DrawOrder, Encoding};
use crate::map::{Orientation, RenderOrder, StaggerAxis, StaggerIndex};
use crate::object::{HorizontalAlignment, VerticalAlignment};
use crate::properties::PropertyType;
use crate::tileset::{ObjectAlignment, WangSetKind};
use crate::xml::Element;

/// Default parse function of an attribute type.
pub(crate) trait FromAttr: Sized {
    fn from_attr(raw: &str) -> Option<Self>;
}

impl FromAttr for String {
    fn from_attr(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

// Integers are plain base-10 digits; `str::parse` alone would also take a `+` sign.
fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

impl FromAttr for u32 {
    fn from_attr(raw: &str) -> Option<Self> {
        is_digits(raw).then(|| raw.parse().ok()).flatten()
    }
}

macro_rules! from_attr_signed {
    ($($ty:ty),*) => {
        $(impl FromAttr for $ty {
            fn from_attr(raw: &str) -> Option<Self> {
                is_digits(raw.strip_prefix('-').unwrap_or(raw))
                    .then(|| raw.parse().ok())
                    .flatten()
            }
        })*
    };
}

from_attr_signed!(i32, i64);

macro_rules! from_attr_via_parse {
    ($($ty:ty),*) => {
        $(impl FromAttr for $ty {
            fn from_attr(raw: &str) -> Option<Self> {
                raw.parse().ok()
            }
        })*
    };
}

from_attr_via_parse!(f32, f64);

impl FromAttr for bool {
    fn from_attr(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(true),
            "0" => Some(false),
            _ if raw.eq_ignore_ascii_case("true") => Some(true),
            _ if raw.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

/// Attribute colors are `#AARRGGBB` family literals.
impl FromAttr for Color {
    fn from_attr(raw: &str) -> Option<Self> {
        Color::from_hex_argb(raw).ok()
    }
}

// Enumeration literals match case-insensitively, with `-` read as `_`.
macro_rules! attr_enum {
    ($ty:ty { $($lit:literal => $variant:expr),+ $(,)? }) => {
        impl FromAttr for $ty {
            fn from_attr(raw: &str) -> Option<Self> {
                const TABLE: &[(&str, $ty)] = &[$(($lit, $variant)),+];
                let key = raw.to_ascii_lowercase().replace('-', "_");
                TABLE.iter().find(|(lit, _)| *lit == key).map(|(_, v)| *v)
            }
        }
    };
}

attr_enum!(Orientation {
    "orthogonal" => Orientation::Orthogonal,
    "isometric" => Orientation::Isometric,
    "staggered" => Orientation::Staggered,
    "hexagonal" => Orientation::Hexagonal,
});

attr_enum!(RenderOrder {
    "right_down" => RenderOrder::RightDown,
    "right_up" => RenderOrder::RightUp,
    "left_down" => RenderOrder::LeftDown,
    "left_up" => RenderOrder::LeftUp,
});

attr_enum!(StaggerAxis {
    "x" => StaggerAxis::X,
    "y" => StaggerAxis::Y,
});

attr_enum!(StaggerIndex {
    "odd" => StaggerIndex::Odd,
    "even" => StaggerIndex::Even,
});

attr_enum!(DrawOrder {
    "index" => DrawOrder::Index,
    "topdown" => DrawOrder::TopDown,
});

attr_enum!(Encoding {
    "csv" => Encoding::Csv,
    "base64" => Encoding::Base64,
});

attr_enum!(Compression {
    "gzip" => Compression::Gzip,
    "zlib" => Compression::Zlib,
    "zstd" => Compression::Zstd,
});

attr_enum!(ObjectAlignment {
    "unspecified" => ObjectAlignment::Unspecified,
    "topleft" => ObjectAlignment::TopLeft,
    "top" => ObjectAlignment::Top,
    "topright" => ObjectAlignment::TopRight,
    "left" => ObjectAlignment::Left,
    "center" => ObjectAlignment::Center,
    "right" => ObjectAlignment::Right,
    "bottomleft" => ObjectAlignment::BottomLeft,
    "bottom" => ObjectAlignment::Bottom,
    "bottomright" => ObjectAlignment::BottomRight,
});

attr_enum!(HorizontalAlignment {
    "left" => HorizontalAlignment::Left,
    "center" => HorizontalAlignment::Center,
    "right" => HorizontalAlignment::Right,
    "justify" => HorizontalAlignment::Justify,
});

attr_enum!(VerticalAlignment {
    "top" => VerticalAlignment::Top,
    "center" => VerticalAlignment::Center,
    "bottom" => VerticalAlignment::Bottom,
});

attr_enum!(WangSetKind {
    "corner" => WangSetKind::Corner,
    "edge" => WangSetKind::Edge,
    "mixed" => WangSetKind::Mixed,
});

attr_enum!(PropertyType {
    "string" => PropertyType::String,
    "int" => PropertyType::Int,
    "float" => PropertyType::Float,
    "bool" => PropertyType::Bool,
    "color" => PropertyType::Color,
    "file" => PropertyType::File,
    "object" => PropertyType::Object,
    "class" => PropertyType::Class,
});

/// Attribute view of one element; errors name the element and attribute.
pub(crate) struct Attrs<'a> {
    el: &'a Element,
}

impl<'a> Attrs<'a> {
    pub fn of(el: &'a Element) -> Self {
        Attrs { el }
    }

    fn malformed(&self, name: &'static str, raw: &str) -> MapError {
        MapError::MalformedAttribute {
            element: self.el.name.clone(),
            attribute: name,
            raw_text: raw.to_string(),
        }
    }

    pub fn required_with<T>(&self, name: &'static str, parse: impl FnOnce(&str) -> Option<T>) -> Result<T> {
        let raw = self.el.attr(name).ok_or_else(|| MapError::MissingAttribute {
            element: self.el.name.clone(),
            attribute: name,
        })?;
        parse(raw).ok_or_else(|| self.malformed(name, raw))
    }

    pub fn defaulted_with<T>(
        &self,
        name: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
        default: T,
    ) -> Result<T> {
        Ok(self.optional_with(name, parse)?.unwrap_or(default))
    }

    pub fn optional_with<T>(&self, name: &'static str, parse: impl FnOnce(&str) -> Option<T>) -> Result<Option<T>> {
        match self.el.attr(name) {
            None => Ok(None),
            Some(raw) => parse(raw).map(Some).ok_or_else(|| self.malformed(name, raw)),
        }
    }

    pub fn required<T: FromAttr>(&self, name: &'static str) -> Result<T> {
        self.required_with(name, T::from_attr)
    }

    pub fn defaulted<T: FromAttr>(&self, name: &'static str, default: T) -> Result<T> {
        self.defaulted_with(name, T::from_attr, default)
    }

    pub fn optional<T: FromAttr>(&self, name: &'static str) -> Result<Option<T>> {
        self.optional_with(name, T::from_attr)
    }
}
