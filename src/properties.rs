use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Declared type of a custom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// Text.
    String,
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// Boolean.
    Bool,
    /// Color.
    Color,
    /// File path.
    File,
    /// Object reference.
    Object,
    /// Nested class.
    Class,
}

/// Value of a custom property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Text.
    String(String),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// `None` when the property was saved with an empty value (unset color).
    Color(Option<Color>),
    /// Path relative to the document that declares it.
    File(String),
    /// Id of the referenced object, `0` when unset.
    Object(u32),
    /// Members of a class property; only members that were set are present.
    Class(Properties),
}

impl PropertyValue {
    /// Type tag of the value.
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Color(_) => PropertyType::Color,
            PropertyValue::File(_) => PropertyType::File,
            PropertyValue::Object(_) => PropertyType::Object,
            PropertyValue::Class(_) => PropertyType::Class,
        }
    }
}

/// A named custom property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Name of the custom type (`propertytype`), for enum and class properties.
    pub custom_type: Option<String>,
    /// Typed value.
    pub value: PropertyValue,
}

impl Property {
    /// Type tag of the value.
    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }
}

/// Custom properties in document order.
///
/// Names are conventionally unique but the format does not enforce it;
/// lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties(pub Vec<Property>);

impl Properties {
    /// Empty list.
    pub fn new() -> Self {
        Properties(Vec::new())
    }

    /// Appends a property.
    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Properties in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.0.iter()
    }

    /// Value of the first property called `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// `bool` value of `name`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// `int` value of `name`.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// `float` value of `name`.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String-like values: `string` and `file` properties.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) | PropertyValue::File(v) => Some(v),
            _ => None,
        }
    }

    /// Color value of `name`, if set.
    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            PropertyValue::Color(v) => *v,
            _ => None,
        }
    }

    /// Members of class property `name`.
    pub fn get_class(&self, name: &str) -> Option<&Properties> {
        match self.get(name)? {
            PropertyValue::Class(v) => Some(v),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
