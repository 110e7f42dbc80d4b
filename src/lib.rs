#![warn(missing_docs)]

//! Typed document model for Tiled TMX maps, TSX tilesets and TX templates.
//!
//! The assembler takes a generic XML element tree ([`Element`]) and returns a
//! fully typed document or the first error it meets. [`Element::parse_str`]
//! is a thin text front-end for callers without their own XML reader.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let text = std::fs::read_to_string("level1.tmx")?;
//! let map = tmx_model::parse_map_str(&text)?;
//! for layer in map.layers_flat() {
//!     println!("{} {}", layer.kind_name(), layer.name());
//! }
//! # Ok(())
//! # }
//! ```

mod color;
mod error;
mod gid;
mod layer;
mod loader {
    pub(crate) mod attrs;
    pub(crate) mod tile_data;
    pub(crate) mod tmx_loader;
}
mod map;
mod object;
mod options;
mod properties;
mod tileset;
mod xml;

pub use color::{ChannelOrder, Color};
pub use error::{Cardinality, MapError, Result};
pub use gid::{Gid, FLIP_D, FLIP_H, FLIP_V, GID_MASK, ROTATE_HEX_120};
pub use layer::{
    Chunk, Compression, DrawOrder, Encoding, GroupLayer, ImageLayer, LayerCommon, LayerNode,
    ObjectGroup, TileLayer, TileLayerData, TileStorage,
};
pub use map::{Map, Orientation, RenderOrder, StaggerAxis, StaggerIndex};
pub use object::{HorizontalAlignment, Object, ObjectShape, Text, VerticalAlignment};
pub use options::ParseOptions;
pub use properties::{Properties, Property, PropertyType, PropertyValue};
pub use tileset::{
    Frame, Grid, Image, ObjectAlignment, Template, Tile, TileOffset, Tileset, TilesetRef,
    WangColor, WangSet, WangSetKind, WangTile,
};
pub use xml::Element;

use loader::tmx_loader;

/// Assembles a `<map>` element with default [`ParseOptions`].
pub fn parse_map(root: &Element) -> Result<Map> {
    parse_map_with(root, &ParseOptions::default())
}

/// Assembles a `<map>` element under the given limits.
pub fn parse_map_with(root: &Element, options: &ParseOptions) -> Result<Map> {
    tmx_loader::load_map(root, options)
}

/// Assembles a standalone `<tileset>` element (a `.tsx` document).
pub fn parse_tileset(root: &Element) -> Result<Tileset> {
    parse_tileset_with(root, &ParseOptions::default())
}

/// Assembles a standalone `<tileset>` element under the given limits.
pub fn parse_tileset_with(root: &Element, options: &ParseOptions) -> Result<Tileset> {
    tmx_loader::load_tileset(root, options)
}

/// Assembles a `<template>` element (a `.tx` document).
pub fn parse_template(root: &Element) -> Result<Template> {
    parse_template_with(root, &ParseOptions::default())
}

/// Assembles a `<template>` element under the given limits.
pub fn parse_template_with(root: &Element, options: &ParseOptions) -> Result<Template> {
    tmx_loader::load_template(root, options)
}

/// Reads and assembles map text with default limits.
pub fn parse_map_str(xml: &str) -> Result<Map> {
    parse_map_str_with(xml, &ParseOptions::default())
}

/// Reads and assembles map text; the limits apply to both steps.
pub fn parse_map_str_with(xml: &str, options: &ParseOptions) -> Result<Map> {
    parse_map_with(&Element::parse_str_with(xml, options)?, options)
}

/// Reads and assembles tileset text with default limits.
pub fn parse_tileset_str(xml: &str) -> Result<Tileset> {
    parse_tileset_str_with(xml, &ParseOptions::default())
}

/// Reads and assembles tileset text; the limits apply to both steps.
pub fn parse_tileset_str_with(xml: &str, options: &ParseOptions) -> Result<Tileset> {
    parse_tileset_with(&Element::parse_str_with(xml, options)?, options)
}

/// Reads and assembles template text with default limits.
pub fn parse_template_str(xml: &str) -> Result<Template> {
    parse_template_str_with(xml, &ParseOptions::default())
}

/// Reads and assembles template text; the limits apply to both steps.
pub fn parse_template_str_with(xml: &str, options: &ParseOptions) -> Result<Template> {
    parse_template_with(&Element::parse_str_with(xml, options)?, options)
}
