//! Assembly of the typed document model from a generic element tree.
//!
//! Every element is checked against its expected tag, every attribute goes
//! through an explicit required / defaulted / optional policy, and the first
//! violation aborts the whole document.

use crate::color::Color;
use crate::error::{Cardinality, MapError, Result};
use crate::layer::{
    DrawOrder, GroupLayer, ImageLayer, LayerCommon, LayerNode, ObjectGroup, TileLayer,
};
use crate::loader::attrs::{Attrs, FromAttr};
use crate::loader::tile_data::decode_layer_data;
use crate::map::{Map, Orientation, RenderOrder, StaggerIndex};
use crate::object::{HorizontalAlignment, Object, ObjectShape, Text, VerticalAlignment};
use crate::options::ParseOptions;
use crate::properties::{Properties, Property, PropertyType, PropertyValue};
use crate::tileset::{
    Frame, Grid, Image, ObjectAlignment, Template, Tile, TileOffset, Tileset, TilesetRef,
    WangColor, WangSet, WangSetKind, WangTile,
};
use crate::xml::Element;
use tracing::{debug, trace};

const SHAPE_TAGS: &[&str] = &["ellipse", "point", "polygon", "polyline", "text"];

pub(crate) fn load_map(root: &Element, options: &ParseOptions) -> Result<Map> {
    debug!(root = %root.name, "assembling map");
    let map = Assembler::new(options).map(root)?;
    debug!(
        version = %map.version,
        tilesets = map.tilesets.len(),
        layers = map.layers.len(),
        infinite = map.infinite,
        "map assembled"
    );
    Ok(map)
}

pub(crate) fn load_tileset(root: &Element, options: &ParseOptions) -> Result<Tileset> {
    debug!(root = %root.name, "assembling tileset");
    let tileset = Assembler::new(options).tileset(root, None)?;
    debug!(name = %tileset.name, tiles = tileset.tiles.len(), "tileset assembled");
    Ok(tileset)
}

pub(crate) fn load_template(root: &Element, options: &ParseOptions) -> Result<Template> {
    debug!(root = %root.name, "assembling template");
    Assembler::new(options).template(root)
}

fn expect_tag(el: &Element, tag: &'static str) -> Result<()> {
    if el.name == tag {
        Ok(())
    } else {
        Err(MapError::UnexpectedElement {
            expected: tag,
            found: el.name.clone(),
        })
    }
}

fn at_most_one<'a>(el: &'a Element, child: &'static str) -> Result<Option<&'a Element>> {
    let mut matches = el.children_named(child);
    let first = matches.next();
    let rest = matches.count();
    if rest > 0 {
        return Err(MapError::CardinalityViolation {
            element: el.name.clone(),
            child,
            expected: Cardinality::AtMostOne,
            found: rest + 1,
        });
    }
    Ok(first)
}

fn exactly_one<'a>(el: &'a Element, child: &'static str) -> Result<&'a Element> {
    let found = el.children_named(child).count();
    match el.child(child) {
        Some(only) if found == 1 => Ok(only),
        _ => Err(MapError::CardinalityViolation {
            element: el.name.clone(),
            child,
            expected: Cardinality::ExactlyOne,
            found,
        }),
    }
}

/// Per-document state: limits, the map's infinite flag, and the highest ids
/// seen so far (used when the map omits `nextlayerid` / `nextobjectid`).
struct Assembler<'o> {
    options: &'o ParseOptions,
    infinite: bool,
    max_layer_id: u32,
    max_object_id: u32,
}

impl<'o> Assembler<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Assembler {
            options,
            infinite: false,
            max_layer_id: 0,
            max_object_id: 0,
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_nesting_depth {
            return Err(MapError::NestingTooDeep {
                limit: self.options.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn map(&mut self, el: &Element) -> Result<Map> {
        expect_tag(el, "map")?;
        let attrs = Attrs::of(el);

        let version = attrs.required("version")?;
        let tiled_version = attrs.optional("tiledversion")?;
        let class = attrs.optional("class")?;
        let orientation = attrs.required("orientation")?;
        let render_order = attrs.defaulted("renderorder", RenderOrder::RightDown)?;
        let compression_level = attrs.defaulted("compressionlevel", -1)?;
        let width = attrs.required("width")?;
        let height = attrs.required("height")?;
        let tile_width = attrs.required("tilewidth")?;
        let tile_height = attrs.required("tileheight")?;
        let hex_side_length = attrs.optional("hexsidelength")?;
        let stagger_axis = attrs.optional("staggeraxis")?;
        let stagger_index = attrs.defaulted("staggerindex", StaggerIndex::Odd)?;
        let parallax_origin = (
            attrs.defaulted("parallaxoriginx", 0.0)?,
            attrs.defaulted("parallaxoriginy", 0.0)?,
        );
        let background_color = attrs.optional("backgroundcolor")?;
        let next_layer_id: Option<u32> = attrs.optional("nextlayerid")?;
        let next_object_id: Option<u32> = attrs.optional("nextobjectid")?;
        self.infinite = attrs.defaulted("infinite", false)?;

        let properties = self.properties_of(el, 0)?;

        let mut tilesets = Vec::new();
        for ts in el.children_named("tileset") {
            tilesets.push(self.tileset_ref(ts)?);
        }

        let layers = self.layers(el, 0)?;

        Ok(Map {
            version,
            tiled_version,
            class,
            orientation,
            render_order,
            compression_level,
            width,
            height,
            tile_width,
            tile_height,
            hex_side_length,
            stagger_axis,
            stagger_index,
            parallax_origin,
            background_color,
            next_layer_id: next_layer_id.unwrap_or(self.max_layer_id.saturating_add(1)),
            next_object_id: next_object_id.unwrap_or(self.max_object_id.saturating_add(1)),
            infinite: self.infinite,
            properties,
            tilesets,
            layers,
        })
    }

    /// Layer children of `<map>` or `<group>`, in one ordered pass so that
    /// draw order is kept across the different kinds.
    fn layers(&mut self, parent: &Element, depth: usize) -> Result<Vec<LayerNode>> {
        let mut layers = Vec::new();
        for child in &parent.children {
            let node = match child.name.as_str() {
                "layer" => LayerNode::Tiles(self.tile_layer(child)?),
                "objectgroup" => LayerNode::Objects(self.object_group(child, true)?),
                "imagelayer" => LayerNode::Image(self.image_layer(child)?),
                "group" => LayerNode::Group(self.group(child, depth + 1)?),
                _ => continue,
            };
            trace!(kind = node.kind_name(), id = node.id(), name = node.name(), depth, "layer");
            layers.push(node);
        }
        Ok(layers)
    }

    fn layer_common(&mut self, el: &Element, in_map: bool) -> Result<LayerCommon> {
        let attrs = Attrs::of(el);
        let id = if in_map {
            let id: u32 = attrs.required("id")?;
            self.max_layer_id = self.max_layer_id.max(id);
            id
        } else {
            attrs.defaulted("id", 0)?
        };

        Ok(LayerCommon {
            id,
            name: attrs.defaulted("name", String::new())?,
            class: attrs.optional("class")?,
            offset: (
                attrs.defaulted("offsetx", 0.0)?,
                attrs.defaulted("offsety", 0.0)?,
            ),
            opacity: attrs.defaulted("opacity", 1.0)?,
            visible: attrs.defaulted("visible", true)?,
            locked: attrs.defaulted("locked", false)?,
            tint_color: attrs.optional("tintcolor")?,
            parallax: (
                attrs.defaulted("parallaxx", 1.0)?,
                attrs.defaulted("parallaxy", 1.0)?,
            ),
            properties: self.properties_of(el, 0)?,
        })
    }

    fn tile_layer(&mut self, el: &Element) -> Result<TileLayer> {
        expect_tag(el, "layer")?;
        let common = self.layer_common(el, true)?;
        let attrs = Attrs::of(el);
        let width = attrs.required("width")?;
        let height = attrs.required("height")?;
        let data = exactly_one(el, "data")?;
        let data = decode_layer_data(data, width, height, self.infinite, self.options)?;
        Ok(TileLayer {
            common,
            width,
            height,
            data,
        })
    }

    fn group(&mut self, el: &Element, depth: usize) -> Result<GroupLayer> {
        expect_tag(el, "group")?;
        self.check_depth(depth)?;
        let common = self.layer_common(el, true)?;
        let children = self.layers(el, depth)?;
        Ok(GroupLayer { common, children })
    }

    fn image_layer(&mut self, el: &Element) -> Result<ImageLayer> {
        expect_tag(el, "imagelayer")?;
        let common = self.layer_common(el, true)?;
        let attrs = Attrs::of(el);
        let image = at_most_one(el, "image")?.map(image).transpose()?;
        Ok(ImageLayer {
            common,
            image,
            repeat_x: attrs.defaulted("repeatx", false)?,
            repeat_y: attrs.defaulted("repeaty", false)?,
        })
    }

    /// `in_map` is false for the collision group of a tile, whose id is
    /// local to the tileset and may be absent.
    fn object_group(&mut self, el: &Element, in_map: bool) -> Result<ObjectGroup> {
        expect_tag(el, "objectgroup")?;
        let common = self.layer_common(el, in_map)?;
        let attrs = Attrs::of(el);
        let draw_order = attrs.defaulted("draworder", DrawOrder::Index)?;
        let color = attrs.optional("color")?;

        let mut objects = Vec::new();
        for o in el.children_named("object") {
            let object = self.object(o)?;
            if in_map {
                self.max_object_id = self.max_object_id.max(object.id);
            }
            objects.push(object);
        }

        Ok(ObjectGroup {
            common,
            draw_order,
            color,
            objects,
        })
    }

    fn object(&mut self, el: &Element) -> Result<Object> {
        expect_tag(el, "object")?;
        let attrs = Attrs::of(el);

        // `type` was renamed to `class` in Tiled 1.9
        let class_name = match attrs.optional("class")? {
            Some(class) => class,
            None => attrs.defaulted("type", String::new())?,
        };
        let gid: Option<u32> = attrs.optional("gid")?;

        Ok(Object {
            id: attrs.defaulted("id", 0)?,
            name: attrs.defaulted("name", String::new())?,
            class_name,
            x: attrs.defaulted("x", 0.0)?,
            y: attrs.defaulted("y", 0.0)?,
            width: attrs.defaulted("width", 0.0)?,
            height: attrs.defaulted("height", 0.0)?,
            rotation: attrs.defaulted("rotation", 0.0)?,
            visible: attrs.defaulted("visible", true)?,
            template: attrs.optional("template")?,
            shape: object_shape(el, gid)?,
            properties: self.properties_of(el, 0)?,
        })
    }

    fn tileset_ref(&mut self, el: &Element) -> Result<TilesetRef> {
        expect_tag(el, "tileset")?;
        let attrs = Attrs::of(el);
        // gid 0 is the empty cell and can never start a tileset
        let first_gid = attrs.required_with("firstgid", |raw| {
            u32::from_attr(raw).filter(|&gid| gid > 0)
        })?;

        if let Some(source) = attrs.optional("source")? {
            trace!(first_gid, %source, "external tileset");
            return Ok(TilesetRef::External { first_gid, source });
        }
        Ok(TilesetRef::Embedded(self.tileset(el, Some(first_gid))?))
    }

    fn tileset(&mut self, el: &Element, first_gid: Option<u32>) -> Result<Tileset> {
        expect_tag(el, "tileset")?;
        let attrs = Attrs::of(el);

        let name: String = attrs.required("name")?;
        let tile_offset = at_most_one(el, "tileoffset")?
            .map(|off| -> Result<TileOffset> {
                let attrs = Attrs::of(off);
                Ok(TileOffset {
                    x: attrs.defaulted("x", 0)?,
                    y: attrs.defaulted("y", 0)?,
                })
            })
            .transpose()?;
        let grid = at_most_one(el, "grid")?
            .map(|grid| -> Result<Grid> {
                let attrs = Attrs::of(grid);
                Ok(Grid {
                    orientation: attrs.defaulted("orientation", Orientation::Orthogonal)?,
                    width: attrs.required("width")?,
                    height: attrs.required("height")?,
                })
            })
            .transpose()?;

        let mut tiles = Vec::new();
        for t in el.children_named("tile") {
            tiles.push(self.tile(t)?);
        }

        let mut wang_sets = Vec::new();
        if let Some(sets) = at_most_one(el, "wangsets")? {
            for set in sets.children_named("wangset") {
                wang_sets.push(self.wang_set(set)?);
            }
        }

        trace!(%name, ?first_gid, tiles = tiles.len(), "tileset");
        Ok(Tileset {
            first_gid,
            name,
            class: attrs.optional("class")?,
            tile_width: attrs.required("tilewidth")?,
            tile_height: attrs.required("tileheight")?,
            spacing: attrs.defaulted("spacing", 0)?,
            margin: attrs.defaulted("margin", 0)?,
            tile_count: attrs.required("tilecount")?,
            columns: attrs.required("columns")?,
            object_alignment: attrs.defaulted("objectalignment", ObjectAlignment::Unspecified)?,
            image: at_most_one(el, "image")?.map(image).transpose()?,
            tile_offset,
            grid,
            properties: self.properties_of(el, 0)?,
            tiles,
            wang_sets,
        })
    }

    fn tile(&mut self, el: &Element) -> Result<Tile> {
        expect_tag(el, "tile")?;
        let attrs = Attrs::of(el);
        let class = match attrs.optional("class")? {
            Some(class) => Some(class),
            None => attrs.optional("type")?,
        };

        let collision = at_most_one(el, "objectgroup")?
            .map(|group| self.object_group(group, false))
            .transpose()?;

        let mut animation = Vec::new();
        if let Some(anim) = at_most_one(el, "animation")? {
            for frame in anim.children_named("frame") {
                let attrs = Attrs::of(frame);
                animation.push(Frame {
                    tile_id: attrs.required("tileid")?,
                    duration_ms: attrs.required("duration")?,
                });
            }
        }

        Ok(Tile {
            id: attrs.required("id")?,
            class,
            probability: attrs.defaulted("probability", 0.0)?,
            properties: self.properties_of(el, 0)?,
            image: at_most_one(el, "image")?.map(image).transpose()?,
            collision,
            animation,
        })
    }

    fn wang_set(&mut self, el: &Element) -> Result<WangSet> {
        expect_tag(el, "wangset")?;
        let attrs = Attrs::of(el);

        let mut colors = Vec::new();
        for c in el.children_named("wangcolor") {
            let attrs = Attrs::of(c);
            colors.push(WangColor {
                name: attrs.required("name")?,
                class: attrs.optional("class")?,
                color: attrs.required("color")?,
                tile: attrs.defaulted("tile", -1)?,
                probability: attrs.defaulted("probability", 0.0)?,
                properties: self.properties_of(c, 0)?,
            });
        }

        let mut tiles = Vec::new();
        for t in el.children_named("wangtile") {
            let attrs = Attrs::of(t);
            tiles.push(WangTile {
                tile_id: attrs.required("tileid")?,
                wang_id: attrs.required_with("wangid", parse_wang_id)?,
            });
        }

        Ok(WangSet {
            name: attrs.required("name")?,
            class: attrs.optional("class")?,
            kind: attrs.defaulted("type", WangSetKind::Corner)?,
            tile: attrs.defaulted("tile", -1)?,
            properties: self.properties_of(el, 0)?,
            colors,
            tiles,
        })
    }

    fn template(&mut self, el: &Element) -> Result<Template> {
        expect_tag(el, "template")?;
        let tileset = at_most_one(el, "tileset")?
            .map(|ts| self.tileset_ref(ts))
            .transpose()?;
        let object = self.object(exactly_one(el, "object")?)?;
        Ok(Template { tileset, object })
    }

    /// The optional `<properties>` child of `el`; empty when absent.
    fn properties_of(&mut self, el: &Element, depth: usize) -> Result<Properties> {
        match at_most_one(el, "properties")? {
            Some(props) => self.properties(props, depth),
            None => Ok(Properties::new()),
        }
    }

    fn properties(&mut self, el: &Element, depth: usize) -> Result<Properties> {
        expect_tag(el, "properties")?;
        self.check_depth(depth)?;
        let mut properties = Properties::new();
        for p in el.children_named("property") {
            properties.push(self.property(p, depth)?);
        }
        Ok(properties)
    }

    fn property(&mut self, el: &Element, depth: usize) -> Result<Property> {
        expect_tag(el, "property")?;
        let attrs = Attrs::of(el);
        let name = attrs.required("name")?;
        let custom_type = attrs.optional("propertytype")?;

        let value = match attrs.defaulted("type", PropertyType::String)? {
            // multi-line strings are written as character data
            PropertyType::String => PropertyValue::String(match attrs.optional("value")? {
                Some(value) => value,
                None => el.text.clone(),
            }),
            PropertyType::Int => PropertyValue::Int(attrs.defaulted("value", 0)?),
            PropertyType::Float => PropertyValue::Float(attrs.defaulted("value", 0.0)?),
            PropertyType::Bool => PropertyValue::Bool(attrs.defaulted("value", false)?),
            PropertyType::Color => {
                PropertyValue::Color(attrs.defaulted_with("value", parse_property_color, None)?)
            }
            PropertyType::File => PropertyValue::File(attrs.defaulted("value", String::new())?),
            PropertyType::Object => PropertyValue::Object(attrs.defaulted("value", 0)?),
            PropertyType::Class => PropertyValue::Class(self.properties_of(el, depth + 1)?),
        };

        Ok(Property {
            name,
            custom_type,
            value,
        })
    }
}

fn image(el: &Element) -> Result<Image> {
    expect_tag(el, "image")?;
    let attrs = Attrs::of(el);
    Ok(Image {
        source: attrs.optional("source")?,
        format: attrs.optional("format")?,
        // `trans` is written without alpha, most often without the `#`
        trans: attrs.optional_with("trans", |raw| Color::from_hex_rgba(raw).ok())?,
        width: attrs.optional("width")?,
        height: attrs.optional("height")?,
    })
}

fn object_shape(el: &Element, gid: Option<u32>) -> Result<ObjectShape> {
    let mut shapes = el
        .children
        .iter()
        .filter(|c| SHAPE_TAGS.contains(&c.name.as_str()));
    let Some(shape) = shapes.next() else {
        return Ok(match gid {
            Some(gid) => ObjectShape::Tile { gid },
            None => ObjectShape::Rectangle,
        });
    };
    let extra = shapes.count();
    if extra > 0 {
        return Err(MapError::CardinalityViolation {
            element: el.name.clone(),
            child: "ellipse|point|polygon|polyline|text",
            expected: Cardinality::AtMostOne,
            found: extra + 1,
        });
    }

    Ok(match shape.name.as_str() {
        "ellipse" => ObjectShape::Ellipse,
        "point" => ObjectShape::Point,
        "polygon" => ObjectShape::Polygon(Attrs::of(shape).required_with("points", parse_points)?),
        "polyline" => ObjectShape::Polyline(Attrs::of(shape).required_with("points", parse_points)?),
        _ => ObjectShape::Text(text(shape)?),
    })
}

fn text(el: &Element) -> Result<Text> {
    expect_tag(el, "text")?;
    let attrs = Attrs::of(el);
    Ok(Text {
        font_family: attrs.defaulted("fontfamily", "sans-serif".to_string())?,
        pixel_size: attrs.defaulted("pixelsize", 16)?,
        wrap: attrs.defaulted("wrap", false)?,
        color: attrs.defaulted("color", Color::new(0xff, 0, 0, 0))?,
        bold: attrs.defaulted("bold", false)?,
        italic: attrs.defaulted("italic", false)?,
        underline: attrs.defaulted("underline", false)?,
        strikeout: attrs.defaulted("strikeout", false)?,
        kerning: attrs.defaulted("kerning", true)?,
        halign: attrs.defaulted("halign", HorizontalAlignment::Left)?,
        valign: attrs.defaulted("valign", VerticalAlignment::Top)?,
        contents: el.text.clone(),
    })
}

/// `"x1,y1 x2,y2 ..."` relative to the object position.
fn parse_points(raw: &str) -> Option<Vec<(f32, f32)>> {
    raw.split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',')?;
            Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
        })
        .collect()
}

/// Eight comma-separated color indexes.
fn parse_wang_id(raw: &str) -> Option<[u8; 8]> {
    let mut id = [0u8; 8];
    let mut parts = raw.split(',');
    for slot in id.iter_mut() {
        *slot = u8::try_from(u32::from_attr(parts.next()?.trim())?).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(id)
}

/// An empty value is an unset color.
fn parse_property_color(raw: &str) -> Option<Option<Color>> {
    if raw.is_empty() {
        return Some(None);
    }
    Color::from_hex_argb(raw).ok().map(Some)
}
