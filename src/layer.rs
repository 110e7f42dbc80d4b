use crate::color::Color;
use crate::object::Object;
use crate::properties::Properties;
use crate::tileset::Image;
use serde::{Deserialize, Serialize};

/// Attributes shared by every kind of layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerCommon {
    /// Unique id within the map (`0` for a tile collision group).
    pub id: u32,
    /// Layer name, empty by default.
    pub name: String,
    /// User-defined class.
    pub class: Option<String>,
    /// Pixel offset `(x, y)`.
    pub offset: (f32, f32),
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Whether the layer is shown.
    pub visible: bool,
    /// Whether the layer is locked in the editor.
    pub locked: bool,
    /// Color multiplied with the layer's pixels.
    pub tint_color: Option<Color>,
    /// Parallax scroll factor `(x, y)`.
    pub parallax: (f32, f32),
    /// Custom properties.
    pub properties: Properties,
}

/// One node of the layer tree.
///
/// Siblings keep document order, which is also their draw order across
/// the different kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerNode {
    /// A tile layer (`<layer>`).
    Tiles(TileLayer),
    /// An object group (`<objectgroup>`).
    Objects(ObjectGroup),
    /// An image layer (`<imagelayer>`).
    Image(ImageLayer),
    /// A group layer (`<group>`).
    Group(GroupLayer),
}

impl LayerNode {
    /// Attributes shared by every kind.
    pub fn common(&self) -> &LayerCommon {
        match self {
            LayerNode::Tiles(l) => &l.common,
            LayerNode::Objects(l) => &l.common,
            LayerNode::Image(l) => &l.common,
            LayerNode::Group(l) => &l.common,
        }
    }

    /// The TMX tag this node was read from.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerNode::Tiles(_) => "layer",
            LayerNode::Objects(_) => "objectgroup",
            LayerNode::Image(_) => "imagelayer",
            LayerNode::Group(_) => "group",
        }
    }

    /// Layer id.
    pub fn id(&self) -> u32 {
        self.common().id
    }

    /// Layer name.
    pub fn name(&self) -> &str {
        &self.common().name
    }
}

/// A grid of tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Shared layer attributes.
    pub common: LayerCommon,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Decoded tile data.
    pub data: TileLayerData,
}

/// Text encoding of a `<data>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// One `<tile>` child element per cell.
    None,
    /// Comma separated gids.
    Csv,
    /// Little-endian `u32` gids in base64.
    Base64,
}

/// Compression of base64 tile data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compression {
    /// Uncompressed.
    None,
    /// gzip stream.
    Gzip,
    /// zlib stream.
    Zlib,
    /// Zstandard frame.
    Zstd,
}

impl Compression {
    /// Literal used in the `compression` attribute.
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
            Compression::Zstd => "zstd",
        }
    }
}

/// Tile data of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerData {
    /// Encoding the data was read with.
    pub encoding: Encoding,
    /// Compression the data was read with.
    pub compression: Compression,
    /// Character data of the `<data>` element as written.
    pub raw: String,
    /// Decoded gids.
    pub tiles: TileStorage,
}

impl TileLayerData {
    /// Number of cells across all storage, empty cells included.
    pub fn tile_count(&self) -> usize {
        match &self.tiles {
            TileStorage::Finite(gids) => gids.len(),
            TileStorage::Chunks(chunks) => chunks.iter().map(|c| c.gids.len()).sum(),
        }
    }
}

/// Decoded cells of a tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileStorage {
    /// Row-major gids of a fixed-size layer.
    Finite(Vec<u32>),
    /// Sparse storage of an infinite map.
    Chunks(Vec<Chunk>),
}

/// One rectangular block of an infinite layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Left edge in tiles.
    pub x: i32,
    /// Top edge in tiles.
    pub y: i32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Row-major gids, `width * height` of them.
    pub gids: Vec<u32>,
}

impl Chunk {
    /// Gid at chunk-local `(col, row)`.
    pub fn get(&self, col: u32, row: u32) -> Option<u32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.gids.get((row * self.width + col) as usize).copied()
    }
}

/// Whether objects are drawn in document order or sorted by y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawOrder {
    /// Document order.
    Index,
    /// Sorted by y coordinate.
    TopDown,
}

/// A layer of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGroup {
    /// Shared layer attributes.
    pub common: LayerCommon,
    /// Drawing order of the objects.
    pub draw_order: DrawOrder,
    /// Display color of the objects in the editor.
    pub color: Option<Color>,
    /// Objects in document order.
    pub objects: Vec<Object>,
}

/// A layer showing a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    /// Shared layer attributes.
    pub common: LayerCommon,
    /// The image, if set.
    pub image: Option<Image>,
    /// Repeat along x.
    pub repeat_x: bool,
    /// Repeat along y.
    pub repeat_y: bool,
}

/// A layer containing other layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLayer {
    /// Shared layer attributes.
    pub common: LayerCommon,
    /// Child layers in draw order.
    pub children: Vec<LayerNode>,
}
