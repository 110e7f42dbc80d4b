use crate::color::Color;
use crate::layer::ObjectGroup;
use crate::map::Orientation;
use crate::object::Object;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// A tileset entry of a map, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TilesetRef {
    /// Inline `<tileset>`; its `first_gid` is always set.
    Embedded(Tileset),
    /// `<tileset firstgid=".." source=".."/>` pointing at a `.tsx` file.
    External {
        /// First gid owned by the referenced tileset.
        first_gid: u32,
        /// Path of the `.tsx` file, relative to the map.
        source: String,
    },
}

impl TilesetRef {
    /// First gid owned by the tileset.
    pub fn first_gid(&self) -> u32 {
        match self {
            TilesetRef::Embedded(ts) => ts.first_gid.unwrap_or(1),
            TilesetRef::External { first_gid, .. } => *first_gid,
        }
    }

    /// The inline tileset, if this is one.
    pub fn embedded(&self) -> Option<&Tileset> {
        match self {
            TilesetRef::Embedded(ts) => Some(ts),
            TilesetRef::External { .. } => None,
        }
    }
}

/// Alignment of tile objects relative to their position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectAlignment {
    /// Bottom-left on orthogonal maps, bottom on isometric ones.
    Unspecified,
    /// Top left.
    TopLeft,
    /// Top.
    Top,
    /// Top right.
    TopRight,
    /// Left.
    Left,
    /// Center.
    Center,
    /// Right.
    Right,
    /// Bottom left.
    BottomLeft,
    /// Bottom.
    Bottom,
    /// Bottom right.
    BottomRight,
}

/// A tileset, embedded in a map or standalone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    /// Map-local first gid; `None` for a standalone `.tsx` document.
    pub first_gid: Option<u32>,
    /// Tileset name.
    pub name: String,
    /// User-defined class.
    pub class: Option<String>,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Pixels between tiles in the image.
    pub spacing: u32,
    /// Pixels around the tiles in the image.
    pub margin: u32,
    /// Number of tiles.
    pub tile_count: u32,
    /// Tiles per image row.
    pub columns: u32,
    /// Alignment of tile objects.
    pub object_alignment: ObjectAlignment,
    /// Atlas image.
    pub image: Option<Image>,
    /// Drawing offset.
    pub tile_offset: Option<TileOffset>,
    /// Editor grid.
    pub grid: Option<Grid>,
    /// Custom properties.
    pub properties: Properties,
    /// Tiles with extra data.
    pub tiles: Vec<Tile>,
    /// Wang sets.
    pub wang_sets: Vec<WangSet>,
}

impl Tileset {
    /// Per-tile record for local id `id`, if the tileset declares one.
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }
}

/// An image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Path relative to the declaring document.
    pub source: Option<String>,
    /// File extension of embedded image data.
    pub format: Option<String>,
    /// Color treated as transparent.
    pub trans: Option<Color>,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
}

/// Offset applied when drawing tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileOffset {
    /// Horizontal offset in pixels.
    pub x: i32,
    /// Vertical offset in pixels, positive is down.
    pub y: i32,
}

/// Overlay grid used for terrain and collision editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Grid projection.
    pub orientation: Orientation,
    /// Cell width in pixels.
    pub width: u32,
    /// Cell height in pixels.
    pub height: u32,
}

/// Extra data of one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Local id.
    pub id: u32,
    /// User-defined class.
    pub class: Option<String>,
    /// Chance of being picked by terrain tools.
    pub probability: f32,
    /// Custom properties.
    pub properties: Properties,
    /// Image of an image-collection tile.
    pub image: Option<Image>,
    /// Collision shapes.
    pub collision: Option<ObjectGroup>,
    /// Animation frames.
    pub animation: Vec<Frame>,
}

impl Tile {
    /// Objects of the collision group, if any.
    pub fn collision_objects(&self) -> &[Object] {
        self.collision.as_ref().map_or(&[], |g| g.objects.as_slice())
    }
}

/// One animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Local id of the shown tile.
    pub tile_id: u32,
    /// Frame length in milliseconds.
    pub duration_ms: u32,
}

/// Kind of a wang set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WangSetKind {
    /// Corner colors.
    Corner,
    /// Edge colors.
    Edge,
    /// Both.
    Mixed,
}

/// A set of terrain colors and tile assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WangSet {
    /// Set name.
    pub name: String,
    /// User-defined class.
    pub class: Option<String>,
    /// Kind.
    pub kind: WangSetKind,
    /// Local id of the representative tile, `-1` for none.
    pub tile: i32,
    /// Custom properties.
    pub properties: Properties,
    /// Colors.
    pub colors: Vec<WangColor>,
    /// Tile assignments.
    pub tiles: Vec<WangTile>,
}

/// One terrain color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WangColor {
    /// Color name.
    pub name: String,
    /// User-defined class.
    pub class: Option<String>,
    /// Display color.
    pub color: Color,
    /// Representative tile, `-1` for none.
    pub tile: i32,
    /// Relative probability.
    pub probability: f32,
    /// Custom properties.
    pub properties: Properties,
}

/// Colors assigned to one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WangTile {
    /// Local id.
    pub tile_id: u32,
    /// Color indexes (1-based, 0 unset): top, top-right, right, bottom-right,
    /// bottom, bottom-left, left, top-left.
    pub wang_id: [u8; 8],
}

/// A standalone `.tx` object template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Tileset reference of the template's tile object.
    pub tileset: Option<TilesetRef>,
    /// The template object.
    pub object: Object,
}
