use crate::color::Color;
use crate::gid::Gid;
use crate::layer::LayerNode;
use crate::properties::Properties;
use crate::tileset::TilesetRef;
use serde::{Deserialize, Serialize};

/// Map projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Square grid.
    Orthogonal,
    /// Diamond grid.
    Isometric,
    /// Staggered isometric grid.
    Staggered,
    /// Hexagonal grid.
    Hexagonal,
}

/// Order in which tiles of a tile layer are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    /// Left to right, top to bottom.
    RightDown,
    /// Left to right, bottom to top.
    RightUp,
    /// Right to left, top to bottom.
    LeftDown,
    /// Right to left, bottom to top.
    LeftUp,
}

/// Axis staggered on staggered and hexagonal maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaggerAxis {
    /// Columns are staggered.
    X,
    /// Rows are staggered.
    Y,
}

/// Which rows or columns are shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaggerIndex {
    /// Odd ones.
    Odd,
    /// Even ones.
    Even,
}

/// A parsed `.tmx` map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    /// TMX format version.
    pub version: String,
    /// Editor version that saved the file.
    pub tiled_version: Option<String>,
    /// User-defined class.
    pub class: Option<String>,
    /// Projection.
    pub orientation: Orientation,
    /// Tile render order.
    pub render_order: RenderOrder,
    /// `-1` selects the compressor's default level.
    pub compression_level: i32,
    /// Width in tiles (ignored by infinite maps).
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Hex side length in pixels.
    pub hex_side_length: Option<i32>,
    /// Stagger axis, hexagonal and staggered maps only.
    pub stagger_axis: Option<StaggerAxis>,
    /// Stagger index.
    pub stagger_index: StaggerIndex,
    /// Parallax origin `(x, y)` in pixels.
    pub parallax_origin: (f32, f32),
    /// Background color.
    pub background_color: Option<Color>,
    /// Next free layer id.
    pub next_layer_id: u32,
    /// Next free object id.
    pub next_object_id: u32,
    /// Whether layers store chunks.
    pub infinite: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Tilesets in document order.
    pub tilesets: Vec<TilesetRef>,
    /// Top-level layers in draw order.
    pub layers: Vec<LayerNode>,
}

impl Map {
    /// Finds the tileset owning `gid` and the tile's local id within it.
    ///
    /// The owner is the tileset with the largest `first_gid` not above the
    /// (flag-stripped) gid, regardless of declaration order. Returns `None`
    /// for the empty gid or when every tileset starts above it.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<(&TilesetRef, u32)> {
        let clean = Gid(gid).clean();
        if clean == 0 {
            return None;
        }
        let owner = self
            .tilesets
            .iter()
            .filter(|ts| ts.first_gid() <= clean)
            .max_by_key(|ts| ts.first_gid())?;
        Some((owner, clean - owner.first_gid()))
    }

    /// Depth-first walk over every layer, group layers before their children.
    pub fn layers_flat(&self) -> impl Iterator<Item = &LayerNode> {
        let mut pending: Vec<&LayerNode> = self.layers.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = pending.pop()?;
            if let LayerNode::Group(group) = node {
                pending.extend(group.children.iter().rev());
            }
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(first_gid: u32) -> TilesetRef {
        TilesetRef::External {
            first_gid,
            source: format!("ts{first_gid}.tsx"),
        }
    }

    fn map_with(tilesets: Vec<TilesetRef>) -> Map {
        Map {
            version: "1.10".into(),
            tiled_version: None,
            class: None,
            orientation: Orientation::Orthogonal,
            render_order: RenderOrder::RightDown,
            compression_level: -1,
            width: 1,
            height: 1,
            tile_width: 16,
            tile_height: 16,
            hex_side_length: None,
            stagger_axis: None,
            stagger_index: StaggerIndex::Odd,
            parallax_origin: (0.0, 0.0),
            background_color: None,
            next_layer_id: 1,
            next_object_id: 1,
            infinite: false,
            properties: Properties::new(),
            tilesets,
            layers: Vec::new(),
        }
    }

    #[test]
    fn largest_first_gid_not_above_wins_in_any_order() {
        let map = map_with(vec![external(120), external(1), external(50)]);

        let (ts, local) = map.tileset_for_gid(75).expect("owner");
        assert_eq!(ts.first_gid(), 50);
        assert_eq!(local, 25);

        let (ts, local) = map.tileset_for_gid(1).expect("owner");
        assert_eq!(ts.first_gid(), 1);
        assert_eq!(local, 0);

        let (ts, local) = map.tileset_for_gid(120).expect("owner");
        assert_eq!(ts.first_gid(), 120);
        assert_eq!(local, 0);
    }

    #[test]
    fn flip_flags_do_not_change_the_owner() {
        let map = map_with(vec![external(1), external(50)]);
        let (ts, local) = map
            .tileset_for_gid(crate::gid::FLIP_H | 51)
            .expect("owner");
        assert_eq!(ts.first_gid(), 50);
        assert_eq!(local, 1);
    }

    #[test]
    fn empty_or_unowned_gid_resolves_to_nothing() {
        let map = map_with(vec![external(10)]);
        assert!(map.tileset_for_gid(0).is_none());
        assert!(map.tileset_for_gid(9).is_none());
        assert!(map_with(Vec::new()).tileset_for_gid(3).is_none());
    }
}
