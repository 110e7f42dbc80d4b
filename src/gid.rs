use serde::{Deserialize, Serialize};

/// Horizontal flip flag.
pub const FLIP_H: u32 = 0x8000_0000; // bit 31
/// Vertical flip flag.
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
/// Anti-diagonal flip flag.
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
/// 120 degree rotation flag.
pub const ROTATE_HEX_120: u32 = 0x1000_0000; // bit 28, hexagonal maps only
/// Bits that carry the tile id.
pub const GID_MASK: u32 = 0x0FFF_FFFF;

/// A raw global tile id as found in tile data and tile objects.
///
/// The upper four bits carry flip/rotation flags; `0` means "no tile".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gid(pub u32);

impl Gid {
    /// The empty cell.
    pub const EMPTY: Gid = Gid(0);

    /// The value as stored.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// Tile id with the flag bits cleared.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// Whether the cell holds no tile.
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
    /// Flipped horizontally.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Flipped vertically.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Flipped along the anti-diagonal.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
    /// Rotated by 120 degrees.
    #[inline] pub fn rotate_hex_120(self) -> bool { (self.0 & ROTATE_HEX_120) != 0 }
}

impl From<u32> for Gid {
    fn from(raw: u32) -> Self {
        Gid(raw)
    }
}
