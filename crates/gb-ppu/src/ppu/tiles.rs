//! Decoded tile data.
//!
//! VRAM 0x8000-0x97FF holds 384 tiles of 16 bytes (two bit-planes per row).
//! The cache keeps every row decoded to colour numbers so the renderer never
//! touches the bit-planes.

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use super::VRAM_SIZE;

pub const TILE_COUNT: usize = 384;
pub const TILE_BYTES: usize = 16;
/// End of tile data; tile maps start here.
pub const TILE_DATA_END: usize = TILE_COUNT * TILE_BYTES;

pub type Tile = [[u8; 8]; 8];

#[derive(Clone, Serialize, Deserialize)]
pub struct TileCache {
    #[serde(with = "BigArray")]
    tiles: [Tile; TILE_COUNT],
}

impl TileCache {
    pub fn new() -> Self {
        Self {
            tiles: [[[0; 8]; 8]; TILE_COUNT],
        }
    }

    /// Re-decodes the tile row containing `addr` after a VRAM write.
    ///
    /// `addr` is a VRAM offset; writes to the tile maps leave the cache alone.
    pub fn update(&mut self, vram: &[u8; VRAM_SIZE], addr: usize) {
        if addr >= TILE_DATA_END {
            return;
        }

        let base = addr & !1;
        let lo = vram[base];
        let hi = vram[base + 1];

        let tile = addr / TILE_BYTES;
        let row = (addr % TILE_BYTES) / 2;

        for (px, color) in self.tiles[tile][row].iter_mut().enumerate() {
            let bit = 7 - px;
            let lsb = (lo >> bit) & 1;
            let msb = (hi >> bit) & 1;
            *color = (msb << 1) | lsb;
        }
    }

    #[inline]
    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    #[inline]
    pub fn pixel(&self, index: usize, row: usize, col: usize) -> u8 {
        self.tiles[index][row][col]
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache slot for a BG/window tile id.
///
/// Unsigned mode maps ids 0-255 to slots 0-255. Signed mode keeps 128-255 and
/// moves 0-127 to slots 256-383, so id 0 sits at 0x9000.
#[inline]
pub fn bg_tile_index(id: u8, unsigned: bool) -> usize {
    if unsigned || id >= 128 {
        id as usize
    } else {
        id as usize + 256
    }
}
