//! Display-ready pixel export for the frontend and debug views.
//!
//! Every export fills as much of `out` as fits and returns the number of
//! pixels written. A return value smaller than the view's full size means the
//! buffer was too small.

use super::registers::Lcdc;
use super::render::{MAP_0, MAP_1, MAP_WIDTH};
use super::tiles::{bg_tile_index, TILE_COUNT};
use super::{Ppu, FRAMEBUFFER_LEN};

/// Colour for each shade, plus the LCD-off colour at index 4.
pub const SHADES: [u32; 5] = [
    0xF5F5_F5F5,
    0xAAAA_AAAA,
    0x5555_5555,
    0x0101_0101,
    0x0000_0000,
];
pub const LCD_OFF_SHADE: u8 = 4;

pub const BG_MAP_WIDTH: usize = 256;
pub const BG_MAP_HEIGHT: usize = 256;
pub const BG_MAP_LEN: usize = BG_MAP_WIDTH * BG_MAP_HEIGHT;

pub const TILESET_WIDTH_TILES: usize = 16;
pub const TILESET_WIDTH: usize = TILESET_WIDTH_TILES * 8;
pub const TILESET_HEIGHT: usize = TILE_COUNT / TILESET_WIDTH_TILES * 8;
pub const TILESET_LEN: usize = TILESET_WIDTH * TILESET_HEIGHT;

#[inline]
pub fn shade_color(shade: u8) -> u32 {
    SHADES[shade as usize]
}

fn fill(out: &mut [u32], len: usize, mut pixel: impl FnMut(usize) -> u32) -> usize {
    let n = out.len().min(len);
    for (i, px) in out[..n].iter_mut().enumerate() {
        *px = pixel(i);
    }
    n
}

impl Ppu {
    /// The last rendered frame, or the LCD-off colour while the LCD is disabled.
    pub fn export_display(&self, out: &mut [u32]) -> usize {
        let framebuffer = self.framebuffer();
        if self.registers().lcd_enabled() {
            fill(out, FRAMEBUFFER_LEN, |i| shade_color(framebuffer[i]))
        } else {
            fill(out, FRAMEBUFFER_LEN, |_| shade_color(LCD_OFF_SHADE))
        }
    }

    /// The whole 256x256 background map, unscrolled and unpaletted.
    pub fn export_background(&self, out: &mut [u32]) -> usize {
        let lcdc = self.registers().lcdc();
        let map = if lcdc.contains(Lcdc::BG_MAP) { MAP_1 } else { MAP_0 };
        let unsigned = lcdc.contains(Lcdc::UNSIGNED_TILES);
        let vram = self.vram();
        let tiles = self.tiles();

        fill(out, BG_MAP_LEN, |i| {
            let (x, y) = (i % BG_MAP_WIDTH, i / BG_MAP_WIDTH);
            let id = vram[map + (y / 8) * MAP_WIDTH + x / 8];
            shade_color(tiles.pixel(bg_tile_index(id, unsigned), y % 8, x % 8))
        })
    }

    /// All 384 tiles, 16 per row, in VRAM order.
    pub fn export_tileset(&self, out: &mut [u32]) -> usize {
        let tiles = self.tiles();

        fill(out, TILESET_LEN, |i| {
            let (x, y) = (i % TILESET_WIDTH, i / TILESET_WIDTH);
            let tile = (y / 8) * TILESET_WIDTH_TILES + x / 8;
            shade_color(tiles.pixel(tile, y % 8, x % 8))
        })
    }
}
