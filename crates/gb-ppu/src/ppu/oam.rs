//! Object attribute memory decoding and per-line sprite selection.

use bitflags::bitflags;

use super::OAM_SIZE;

pub const SPRITE_COUNT: usize = 40;
pub const SPRITES_PER_LINE: usize = 10;

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct SpriteAttributes: u8 {
        const BEHIND_BG = 0b1000_0000;
        const FLIP_Y    = 0b0100_0000;
        const FLIP_X    = 0b0010_0000;
        const PALETTE   = 0b0001_0000;
        /// CGB only.
        const BANK      = 0b0000_1000;
    }
}

impl Default for SpriteAttributes {
    fn default() -> Self {
        Self::empty()
    }
}

/// One OAM entry with its position translated to screen space.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Sprite {
    pub y: i16,
    pub x: i16,
    pub tile: u8,
    pub attrs: SpriteAttributes,
}

impl Sprite {
    pub fn from_oam(oam: &[u8; OAM_SIZE], index: usize) -> Self {
        let base = index * 4;
        Self {
            y: oam[base] as i16 - 16,
            x: oam[base + 1] as i16 - 8,
            tile: oam[base + 2],
            attrs: SpriteAttributes::from_bits_retain(oam[base + 3]),
        }
    }

    #[inline]
    pub fn covers_line(&self, ly: u8, height: u8) -> bool {
        let ly = ly as i16;
        self.y <= ly && ly - self.y < height as i16
    }

    /// Tile slot and row within it for screen line `ly`, honouring Y flip and
    /// 8x16 mode.
    pub fn tile_row(&self, ly: u8, height: u8) -> (usize, usize) {
        let height = height as i16;
        let mut row = ly as i16 - self.y;
        if self.attrs.contains(SpriteAttributes::FLIP_Y) {
            row = height - 1 - row;
        }

        let mut tile = if height == 16 {
            (self.tile & 0xFE) as usize
        } else {
            self.tile as usize
        };
        if row >= 8 {
            tile += 1;
            row -= 8;
        }
        (tile, (row & 7) as usize)
    }
}

/// Sprites visible on `ly`, sorted by X for drawing.
///
/// The first ten hits in OAM order are kept. The sort is stable, so equal X
/// keeps OAM order.
#[derive(Clone, Debug, Default)]
pub struct LineSprites {
    sprites: [Sprite; SPRITES_PER_LINE],
    count: usize,
}

impl LineSprites {
    pub fn scan(oam: &[u8; OAM_SIZE], ly: u8, height: u8) -> Self {
        let mut line = Self::default();

        for i in 0..SPRITE_COUNT {
            let sprite = Sprite::from_oam(oam, i);
            if !sprite.covers_line(ly, height) {
                continue;
            }
            line.sprites[line.count] = sprite;
            line.count += 1;
            if line.count == SPRITES_PER_LINE {
                break;
            }
        }

        line.sprites[..line.count].sort_by_key(|s| s.x);
        line
    }

    #[inline]
    pub fn as_slice(&self) -> &[Sprite] {
        &self.sprites[..self.count]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
