//! Scanline compositing (DMG): background, then window, then sprites.

use super::oam::{LineSprites, SpriteAttributes};
use super::registers::{apply_palette, Lcdc, Registers};
use super::tiles::{bg_tile_index, TileCache};
use super::{LCD_WIDTH, OAM_SIZE, VRAM_SIZE};

pub const MAP_0: usize = 0x1800;
pub const MAP_1: usize = 0x1C00;
pub const MAP_WIDTH: usize = 32;

/// Largest `WX - 7` that still puts the window on screen.
const WINDOW_X_LIMIT: i16 = 0xA6;

#[inline]
fn map_base(high: bool) -> usize {
    if high {
        MAP_1
    } else {
        MAP_0
    }
}

/// Draws line `regs.ly()` into `line`.
///
/// `line` holds palette-mapped shades (0-3). Returns true if the window
/// contributed to this line, in which case the caller advances its internal
/// window line counter.
pub fn render_scanline(
    line: &mut [u8; LCD_WIDTH],
    regs: &Registers,
    vram: &[u8; VRAM_SIZE],
    tiles: &TileCache,
    oam: &[u8; OAM_SIZE],
) -> bool {
    let lcdc = regs.lcdc();

    if lcdc.contains(Lcdc::BG_ENABLE) {
        render_background(line, regs, vram, tiles);
    } else {
        line.fill(0);
    }

    let window_drawn = render_window(line, regs, vram, tiles);

    if lcdc.contains(Lcdc::SPRITE_ENABLE) {
        render_sprites(line, regs, tiles, oam);
    }

    window_drawn
}

fn render_background(
    line: &mut [u8; LCD_WIDTH],
    regs: &Registers,
    vram: &[u8; VRAM_SIZE],
    tiles: &TileCache,
) {
    let lcdc = regs.lcdc();
    let map = map_base(lcdc.contains(Lcdc::BG_MAP));
    let unsigned = lcdc.contains(Lcdc::UNSIGNED_TILES);
    let bgp = regs.bgp();

    // Background wraps around 256x256.
    let y = regs.scy().wrapping_add(regs.ly()) as usize;

    for (x, shade) in line.iter_mut().enumerate() {
        let bx = regs.scx().wrapping_add(x as u8) as usize;
        let id = vram[map + (y / 8) * MAP_WIDTH + bx / 8];
        let color = tiles.pixel(bg_tile_index(id, unsigned), y % 8, bx % 8);
        *shade = apply_palette(bgp, color);
    }
}

fn render_window(
    line: &mut [u8; LCD_WIDTH],
    regs: &Registers,
    vram: &[u8; VRAM_SIZE],
    tiles: &TileCache,
) -> bool {
    let lcdc = regs.lcdc();
    let start = regs.wx() as i16 - 7;

    if !lcdc.contains(Lcdc::WINDOW_ENABLE) || regs.wy() > regs.ly() || start > WINDOW_X_LIMIT {
        return false;
    }

    let map = map_base(lcdc.contains(Lcdc::WINDOW_MAP));
    let unsigned = lcdc.contains(Lcdc::UNSIGNED_TILES);
    let bgp = regs.bgp();
    let wy = regs.window_line() as usize;

    let first = start.max(0) as usize;
    for x in first..LCD_WIDTH {
        let wx = (x as i16 - start) as usize;
        let id = vram[map + (wy / 8) * MAP_WIDTH + wx / 8];
        let color = tiles.pixel(bg_tile_index(id, unsigned), wy % 8, wx % 8);
        line[x] = apply_palette(bgp, color);
    }

    true
}

fn render_sprites(
    line: &mut [u8; LCD_WIDTH],
    regs: &Registers,
    tiles: &TileCache,
    oam: &[u8; OAM_SIZE],
) {
    let ly = regs.ly();
    let height = if regs.lcdc().contains(Lcdc::TALL_SPRITES) {
        16
    } else {
        8
    };

    let sprites = LineSprites::scan(oam, ly, height);

    // Lowest priority first so the leftmost (then earliest in OAM) sprite
    // is painted last.
    for sprite in sprites.as_slice().iter().rev() {
        let (tile, row) = sprite.tile_row(ly, height);
        let flip_x = sprite.attrs.contains(SpriteAttributes::FLIP_X);
        let behind_bg = sprite.attrs.contains(SpriteAttributes::BEHIND_BG);
        let palette = if sprite.attrs.contains(SpriteAttributes::PALETTE) {
            regs.obp1()
        } else {
            regs.obp0()
        };

        for col in 0..8 {
            let screen_x = sprite.x + col as i16;
            if !(0..LCD_WIDTH as i16).contains(&screen_x) {
                continue;
            }
            let screen_x = screen_x as usize;

            let px = if flip_x { 7 - col } else { col };
            let color = tiles.pixel(tile, row, px);
            if color == 0 {
                continue;
            }
            if behind_bg && line[screen_x] != 0 {
                continue;
            }

            line[screen_x] = apply_palette(palette, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::registers::{BGP, LCDC, OBP0, OBP1, SCX, SCY, WX, WY};

    struct Scene {
        regs: Registers,
        vram: [u8; VRAM_SIZE],
        tiles: TileCache,
        oam: [u8; OAM_SIZE],
        line: [u8; LCD_WIDTH],
    }

    impl Scene {
        fn new(lcdc: u8) -> Self {
            let mut regs = Registers::new();
            regs.write(LCDC, lcdc);
            regs.write(BGP, 0xE4);
            regs.write(OBP0, 0xE4);
            regs.write(OBP1, 0xE4);
            Self {
                regs,
                vram: [0; VRAM_SIZE],
                tiles: TileCache::new(),
                oam: [0; OAM_SIZE],
                line: [0; LCD_WIDTH],
            }
        }

        fn write_vram(&mut self, addr: usize, val: u8) {
            self.vram[addr] = val;
            self.tiles.update(&self.vram, addr);
        }

        fn write_tile(&mut self, slot: usize, rows: &[(u8, u8); 8]) {
            let base = slot * 16;
            for (r, (lo, hi)) in rows.iter().enumerate() {
                self.write_vram(base + r * 2, *lo);
                self.write_vram(base + r * 2 + 1, *hi);
            }
        }

        fn sprite(&mut self, i: usize, y: u8, x: u8, tile: u8, attrs: u8) {
            self.oam[i * 4..i * 4 + 4].copy_from_slice(&[y, x, tile, attrs]);
        }

        fn render(&mut self, ly: u8) -> bool {
            self.regs.set_ly(ly);
            render_scanline(&mut self.line, &self.regs, &self.vram, &self.tiles, &self.oam)
        }
    }

    #[test]
    fn background_uses_palette_and_scroll() {
        let mut s = Scene::new(0x91);
        // Tile 1 row 0: colours 0,1,2,3,0,1,2,3.
        s.write_vram(16, 0x55);
        s.write_vram(17, 0x33);
        s.write_vram(MAP_0, 1);

        s.render(0);
        assert_eq!(&s.line[0..8], &[0, 1, 2, 3, 0, 1, 2, 3]);
        assert_eq!(s.line[8], 0);

        s.regs.write(SCX, 2);
        s.render(0);
        assert_eq!(&s.line[0..4], &[2, 3, 0, 1]);

        s.regs.write(SCX, 0);
        s.regs.write(BGP, 0x1B);
        s.render(0);
        assert_eq!(&s.line[0..4], &[3, 2, 1, 0]);
    }

    #[test]
    fn background_wraps_vertically() {
        let mut s = Scene::new(0x91);
        s.write_tile(2, &[(0xFF, 0xFF); 8]);
        // Map row 0 reached from LY 6 with SCY 250.
        s.write_vram(MAP_0, 2);

        s.regs.write(SCY, 250);
        s.render(6);
        assert_eq!(s.line[0], 3);

        s.render(5);
        assert_eq!(s.line[0], 0);
    }

    #[test]
    fn signed_addressing_reads_upper_tile_block() {
        let mut s = Scene::new(0x81);
        // Id 0 in signed mode is slot 256 (0x9000).
        s.write_tile(256, &[(0x00, 0xFF); 8]);
        s.write_tile(0, &[(0xFF, 0x00); 8]);

        s.render(0);
        assert_eq!(s.line[0], 2);

        s.regs.write(LCDC, 0x91);
        s.render(0);
        assert_eq!(s.line[0], 1);
    }

    #[test]
    fn bg_map_select() {
        let mut s = Scene::new(0x99);
        s.write_tile(1, &[(0xFF, 0xFF); 8]);
        s.write_vram(MAP_1, 1);

        s.render(0);
        assert_eq!(s.line[0], 3);
    }

    #[test]
    fn disabled_background_clears_line() {
        let mut s = Scene::new(0x91);
        s.write_tile(1, &[(0xFF, 0xFF); 8]);
        s.write_vram(MAP_0, 1);
        s.render(0);
        assert_eq!(s.line[0], 3);

        s.regs.write(LCDC, 0x90);
        s.render(0);
        assert!(s.line.iter().all(|&c| c == 0));
    }

    #[test]
    fn window_starts_at_wx_minus_7() {
        let mut s = Scene::new(0xF1);
        s.write_tile(1, &[(0xFF, 0xFF); 8]);
        s.write_vram(MAP_1, 1);
        s.regs.write(WY, 0);
        s.regs.write(WX, 7);

        assert!(s.render(0));
        assert_eq!(&s.line[0..8], &[3; 8]);
        assert_eq!(s.line[8], 0);

        s.regs.write(WX, 15);
        assert!(s.render(0));
        assert_eq!(s.line[7], 0);
        assert_eq!(&s.line[8..16], &[3; 8]);
    }

    #[test]
    fn window_ignores_scroll_and_uses_window_line() {
        let mut s = Scene::new(0xB1);
        // Tile 1: row 0 colour 1, row 1 colour 2.
        let mut rows = [(0, 0); 8];
        rows[0] = (0xFF, 0x00);
        rows[1] = (0x00, 0xFF);
        s.write_tile(1, &rows);
        s.write_vram(MAP_0, 1);
        s.regs.write(WY, 0);
        s.regs.write(WX, 7);
        s.regs.write(SCX, 3);
        s.regs.write(SCY, 40);

        s.render(20);
        assert_eq!(s.line[0], 1);

        s.regs.set_window_line(1);
        s.render(21);
        assert_eq!(s.line[0], 2);
    }

    #[test]
    fn window_hidden_above_wy_or_past_right_edge() {
        let mut s = Scene::new(0xF1);
        s.write_tile(1, &[(0xFF, 0xFF); 8]);
        s.write_vram(MAP_1, 1);
        s.regs.write(WY, 10);
        s.regs.write(WX, 7);
        assert!(!s.render(9));
        assert_eq!(s.line[0], 0);

        s.regs.write(WY, 0);
        s.regs.write(WX, 174);
        assert!(!s.render(9));

        s.regs.write(WX, 166);
        assert!(s.render(9));
        assert_eq!(s.line[159], 3);
        assert_eq!(s.line[158], 0);
    }

    #[test]
    fn window_left_of_screen_is_clipped() {
        let mut s = Scene::new(0xF1);
        // Tile 1 row 0: colours 0,1,2,3,0,1,2,3.
        s.write_vram(16, 0x55);
        s.write_vram(17, 0x33);
        s.write_vram(MAP_1, 1);
        s.regs.write(WY, 0);
        s.regs.write(WX, 5);

        assert!(s.render(0));
        assert_eq!(&s.line[0..6], &[2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn sprite_draws_over_background_with_transparency() {
        let mut s = Scene::new(0x93);
        s.write_tile(1, &[(0xF0, 0x00); 8]);
        s.sprite(0, 16, 8, 1, 0);

        s.render(0);
        assert_eq!(&s.line[0..4], &[1; 4]);
        assert_eq!(&s.line[4..8], &[0; 4]);
    }

    #[test]
    fn sprite_uses_selected_object_palette() {
        let mut s = Scene::new(0x93);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        s.regs.write(OBP0, 0xE4);
        s.regs.write(OBP1, 0x0C); // colour 1 -> shade 3
        s.sprite(0, 16, 8, 1, 0);
        s.sprite(1, 16, 20, 1, SpriteAttributes::PALETTE.bits());

        s.render(0);
        assert_eq!(s.line[0], 1);
        assert_eq!(s.line[12], 3);
    }

    #[test]
    fn sprite_behind_bg_only_shows_over_shade_zero() {
        let mut s = Scene::new(0x93);
        s.write_tile(2, &[(0xFF, 0xFF); 8]);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        s.write_vram(MAP_0, 2);
        s.sprite(0, 16, 12, 1, SpriteAttributes::BEHIND_BG.bits());

        s.render(0);
        assert_eq!(&s.line[4..8], &[3; 4]);
        assert_eq!(&s.line[8..12], &[1; 4]);
    }

    #[test]
    fn sprite_flips() {
        let mut s = Scene::new(0x93);
        // Tile 3: left pixel colour 1, right pixel colour 2.
        s.write_tile(3, &[(0x80, 0x01); 8]);
        s.sprite(0, 16, 8, 3, 0);
        s.render(0);
        assert_eq!((s.line[0], s.line[7]), (1, 2));

        s.sprite(0, 16, 8, 3, SpriteAttributes::FLIP_X.bits());
        s.render(0);
        assert_eq!((s.line[0], s.line[7]), (2, 1));

        // Tile 4: top row colour 1, bottom row colour 2.
        let mut rows = [(0xFF, 0x00); 8];
        rows[7] = (0x00, 0xFF);
        s.write_tile(4, &rows);
        s.sprite(0, 16, 8, 4, SpriteAttributes::FLIP_Y.bits());
        s.render(0);
        assert_eq!(s.line[0], 2);
    }

    #[test]
    fn tall_sprite_spans_two_tiles() {
        let mut s = Scene::new(0x97);
        s.write_tile(6, &[(0xFF, 0x00); 8]);
        s.write_tile(7, &[(0x00, 0xFF); 8]);
        // Odd tile id is rounded down in 8x16 mode.
        s.sprite(0, 16, 8, 7, 0);

        s.render(0);
        assert_eq!(s.line[0], 1);
        s.render(8);
        assert_eq!(s.line[0], 2);
    }

    #[test]
    fn leftmost_sprite_wins_overlap() {
        let mut s = Scene::new(0x93);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        s.write_tile(2, &[(0x00, 0xFF); 8]);
        // OAM order puts the right sprite first.
        s.sprite(0, 16, 8 + 14, 2, 0);
        s.sprite(1, 16, 8 + 10, 1, 0);

        s.render(0);
        assert_eq!(&s.line[10..18], &[1; 8]);
        assert_eq!(&s.line[18..22], &[2; 4]);
        assert_eq!(s.line[9], 0);
        assert_eq!(s.line[22], 0);
    }

    #[test]
    fn equal_x_earlier_oam_entry_wins() {
        let mut s = Scene::new(0x93);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        s.write_tile(2, &[(0x00, 0xFF); 8]);
        s.sprite(0, 16, 8, 2, 0);
        s.sprite(1, 16, 8, 1, 0);

        s.render(0);
        assert_eq!(s.line[0], 2);
    }

    #[test]
    fn transparent_pixels_of_winner_show_loser() {
        let mut s = Scene::new(0x93);
        // Left half opaque.
        s.write_tile(1, &[(0xF0, 0x00); 8]);
        s.write_tile(2, &[(0x00, 0xFF); 8]);
        s.sprite(0, 16, 8, 1, 0);
        s.sprite(1, 16, 9, 2, 0);

        s.render(0);
        assert_eq!(&s.line[0..4], &[1; 4]);
        assert_eq!(&s.line[4..9], &[2; 5]);
    }

    #[test]
    fn eleventh_sprite_on_line_is_dropped() {
        let mut s = Scene::new(0x93);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        // Ten transparent sprites fill the line budget.
        for i in 0..10 {
            s.sprite(i, 16, 8, 0, 0);
        }
        s.sprite(10, 16, 8, 1, 0);

        s.render(0);
        assert_eq!(s.line[0], 0);
    }

    #[test]
    fn sprites_clip_at_screen_edges() {
        let mut s = Scene::new(0x93);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        s.sprite(0, 16, 4, 1, 0);
        s.sprite(1, 16, 164, 1, 0);

        s.render(0);
        assert_eq!(&s.line[0..4], &[1; 4]);
        assert_eq!(s.line[4], 0);
        assert_eq!(&s.line[156..160], &[1; 4]);
        assert_eq!(s.line[155], 0);
    }

    #[test]
    fn sprites_disabled() {
        let mut s = Scene::new(0x91);
        s.write_tile(1, &[(0xFF, 0x00); 8]);
        s.sprite(0, 16, 8, 1, 0);
        s.render(0);
        assert_eq!(s.line[0], 0);
    }
}
