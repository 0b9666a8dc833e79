use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use super::registers::{Registers, Stat};
use super::tiles::TileCache;
use super::timing::{self, Mode, Transition};
use super::{render, Framebuffer, FRAMEBUFFER_LEN, LCD_WIDTH, OAM_SIZE, VRAM_SIZE};
use crate::interrupt::{Interrupt, InterruptSink};

#[derive(Clone, Serialize, Deserialize)]
pub struct Ppu {
    regs: Registers,
    #[serde(with = "BigArray")]
    vram: [u8; VRAM_SIZE],
    #[serde(with = "BigArray")]
    oam: [u8; OAM_SIZE],
    tiles: TileCache,
    #[serde(with = "BigArray")]
    framebuffer: Framebuffer,
    frame_ready: bool,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            vram: [0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
            tiles: TileCache::new(),
            framebuffer: [0; FRAMEBUFFER_LEN],
            frame_ready: false,
        }
    }

    /// Advances the PPU by `dots` dots.
    pub fn tick<I: InterruptSink + ?Sized>(&mut self, dots: u32, irq: &mut I) {
        for _ in 0..dots {
            self.step(irq);
        }
    }

    /// Advances the PPU by a single dot.
    pub fn step<I: InterruptSink + ?Sized>(&mut self, irq: &mut I) {
        if !self.regs.lcd_enabled() {
            return;
        }

        let dots = self.regs.dots().saturating_sub(1);
        self.regs.set_dots(dots);

        // HBlank STAT fires one dot before the mode actually changes.
        if dots == 1
            && self.regs.mode() == Mode::DataTransfer
            && self.regs.stat().contains(Stat::HBLANK_INTERRUPT)
        {
            irq.raise(Interrupt::LcdStat);
        }

        if dots != 0 {
            return;
        }

        let transition = timing::next(self.regs.mode(), self.regs.ly());
        self.apply(transition, irq);
    }

    fn apply<I: InterruptSink + ?Sized>(&mut self, transition: Transition, irq: &mut I) {
        if transition == Transition::HBlank {
            self.render_line();
        }

        if let Some(ly) = transition.line() {
            self.regs.set_ly(ly);
        }

        let mode = transition.mode();
        self.regs.set_mode(mode);
        let dots = timing::mode_length(mode, self.regs.scx());
        self.regs.set_dots(dots);

        let stat = self.regs.stat();
        match transition {
            Transition::OamSearch { .. } => {
                if stat.contains(Stat::OAM_INTERRUPT) {
                    irq.raise(Interrupt::LcdStat);
                }
            }
            Transition::VBlank { .. } => {
                self.regs.set_window_line(0);
                self.frame_ready = true;
                irq.raise(Interrupt::VBlank);
                // DMG quirk: the OAM select bit also triggers at VBlank start.
                if stat.intersects(Stat::VBLANK_INTERRUPT | Stat::OAM_INTERRUPT) {
                    irq.raise(Interrupt::LcdStat);
                }
                log::trace!("VBlank");
            }
            Transition::DataTransfer | Transition::HBlank | Transition::VBlankLine { .. } => {}
        }

        if transition.line().is_some() {
            self.compare_ly_lyc(irq);
        }
    }

    fn render_line(&mut self) {
        let ly = self.regs.ly() as usize;
        let start = ly * LCD_WIDTH;
        let Some(line) = self
            .framebuffer
            .get_mut(start..start + LCD_WIDTH)
            .and_then(|row| <&mut [u8; LCD_WIDTH]>::try_from(row).ok())
        else {
            return;
        };

        let window_drawn =
            render::render_scanline(line, &self.regs, &self.vram, &self.tiles, &self.oam);
        if window_drawn {
            let next = self.regs.window_line().wrapping_add(1);
            self.regs.set_window_line(next);
        }
    }

    fn compare_ly_lyc<I: InterruptSink + ?Sized>(&mut self, irq: &mut I) {
        let coincidence = self.regs.ly() == self.regs.lyc();
        self.regs.set_coincidence(coincidence);
        if coincidence && self.regs.stat().contains(Stat::LYC_INTERRUPT) {
            irq.raise(Interrupt::LcdStat);
        }
    }

    pub fn read_register(&self, addr: u16) -> u8 {
        self.regs.read(addr)
    }

    pub fn write_register(&mut self, addr: u16, val: u8) {
        self.regs.write(addr, val);
    }

    /// VRAM read by offset (0x0000-0x1FFF). Not gated by mode.
    pub fn read_vram(&self, addr: usize) -> u8 {
        self.vram[addr]
    }

    /// VRAM write by offset. Not gated by mode; keeps the tile cache in sync.
    pub fn write_vram(&mut self, addr: usize, val: u8) {
        self.vram[addr] = val;
        self.tiles.update(&self.vram, addr);
    }

    /// OAM read by offset (0x00-0x9F).
    pub fn read_oam(&self, addr: usize) -> u8 {
        self.oam[addr]
    }

    /// OAM write by offset. Dropped while the PPU is in mode 2 or 3.
    pub fn write_oam(&mut self, addr: usize, val: u8) {
        let mode = self.regs.mode();
        if mode.locks_oam() {
            log::trace!("OAM write 0x{addr:02X}=0x{val:02X} dropped in {mode:?}");
            return;
        }
        self.oam[addr] = val;
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn vram(&self) -> &[u8; VRAM_SIZE] {
        &self.vram
    }

    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    pub fn tiles(&self) -> &TileCache {
        &self.tiles
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_ready(&mut self) {
        self.frame_ready = false;
    }

    pub fn current_mode(&self) -> Mode {
        self.regs.mode()
    }

    pub fn current_ly(&self) -> u8 {
        self.regs.ly()
    }

    pub fn current_dots(&self) -> u32 {
        self.regs.dots()
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
