//! LCD controller registers (FF40-FF4B) and internal PPU counters.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::timing::{Mode, LCD_OFF_DOTS, POWER_ON_DOTS};

pub const LCDC: u16 = 0xFF40;
pub const STAT: u16 = 0xFF41;
pub const SCY: u16 = 0xFF42;
pub const SCX: u16 = 0xFF43;
pub const LY: u16 = 0xFF44;
pub const LYC: u16 = 0xFF45;
pub const BGP: u16 = 0xFF47;
pub const OBP0: u16 = 0xFF48;
pub const OBP1: u16 = 0xFF49;
pub const WY: u16 = 0xFF4A;
pub const WX: u16 = 0xFF4B;

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Lcdc: u8 {
        const LCD_ENABLE       = 0b1000_0000;
        const WINDOW_MAP       = 0b0100_0000;
        const WINDOW_ENABLE    = 0b0010_0000;
        /// Set: tile ids 0-255 index 0x8000. Clear: signed ids around 0x9000.
        const UNSIGNED_TILES   = 0b0001_0000;
        const BG_MAP           = 0b0000_1000;
        const TALL_SPRITES     = 0b0000_0100;
        const SPRITE_ENABLE    = 0b0000_0010;
        const BG_ENABLE        = 0b0000_0001;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Stat: u8 {
        const UNUSED           = 0b1000_0000;
        const LYC_INTERRUPT    = 0b0100_0000;
        const OAM_INTERRUPT    = 0b0010_0000;
        const VBLANK_INTERRUPT = 0b0001_0000;
        const HBLANK_INTERRUPT = 0b0000_1000;
        const COINCIDENCE      = 0b0000_0100;
        const MODE             = 0b0000_0011;

        /// Bits the CPU may write.
        const WRITABLE = Self::UNUSED.bits()
            | Self::LYC_INTERRUPT.bits()
            | Self::OAM_INTERRUPT.bits()
            | Self::VBLANK_INTERRUPT.bits()
            | Self::HBLANK_INTERRUPT.bits();
    }
}

/// Register bank plus the two internal counters (mode dots, window line).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registers {
    lcdc: Lcdc,
    stat: Stat,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,
    window_line: u8,
    dots: u32,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            lcdc: Lcdc::from_bits_retain(0x91),
            stat: Stat::empty(),
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            window_line: 0,
            dots: POWER_ON_DOTS,
        }
    }

    /// Bus read. Addresses outside FF40-FF4B (and the DMA slot) read as 0xFF.
    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            LCDC => self.lcdc.bits(),
            STAT => (self.stat | Stat::UNUSED).bits(),
            SCY => self.scy,
            SCX => self.scx,
            LY => self.ly,
            LYC => self.lyc,
            BGP => self.bgp,
            OBP0 => self.obp0,
            OBP1 => self.obp1,
            WY => self.wy,
            WX => self.wx,
            _ => 0xFF,
        }
    }

    /// Bus write. LY is read-only; unknown addresses are ignored.
    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            LCDC => self.write_lcdc(val),
            STAT => self.write_stat(val),
            SCY => self.scy = val,
            SCX => self.scx = val,
            LYC => self.lyc = val,
            BGP => self.bgp = val,
            OBP0 => self.obp0 = val,
            OBP1 => self.obp1 = val,
            WY => self.wy = val,
            WX => self.wx = val,
            _ => {}
        }
    }

    fn write_lcdc(&mut self, val: u8) {
        let new = Lcdc::from_bits_retain(val);
        let was_enabled = self.lcd_enabled();

        if !new.contains(Lcdc::LCD_ENABLE) {
            // The counter is not reloaded with a mode length here: 115 is
            // what the first HBlank after re-enabling runs for.
            self.ly = 0;
            self.dots = LCD_OFF_DOTS;
            self.stat.remove(Stat::MODE);
            if was_enabled {
                log::debug!("LCD off (LCDC=0x{val:02X})");
            }
        } else if !was_enabled {
            log::debug!("LCD on (LCDC=0x{val:02X})");
        }

        self.lcdc = new;
    }

    fn write_stat(&mut self, val: u8) {
        let keep = self.stat - Stat::WRITABLE;
        self.stat = keep | (Stat::from_bits_retain(val) & Stat::WRITABLE);
    }

    #[inline]
    pub fn lcdc(&self) -> Lcdc {
        self.lcdc
    }

    #[inline]
    pub fn stat(&self) -> Stat {
        self.stat
    }

    #[inline]
    pub fn lcd_enabled(&self) -> bool {
        self.lcdc.contains(Lcdc::LCD_ENABLE)
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.stat.bits())
    }

    #[inline]
    pub fn scy(&self) -> u8 {
        self.scy
    }

    #[inline]
    pub fn scx(&self) -> u8 {
        self.scx
    }

    #[inline]
    pub fn ly(&self) -> u8 {
        self.ly
    }

    #[inline]
    pub fn lyc(&self) -> u8 {
        self.lyc
    }

    #[inline]
    pub fn bgp(&self) -> u8 {
        self.bgp
    }

    #[inline]
    pub fn obp0(&self) -> u8 {
        self.obp0
    }

    #[inline]
    pub fn obp1(&self) -> u8 {
        self.obp1
    }

    #[inline]
    pub fn wy(&self) -> u8 {
        self.wy
    }

    #[inline]
    pub fn wx(&self) -> u8 {
        self.wx
    }

    /// Line of window content drawn next; independent of LY and SCY.
    #[inline]
    pub fn window_line(&self) -> u8 {
        self.window_line
    }

    /// Dots left in the current mode.
    #[inline]
    pub fn dots(&self) -> u32 {
        self.dots
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.stat.remove(Stat::MODE);
        self.stat |= Stat::from_bits_retain(mode.bits());
    }

    pub(crate) fn set_ly(&mut self, ly: u8) {
        self.ly = ly;
    }

    pub(crate) fn set_coincidence(&mut self, on: bool) {
        self.stat.set(Stat::COINCIDENCE, on);
    }

    pub(crate) fn set_dots(&mut self, dots: u32) {
        self.dots = dots;
    }

    pub(crate) fn set_window_line(&mut self, line: u8) {
        self.window_line = line;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a 2-bit colour number through a DMG palette register.
#[inline]
pub fn apply_palette(palette: u8, color: u8) -> u8 {
    (palette >> ((color & 0x03) * 2)) & 0x03
}
