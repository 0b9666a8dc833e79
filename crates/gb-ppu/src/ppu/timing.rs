//! Mode durations and the scanline state machine.
//!
//! All lengths are in dots. A visible line is OAM search (21) + data transfer
//! (43) + HBlank (50) = 114 dots; the SCX fine-scroll penalty moves dots from
//! HBlank into data transfer without changing the line total.

use serde::{Deserialize, Serialize};

pub const OAM_SEARCH_DOTS: u32 = 21;
pub const DATA_TRANSFER_DOTS: u32 = 43;
pub const HBLANK_DOTS: u32 = 50;
pub const LINE_DOTS: u32 = OAM_SEARCH_DOTS + DATA_TRANSFER_DOTS + HBLANK_DOTS;
pub const VBLANK_LINE_DOTS: u32 = 114;

/// Counter value loaded when the LCD is switched off.
pub const LCD_OFF_DOTS: u32 = 115;
/// Counter value at power-on.
pub const POWER_ON_DOTS: u32 = 80;

pub const VISIBLE_LINES: u8 = 144;
pub const LAST_LINE: u8 = 153;
pub const FRAME_DOTS: u32 = LINE_DOTS * (LAST_LINE as u32 + 1);

const SCX_PENALTY: [u32; 8] = [0, 1, 1, 1, 1, 2, 2, 2];

/// PPU mode, encoded as STAT bits 0-1.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    DataTransfer = 3,
}

impl Mode {
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::HBlank,
            1 => Self::VBlank,
            2 => Self::OamSearch,
            _ => Self::DataTransfer,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// OAM is locked to the CPU while the PPU is scanning or drawing.
    #[inline]
    pub const fn locks_oam(self) -> bool {
        matches!(self, Self::OamSearch | Self::DataTransfer)
    }
}

/// Extra data-transfer dots caused by `SCX % 8`.
#[inline]
pub fn scx_penalty(scx: u8) -> u32 {
    SCX_PENALTY[(scx % 8) as usize]
}

/// Counter reload when entering `mode` with the given SCX.
pub fn mode_length(mode: Mode, scx: u8) -> u32 {
    match mode {
        Mode::OamSearch => OAM_SEARCH_DOTS,
        Mode::DataTransfer => DATA_TRANSFER_DOTS + scx_penalty(scx),
        Mode::HBlank => HBLANK_DOTS - scx_penalty(scx),
        Mode::VBlank => VBLANK_LINE_DOTS,
    }
}

/// What happens when the dot counter of the current mode expires.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Start of a visible line, either after HBlank or after the last VBlank line.
    OamSearch { ly: u8 },
    DataTransfer,
    /// The line that just finished data transfer is drawn on this edge.
    HBlank,
    /// First VBlank line (LY = 144).
    VBlank { ly: u8 },
    /// Next line inside VBlank; the mode does not change.
    VBlankLine { ly: u8 },
}

impl Transition {
    pub fn mode(self) -> Mode {
        match self {
            Self::OamSearch { .. } => Mode::OamSearch,
            Self::DataTransfer => Mode::DataTransfer,
            Self::HBlank => Mode::HBlank,
            Self::VBlank { .. } | Self::VBlankLine { .. } => Mode::VBlank,
        }
    }

    /// New LY if this transition advances the line.
    pub fn line(self) -> Option<u8> {
        match self {
            Self::OamSearch { ly } | Self::VBlank { ly } | Self::VBlankLine { ly } => Some(ly),
            Self::DataTransfer | Self::HBlank => None,
        }
    }
}

/// Transition taken when the counter of `mode` reaches zero on line `ly`.
pub fn next(mode: Mode, ly: u8) -> Transition {
    match mode {
        Mode::OamSearch => Transition::DataTransfer,
        Mode::DataTransfer => Transition::HBlank,
        Mode::HBlank => {
            let ly = ly.wrapping_add(1);
            if ly < VISIBLE_LINES {
                Transition::OamSearch { ly }
            } else {
                Transition::VBlank { ly }
            }
        }
        Mode::VBlank => {
            if ly >= LAST_LINE {
                Transition::OamSearch { ly: 0 }
            } else {
                Transition::VBlankLine { ly: ly + 1 }
            }
        }
    }
}
