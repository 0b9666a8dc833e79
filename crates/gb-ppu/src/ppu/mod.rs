pub const LCD_WIDTH: usize = 160;
pub const LCD_HEIGHT: usize = 144;
pub const FRAMEBUFFER_LEN: usize = LCD_WIDTH * LCD_HEIGHT;

pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;

/// One frame of palette-mapped shades (0-3), row-major.
pub type Framebuffer = [u8; FRAMEBUFFER_LEN];

pub mod export;
pub mod oam;
#[allow(clippy::module_inception)]
pub mod ppu;
pub mod registers;
pub mod render;
pub mod tiles;
pub mod timing;

pub use ppu::Ppu;
pub use registers::{Lcdc, Registers, Stat};
pub use timing::Mode;
