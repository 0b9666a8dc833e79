//! Dot-accurate DMG picture processing unit.
//!
//! [`ppu::Ppu`] owns VRAM, OAM, the LCD registers and the frame buffer. The
//! machine calls [`ppu::Ppu::step`] once per dot and passes in whatever holds
//! the IF register; [`bus::Bus`] is a minimal decoder for the PPU's slice of
//! the address space.

pub mod bus;
pub mod interrupt;
pub mod ppu;
