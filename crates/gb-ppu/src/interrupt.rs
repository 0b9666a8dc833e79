//! Interrupt helper types.

/// Interrupt sources owned by the PPU, by IF bit position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
}

impl Interrupt {
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Receiver for interrupt requests raised by the PPU.
///
/// The interrupt controller owns the IF register; the PPU only ever sets bits
/// in it and never clears them.
pub trait InterruptSink {
    fn raise(&mut self, interrupt: Interrupt);
}

impl InterruptSink for u8 {
    #[inline]
    fn raise(&mut self, interrupt: Interrupt) {
        *self |= interrupt.bit();
    }
}
