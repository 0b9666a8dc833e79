use crate::ppu::Ppu;

/// Address decoding for the PPU's part of the memory map, plus the IF
/// register it raises interrupts into.
pub struct Bus {
    pub ppu: Ppu,
    pub iflag: u8,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ppu: Ppu::new(),
            iflag: 0,
        }
    }

    pub fn read8(&self, addr: u16) -> u8 {
        match addr {
            // VRAM: 0x8000..=0x9FFF
            0x8000..=0x9FFF => self.ppu.read_vram((addr - 0x8000) as usize),

            // OAM: 0xFE00..=0xFE9F
            0xFE00..=0xFE9F => self.ppu.read_oam((addr - 0xFE00) as usize),

            0xFF0F => self.iflag | 0xE0,

            // LCD registers: 0xFF40..=0xFF4B
            0xFF40..=0xFF4B => self.ppu.read_register(addr),

            _ => 0xFF,
        }
    }

    pub fn write8(&mut self, addr: u16, val: u8) {
        match addr {
            0x8000..=0x9FFF => self.ppu.write_vram((addr - 0x8000) as usize, val),
            0xFE00..=0xFE9F => self.ppu.write_oam((addr - 0xFE00) as usize, val),
            0xFF0F => self.iflag = val & 0x1F,
            0xFF40..=0xFF4B => self.ppu.write_register(addr, val),
            _ => {}
        }
    }

    pub fn tick(&mut self, dots: u32) {
        self.ppu.tick(dots, &mut self.iflag);
    }

    /// Runs until the PPU enters VBlank, returning the dots elapsed.
    ///
    /// Returns 0 immediately if the LCD is off, since no frame will complete.
    pub fn run_frame(&mut self) -> u32 {
        if !self.ppu.registers().lcd_enabled() {
            return 0;
        }

        let mut dots = 0;
        while !self.ppu.frame_ready() {
            self.ppu.step(&mut self.iflag);
            dots += 1;
        }
        self.ppu.clear_frame_ready();
        dots
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
