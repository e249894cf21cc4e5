use crate::errors::VmError;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents a flat, bounds-checked memory map
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], VmError>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], VmError>;

    fn read8(&self, addr: u16) -> Result<u8, VmError> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// big-endian: high byte at addr, low byte at addr + 1
    fn read16(&self, addr: u16) -> Result<u16, VmError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), VmError> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), VmError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// font glyphs live at the very bottom of memory, 5 bytes apiece
pub const FONT_ADDR: u16 = 0x0000;
pub const FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 4K memory map
///   0x0000-0x004f  font glyphs 0-F
///   0x0050-0x01ff  interpreter (unused)
///   0x0200-0x0fff  program and data
pub struct Chip8Memory {
    bytes: Box<[u8; RAM_SIZE_BYTES]>,
}

impl MemoryMap for Chip8Memory {
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], VmError> {
        let range = checked_range(addr, len)?;
        Ok(&self.bytes[range])
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], VmError> {
        let range = checked_range(addr, len)?;
        Ok(&mut self.bytes[range])
    }
}

/// the range addr..addr+len, or the first address that falls outside RAM
fn checked_range(addr: u16, len: usize) -> Result<std::ops::Range<usize>, VmError> {
    let start = addr as usize;
    let end = start + len;
    if start >= RAM_SIZE_BYTES {
        return Err(VmError::Address(addr));
    }
    if end > RAM_SIZE_BYTES {
        return Err(VmError::Address(RAM_SIZE_BYTES as u16));
    }
    Ok(start..end)
}

impl Chip8Memory {
    /// fresh memory: zeroed, with the font installed
    pub fn new() -> Self {
        let mut m = Chip8Memory {
            bytes: Box::new([0u8; RAM_SIZE_BYTES]),
        };
        m.reset();
        m
    }

    /// zero everything and re-install the font
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        let font = FONT_ADDR as usize;
        self.bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// how many bytes of program fit between 0x200 and the top of RAM
    pub fn program_capacity(&self) -> usize {
        RAM_SIZE_BYTES - PROGRAM_ADDR as usize
    }

    /// load a CHIP-8 program at 0x200; nothing is written if it won't fit
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), VmError> {
        let available = self.program_capacity();
        if program.len() > available {
            return Err(VmError::Load {
                len: program.len(),
                available,
            });
        }
        self.bytes[PROGRAM_ADDR as usize..].fill(0);
        self.write(program, PROGRAM_ADDR)
    }

    /// address of the glyph for a hex digit; only the low nibble counts
    pub fn glyph_addr(digit: u8) -> u16 {
        FONT_ADDR + (digit & 0x0f) as u16 * FONT_GLYPH_BYTES
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[rustfmt::skip]
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
