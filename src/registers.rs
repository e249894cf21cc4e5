use crate::memory::PROGRAM_ADDR;

/// number of general purpose V registers
pub const REG_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REG: usize = 0xf;

/// V0-VF, I and the program counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    pub v: [u8; REG_COUNT],
    pub i: u16,
    pub pc: u16,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            v: [0; REG_COUNT],
            i: 0,
            pc: PROGRAM_ADDR,
        }
    }

    pub fn reset(&mut self) {
        *self = RegisterFile::new();
    }

    /// Vx; x is a nibble so this never goes out of range
    pub fn get(&self, x: u8) -> u8 {
        self.v[(x & 0x0f) as usize]
    }

    pub fn set(&mut self, x: u8, value: u8) {
        self.v[(x & 0x0f) as usize] = value;
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REG] = flag as u8;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG_REG]
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
