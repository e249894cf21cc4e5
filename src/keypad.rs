use crate::errors::VmError;

/// number of keys on the hex keypad
pub const KEY_COUNT: u8 = 16;

/// state of the 16-key hex keypad, one bit per key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyMatrix {
    pressed: u16,
    /// keys that went from up to down since `clear_fresh`
    fresh: u16,
}

impl KeyMatrix {
    pub fn new() -> Self {
        KeyMatrix::default()
    }

    pub fn set_key(&mut self, index: u8, pressed: bool) -> Result<(), VmError> {
        if index >= KEY_COUNT {
            return Err(VmError::InvalidKey(index));
        }
        let bit = 1 << index;
        if pressed {
            if self.pressed & bit == 0 {
                self.fresh |= bit;
            }
            self.pressed |= bit;
        } else {
            self.pressed &= !bit;
        }
        Ok(())
    }

    /// only the low nibble of the index counts, as on the VIP
    pub fn is_pressed(&self, index: u8) -> bool {
        self.pressed & (1 << (index & 0x0f)) != 0
    }

    /// forget every press seen so far; keys that stay down don't count
    /// again until they are released and pressed
    pub fn clear_fresh(&mut self) {
        self.fresh = 0;
    }

    /// lowest key pressed since `clear_fresh`, even if it has been let go
    /// again since; consumes every press recorded so far
    pub fn take_fresh(&mut self) -> Option<u8> {
        let fresh = std::mem::replace(&mut self.fresh, 0);
        if fresh == 0 {
            None
        } else {
            Some(fresh.trailing_zeros() as u8)
        }
    }
}
