use crate::errors::VmError;

/// how deep subroutines can nest
pub const STACK_DEPTH: usize = 16;

/// return addresses for 2nnn/00EE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    frames: [u16; STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            frames: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    pub fn reset(&mut self) {
        self.sp = 0;
        self.frames = [0; STACK_DEPTH];
    }

    pub fn push(&mut self, addr: u16) -> Result<(), VmError> {
        if self.sp >= STACK_DEPTH {
            return Err(VmError::StackOverflow);
        }
        self.frames[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, VmError> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.frames[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }

    /// return addresses, outermost first
    pub fn frames(&self) -> &[u16] {
        &self.frames[..self.sp]
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
