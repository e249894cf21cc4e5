use std::io;
use thiserror::Error;

/// everything that can go wrong inside the machine itself
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    #[error("program of {len} bytes does not fit in the {available} bytes of program memory")]
    Load { len: usize, available: usize },
    #[error("address 0x{0:04x} is outside addressable memory")]
    Address(u16),
    #[error("call stack overflow")]
    StackOverflow,
    #[error("call stack underflow")]
    StackUnderflow,
    #[error("unknown opcode 0x{0:04x}")]
    UnknownOpcode(u16),
    #[error("key index {0} is not on the keypad")]
    InvalidKey(u8),
    #[error("machine is halted")]
    Halted,
}

impl VmError {
    /// whether the machine can carry on after this error under a lenient policy
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VmError::UnknownOpcode(_))
    }
}

/// a fatal error raised by a cycle, along with where it happened
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{error} (pc 0x{pc:03x}, opcode {})", fmt_opcode(.opcode))]
pub struct Fault {
    pub pc: u16,
    pub opcode: Option<u16>,
    #[source]
    pub error: VmError,
}

fn fmt_opcode(opcode: &Option<u16>) -> String {
    match opcode {
        Some(op) => format!("0x{:04x}", op),
        None => "n/a".to_string(),
    }
}

/// failures of the host loop driving a machine
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Vm(#[from] VmError),
    #[error("sound error: {0}")]
    Sound(String),
    #[error("display wants {wants} bytes a frame, the framebuffer has {has}")]
    DisplaySize { wants: usize, has: usize },
    #[error("machine fault: {0}")]
    Fault(#[from] Fault),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unknown_opcode_is_recoverable() {
        assert!(VmError::UnknownOpcode(0x5121).is_recoverable());
        assert!(!VmError::StackOverflow.is_recoverable());
        assert!(!VmError::Address(0x1000).is_recoverable());
    }

    #[test]
    fn test_fault_message_has_context() {
        let f = Fault {
            pc: 0x20a,
            opcode: Some(0x00ee),
            error: VmError::StackUnderflow,
        };
        assert_eq!(
            f.to_string(),
            "call stack underflow (pc 0x20a, opcode 0x00ee)"
        );
    }
}
