/// a decoded CHIP-8 instruction word
///
/// field naming follows Cowgod's reference: `x`/`y` are register nibbles,
/// `kk` an immediate byte, `nnn` a 12-bit address and `n` a nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk
    AddImm { x: u8, kk: u8 },
    /// 8xy0 - 8xyE
    Alu { op: AluOp, x: u8, y: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadI { nnn: u16 },
    /// Bnnn
    JumpOffset { nnn: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: u8 },
    /// ExA1
    SkipKeyNotPressed { x: u8 },
    /// Fx07
    GetDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddI { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegs { x: u8 },
    /// Fx65
    LoadRegs { x: u8 },
    /// anything else, including 0nnn machine-code calls
    Unknown(u16),
}

/// register-to-register operations of the 8xyN family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReversed,
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<AluOp> {
        match n {
            0x0 => Some(AluOp::Assign),
            0x1 => Some(AluOp::Or),
            0x2 => Some(AluOp::And),
            0x3 => Some(AluOp::Xor),
            0x4 => Some(AluOp::Add),
            0x5 => Some(AluOp::Sub),
            0x6 => Some(AluOp::ShiftRight),
            0x7 => Some(AluOp::SubReversed),
            0xe => Some(AluOp::ShiftLeft),
            _ => None,
        }
    }
}

impl Instruction {
    pub fn decode(word: u16) -> Instruction {
        let class = (word >> 12) as u8;
        let x = ((word >> 8) & 0xf) as u8;
        let y = ((word >> 4) & 0xf) as u8;
        let n = (word & 0xf) as u8;
        let kk = (word & 0xff) as u8;
        let nnn = word & 0x0fff;

        match (class, x, y, n) {
            (0x0, 0x0, 0xe, 0x0) => Instruction::ClearScreen,
            (0x0, 0x0, 0xe, 0xe) => Instruction::Return,
            (0x1, ..) => Instruction::Jump { nnn },
            (0x2, ..) => Instruction::Call { nnn },
            (0x3, ..) => Instruction::SkipEqImm { x, kk },
            (0x4, ..) => Instruction::SkipNeImm { x, kk },
            (0x5, _, _, 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, ..) => Instruction::LoadImm { x, kk },
            (0x7, ..) => Instruction::AddImm { x, kk },
            (0x8, _, _, op) => match AluOp::from_nibble(op) {
                Some(op) => Instruction::Alu { op, x, y },
                None => Instruction::Unknown(word),
            },
            (0x9, _, _, 0x0) => Instruction::SkipNeReg { x, y },
            (0xa, ..) => Instruction::LoadI { nnn },
            (0xb, ..) => Instruction::JumpOffset { nnn },
            (0xc, ..) => Instruction::Random { x, kk },
            (0xd, ..) => Instruction::Draw { x, y, n },
            (0xe, ..) => match kk {
                0x9e => Instruction::SkipKeyPressed { x },
                0xa1 => Instruction::SkipKeyNotPressed { x },
                _ => Instruction::Unknown(word),
            },
            (0xf, ..) => match kk {
                0x07 => Instruction::GetDelay { x },
                0x0a => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1e => Instruction::AddI { x },
                0x29 => Instruction::LoadGlyph { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegs { x },
                0x65 => Instruction::LoadRegs { x },
                _ => Instruction::Unknown(word),
            },
            _ => Instruction::Unknown(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        assert_eq!(Instruction::decode(0xa4c3), Instruction::LoadI { nnn: 0x4c3 });
        assert_eq!(
            Instruction::decode(0xd01f),
            Instruction::Draw { x: 0, y: 1, n: 0xf }
        );
        assert_eq!(
            Instruction::decode(0x7c11),
            Instruction::AddImm { x: 0xc, kk: 0x11 }
        );
        assert_eq!(
            Instruction::decode(0x8ab4),
            Instruction::Alu { op: AluOp::Add, x: 0xa, y: 0xb }
        );
        assert_eq!(Instruction::decode(0xf265), Instruction::LoadRegs { x: 2 });
    }

    #[test]
    fn test_decode_system() {
        assert_eq!(Instruction::decode(0x00e0), Instruction::ClearScreen);
        assert_eq!(Instruction::decode(0x00ee), Instruction::Return);
        assert_eq!(Instruction::decode(0x0123), Instruction::Unknown(0x0123));
        assert_eq!(Instruction::decode(0x0000), Instruction::Unknown(0x0000));
    }

    #[test]
    fn test_decode_unused_patterns() {
        for word in [0x5121, 0x9ab1, 0x8008, 0x800f, 0xe19f, 0xf0ff, 0xf019] {
            assert_eq!(Instruction::decode(word), Instruction::Unknown(word));
        }
    }

    #[test]
    fn test_every_word_decodes() {
        // NB. the decoder is total; make sure no arm panics
        for word in 0..=u16::MAX {
            let _ = Instruction::decode(word);
        }
    }
}
