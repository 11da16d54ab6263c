/// Every CHIP-8 operation, selected from the top nibble of an opcode and, for
/// the 0/8/E/F families, a second nibble or byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Clear,            // 00E0
    Return,           // 00EE
    Jump,             // 1nnn
    Call,             // 2nnn
    SkipEqualByte,    // 3xkk
    SkipNotEqualByte, // 4xkk
    SkipEqualReg,     // 5xy0
    LoadByte,         // 6xkk
    AddByte,          // 7xkk
    LoadReg,          // 8xy0
    Or,               // 8xy1
    And,              // 8xy2
    Xor,              // 8xy3
    AddReg,           // 8xy4
    SubReg,           // 8xy5
    ShiftRight,       // 8xy6
    SubN,             // 8xy7
    ShiftLeft,        // 8xyE
    SkipNotEqualReg,  // 9xy0
    LoadI,            // Annn
    JumpOffset,       // Bnnn
    Random,           // Cxkk
    Draw,             // Dxyn
    SkipKey,          // Ex9E
    SkipNotKey,       // ExA1
    LoadDelay,        // Fx07
    WaitKey,          // Fx0A
    SetDelay,         // Fx15
    AddI,             // Fx1E
    LoadGlyph,        // Fx29
    StoreBcd,         // Fx33
    StoreRegs,        // Fx55
    LoadRegs,         // Fx65
    /// anything else; executed as a no-op so programs using extensions keep going
    Unknown,
}

impl Instruction {
    pub fn decode(opcode: u16) -> Self {
        use Instruction::*;
        match (opcode & 0xF000) >> 12 {
            0x0 => match opcode {
                0x00E0 => Clear,
                0x00EE => Return,
                _ => Unknown, // 0nnn, machine code routines
            },
            0x1 => Jump,
            0x2 => Call,
            0x3 => SkipEqualByte,
            0x4 => SkipNotEqualByte,
            0x5 => SkipEqualReg,
            0x6 => LoadByte,
            0x7 => AddByte,
            0x8 => match opcode & 0xF {
                0x0 => LoadReg,
                0x1 => Or,
                0x2 => And,
                0x3 => Xor,
                0x4 => AddReg,
                0x5 => SubReg,
                0x6 => ShiftRight,
                0x7 => SubN,
                0xE => ShiftLeft,
                _ => Unknown,
            },
            0x9 => SkipNotEqualReg,
            0xA => LoadI,
            0xB => JumpOffset,
            0xC => Random,
            0xD => Draw,
            0xE => match opcode & 0xFF {
                0x9E => SkipKey,
                0xA1 => SkipNotKey,
                _ => Unknown,
            },
            0xF => match opcode & 0xFF {
                0x07 => LoadDelay,
                0x0A => WaitKey,
                0x15 => SetDelay,
                0x1E => AddI,
                0x29 => LoadGlyph,
                0x33 => StoreBcd,
                0x55 => StoreRegs,
                0x65 => LoadRegs,
                _ => Unknown,
            },
            _ => unreachable!("a nibble is at most 0xF"),
        }
    }

    /// (mask, value) an opcode must satisfy to belong to this instruction
    fn pattern(self) -> (u16, u16) {
        use Instruction::*;
        match self {
            Clear => (0xFFFF, 0x00E0),
            Return => (0xFFFF, 0x00EE),
            Jump => (0xF000, 0x1000),
            Call => (0xF000, 0x2000),
            SkipEqualByte => (0xF000, 0x3000),
            SkipNotEqualByte => (0xF000, 0x4000),
            SkipEqualReg => (0xF000, 0x5000),
            LoadByte => (0xF000, 0x6000),
            AddByte => (0xF000, 0x7000),
            LoadReg => (0xF00F, 0x8000),
            Or => (0xF00F, 0x8001),
            And => (0xF00F, 0x8002),
            Xor => (0xF00F, 0x8003),
            AddReg => (0xF00F, 0x8004),
            SubReg => (0xF00F, 0x8005),
            ShiftRight => (0xF00F, 0x8006),
            SubN => (0xF00F, 0x8007),
            ShiftLeft => (0xF00F, 0x800E),
            SkipNotEqualReg => (0xF000, 0x9000),
            LoadI => (0xF000, 0xA000),
            JumpOffset => (0xF000, 0xB000),
            Random => (0xF000, 0xC000),
            Draw => (0xF000, 0xD000),
            SkipKey => (0xF0FF, 0xE09E),
            SkipNotKey => (0xF0FF, 0xE0A1),
            LoadDelay => (0xF0FF, 0xF007),
            WaitKey => (0xF0FF, 0xF00A),
            SetDelay => (0xF0FF, 0xF015),
            AddI => (0xF0FF, 0xF01E),
            LoadGlyph => (0xF0FF, 0xF029),
            StoreBcd => (0xF0FF, 0xF033),
            StoreRegs => (0xF0FF, 0xF055),
            LoadRegs => (0xF0FF, 0xF065),
            Unknown => (0x0000, 0x0000),
        }
    }

    pub fn matches(self, opcode: u16) -> bool {
        let (mask, value) = self.pattern();
        opcode & mask == value
    }

    pub fn name(self) -> &'static str {
        use Instruction::*;
        match self {
            Clear => "00E0 CLS",
            Return => "00EE RET",
            Jump => "1nnn JP addr",
            Call => "2nnn CALL addr",
            SkipEqualByte => "3xkk SE Vx, byte",
            SkipNotEqualByte => "4xkk SNE Vx, byte",
            SkipEqualReg => "5xy0 SE Vx, Vy",
            LoadByte => "6xkk LD Vx, byte",
            AddByte => "7xkk ADD Vx, byte",
            LoadReg => "8xy0 LD Vx, Vy",
            Or => "8xy1 OR Vx, Vy",
            And => "8xy2 AND Vx, Vy",
            Xor => "8xy3 XOR Vx, Vy",
            AddReg => "8xy4 ADD Vx, Vy",
            SubReg => "8xy5 SUB Vx, Vy",
            ShiftRight => "8xy6 SHR Vx",
            SubN => "8xy7 SUBN Vx, Vy",
            ShiftLeft => "8xyE SHL Vx",
            SkipNotEqualReg => "9xy0 SNE Vx, Vy",
            LoadI => "Annn LD I, addr",
            JumpOffset => "Bnnn JP V0, addr",
            Random => "Cxkk RND Vx, byte",
            Draw => "Dxyn DRW Vx, Vy, nibble",
            SkipKey => "Ex9E SKP Vx",
            SkipNotKey => "ExA1 SKNP Vx",
            LoadDelay => "Fx07 LD Vx, DT",
            WaitKey => "Fx0A LD Vx, K",
            SetDelay => "Fx15 LD DT, Vx",
            AddI => "Fx1E ADD I, Vx",
            LoadGlyph => "Fx29 LD F, Vx",
            StoreBcd => "Fx33 LD B, Vx",
            StoreRegs => "Fx55 LD [I], Vx",
            LoadRegs => "Fx65 LD Vx, [I]",
            Unknown => "unknown",
        }
    }
}

// operand fields
pub fn x(opcode: u16) -> usize {
    ((opcode & 0x0F00) >> 8) as usize
}

pub fn y(opcode: u16) -> usize {
    ((opcode & 0x00F0) >> 4) as usize
}

pub fn n(opcode: u16) -> usize {
    (opcode & 0x000F) as usize
}

pub fn kk(opcode: u16) -> u8 {
    (opcode & 0x00FF) as u8
}

pub fn nnn(opcode: u16) -> u16 {
    opcode & 0x0FFF
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn test_decode_table() {
        let cases = [
            (0x00E0, Clear),
            (0x00EE, Return),
            (0x1ABC, Jump),
            (0x2ABC, Call),
            (0x330A, SkipEqualByte),
            (0x4A01, SkipNotEqualByte),
            (0x5120, SkipEqualReg),
            (0x6A42, LoadByte),
            (0x7A01, AddByte),
            (0x8120, LoadReg),
            (0x8121, Or),
            (0x8122, And),
            (0x8123, Xor),
            (0x87B4, AddReg),
            (0x87B5, SubReg),
            (0x8126, ShiftRight),
            (0x8127, SubN),
            (0x812E, ShiftLeft),
            (0x9120, SkipNotEqualReg),
            (0xA123, LoadI),
            (0xB123, JumpOffset),
            (0xC1FF, Random),
            (0xD125, Draw),
            (0xE19E, SkipKey),
            (0xE1A1, SkipNotKey),
            (0xF107, LoadDelay),
            (0xF10A, WaitKey),
            (0xF115, SetDelay),
            (0xF11E, AddI),
            (0xF129, LoadGlyph),
            (0xF133, StoreBcd),
            (0xF155, StoreRegs),
            (0xF165, LoadRegs),
        ];
        for &(opcode, expected) in cases.iter() {
            assert_eq!(Instruction::decode(opcode), expected, "{:04X}", opcode);
            assert!(expected.matches(opcode), "{:04X}", opcode);
        }
    }

    #[test]
    fn test_unknown_sub_selectors_are_noops() {
        let opcodes = [
            0x0000u16, 0x0123, 0x00E1, 0x8128, 0x812F, 0xE100, 0xE19F, 0xF100, 0xF118, 0xF1FF,
        ];
        for &opcode in &opcodes {
            assert_eq!(Instruction::decode(opcode), Unknown, "{:04X}", opcode);
        }
    }

    #[test]
    fn test_every_opcode_decodes_to_a_matching_instruction() {
        // decode never fails, and whatever it picks accepts the opcode
        for opcode in 0..=0xFFFFu16 {
            let instruction = Instruction::decode(opcode);
            assert!(instruction.matches(opcode), "{:04X} -> {:?}", opcode, instruction);
        }
    }

    #[test]
    fn test_matches_rejects_other_families() {
        assert!(!Jump.matches(0x2ABC));
        assert!(!AddReg.matches(0x87B5));
        assert!(!Clear.matches(0x00EE));
        assert!(!SkipKey.matches(0xF19E));
        assert!(!StoreRegs.matches(0xF165));
    }

    #[test]
    fn test_operands() {
        assert_eq!(x(0xD12F), 1);
        assert_eq!(y(0xD12F), 2);
        assert_eq!(n(0xD12F), 0xF);
        assert_eq!(kk(0x6A42), 0x42);
        assert_eq!(nnn(0x1ABC), 0xABC);
    }
}
