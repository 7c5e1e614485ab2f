//! Opcode metadata for the 8080.
//!
//! A fixed 256-entry table giving each opcode byte its mnemonic,
//! encoded length (1-3 bytes) and base cycle cost. The execute loop
//! charges the base cost and adds the taken-branch surcharge itself;
//! trace output uses the mnemonics. Undocumented slots keep their raw
//! hex value as the name.

/// Descriptive metadata for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Assembler mnemonic, with fixed operands baked in.
    pub name: &'static str,
    /// Total encoded length including the opcode byte.
    pub length: u8,
    /// Base cycle cost (taken CALL/RET branches cost extra).
    pub cycles: u32,
}

const fn op(name: &'static str, length: u8, cycles: u32) -> OpcodeInfo {
    OpcodeInfo { name, length, cycles }
}

/// Mnemonic for `opcode`.
#[inline]
pub fn name(opcode: u8) -> &'static str {
    OPCODES[opcode as usize].name
}

/// Encoded length of `opcode` in bytes.
#[inline]
pub fn length(opcode: u8) -> u8 {
    OPCODES[opcode as usize].length
}

/// Base cycle cost of `opcode`.
#[inline]
pub fn cycles(opcode: u8) -> u32 {
    OPCODES[opcode as usize].cycles
}

/// Metadata for all 256 opcode byte values, indexed by the byte.
pub static OPCODES: [OpcodeInfo; 256] = [
    op("NOP", 1, 4),       // 0x00
    op("LXI B", 3, 10),    // 0x01
    op("STAX B", 1, 7),    // 0x02
    op("INX B", 1, 5),     // 0x03
    op("INR B", 1, 5),     // 0x04
    op("DCR B", 1, 5),     // 0x05
    op("MVI B", 2, 7),     // 0x06
    op("RLC", 1, 4),       // 0x07
    op("0x08", 1, 4),      // 0x08
    op("DAD B", 1, 10),    // 0x09
    op("LDAX B", 1, 7),    // 0x0A
    op("DCX B", 1, 5),     // 0x0B
    op("INR C", 1, 5),     // 0x0C
    op("DCR C", 1, 5),     // 0x0D
    op("MVI C", 2, 7),     // 0x0E
    op("RRC", 1, 4),       // 0x0F
    op("0x10", 1, 4),      // 0x10
    op("LXI D", 3, 10),    // 0x11
    op("STAX D", 1, 7),    // 0x12
    op("INX D", 1, 5),     // 0x13
    op("INR D", 1, 5),     // 0x14
    op("DCR D", 1, 5),     // 0x15
    op("MVI D", 2, 7),     // 0x16
    op("RAL", 1, 4),       // 0x17
    op("0x18", 1, 4),      // 0x18
    op("DAD D", 1, 10),    // 0x19
    op("LDAX D", 1, 7),    // 0x1A
    op("DCX D", 1, 5),     // 0x1B
    op("INR E", 1, 5),     // 0x1C
    op("DCR E", 1, 5),     // 0x1D
    op("MVI E", 2, 7),     // 0x1E
    op("RAR", 1, 4),       // 0x1F
    op("0x20", 1, 4),      // 0x20
    op("LXI H", 3, 10),    // 0x21
    op("SHLD", 3, 16),     // 0x22
    op("INX H", 1, 5),     // 0x23
    op("INR H", 1, 5),     // 0x24
    op("DCR H", 1, 5),     // 0x25
    op("MVI H", 2, 7),     // 0x26
    op("DAA", 1, 4),       // 0x27
    op("0x28", 1, 4),      // 0x28
    op("DAD H", 1, 10),    // 0x29
    op("LHLD", 3, 16),     // 0x2A
    op("DCX H", 1, 5),     // 0x2B
    op("INR L", 1, 5),     // 0x2C
    op("DCR L", 1, 5),     // 0x2D
    op("MVI L", 2, 7),     // 0x2E
    op("CMA", 1, 4),       // 0x2F
    op("0x30", 1, 4),      // 0x30
    op("LXI SP", 3, 10),   // 0x31
    op("STA", 3, 13),      // 0x32
    op("INX SP", 1, 5),    // 0x33
    op("INR M", 1, 10),    // 0x34
    op("DCR M", 1, 10),    // 0x35
    op("MVI M", 2, 10),    // 0x36
    op("STC", 1, 4),       // 0x37
    op("0x38", 1, 4),      // 0x38
    op("DAD SP", 1, 10),   // 0x39
    op("LDA", 3, 13),      // 0x3A
    op("DCX SP", 1, 5),    // 0x3B
    op("INR A", 1, 5),     // 0x3C
    op("DCR A", 1, 5),     // 0x3D
    op("MVI A", 2, 7),     // 0x3E
    op("CMC", 1, 4),       // 0x3F
    op("MOV B, B", 1, 5),  // 0x40
    op("MOV B, C", 1, 5),  // 0x41
    op("MOV B, D", 1, 5),  // 0x42
    op("MOV B, E", 1, 5),  // 0x43
    op("MOV B, H", 1, 5),  // 0x44
    op("MOV B, L", 1, 5),  // 0x45
    op("MOV B, M", 1, 7),  // 0x46
    op("MOV B, A", 1, 5),  // 0x47
    op("MOV C, B", 1, 5),  // 0x48
    op("MOV C, C", 1, 5),  // 0x49
    op("MOV C, D", 1, 5),  // 0x4A
    op("MOV C, E", 1, 5),  // 0x4B
    op("MOV C, H", 1, 5),  // 0x4C
    op("MOV C, L", 1, 5),  // 0x4D
    op("MOV C, M", 1, 7),  // 0x4E
    op("MOV C, A", 1, 5),  // 0x4F
    op("MOV D, B", 1, 5),  // 0x50
    op("MOV D, C", 1, 5),  // 0x51
    op("MOV D, D", 1, 5),  // 0x52
    op("MOV D, E", 1, 5),  // 0x53
    op("MOV D, H", 1, 5),  // 0x54
    op("MOV D, L", 1, 5),  // 0x55
    op("MOV D, M", 1, 7),  // 0x56
    op("MOV D, A", 1, 5),  // 0x57
    op("MOV E, B", 1, 5),  // 0x58
    op("MOV E, C", 1, 5),  // 0x59
    op("MOV E, D", 1, 5),  // 0x5A
    op("MOV E, E", 1, 5),  // 0x5B
    op("MOV E, H", 1, 5),  // 0x5C
    op("MOV E, L", 1, 5),  // 0x5D
    op("MOV E, M", 1, 7),  // 0x5E
    op("MOV E, A", 1, 5),  // 0x5F
    op("MOV H, B", 1, 5),  // 0x60
    op("MOV H, C", 1, 5),  // 0x61
    op("MOV H, D", 1, 5),  // 0x62
    op("MOV H, E", 1, 5),  // 0x63
    op("MOV H, H", 1, 5),  // 0x64
    op("MOV H, L", 1, 5),  // 0x65
    op("MOV H, M", 1, 7),  // 0x66
    op("MOV H, A", 1, 5),  // 0x67
    op("MOV L, B", 1, 5),  // 0x68
    op("MOV L, C", 1, 5),  // 0x69
    op("MOV L, D", 1, 5),  // 0x6A
    op("MOV L, E", 1, 5),  // 0x6B
    op("MOV L, H", 1, 5),  // 0x6C
    op("MOV L, L", 1, 5),  // 0x6D
    op("MOV L, M", 1, 7),  // 0x6E
    op("MOV L, A", 1, 5),  // 0x6F
    op("MOV M, B", 1, 7),  // 0x70
    op("MOV M, C", 1, 7),  // 0x71
    op("MOV M, D", 1, 7),  // 0x72
    op("MOV M, E", 1, 7),  // 0x73
    op("MOV M, H", 1, 7),  // 0x74
    op("MOV M, L", 1, 7),  // 0x75
    op("HLT", 1, 7),       // 0x76
    op("MOV M, A", 1, 7),  // 0x77
    op("MOV A, B", 1, 5),  // 0x78
    op("MOV A, C", 1, 5),  // 0x79
    op("MOV A, D", 1, 5),  // 0x7A
    op("MOV A, E", 1, 5),  // 0x7B
    op("MOV A, H", 1, 5),  // 0x7C
    op("MOV A, L", 1, 5),  // 0x7D
    op("MOV A, M", 1, 7),  // 0x7E
    op("MOV A, A", 1, 5),  // 0x7F
    op("ADD B", 1, 4),     // 0x80
    op("ADD C", 1, 4),     // 0x81
    op("ADD D", 1, 4),     // 0x82
    op("ADD E", 1, 4),     // 0x83
    op("ADD H", 1, 4),     // 0x84
    op("ADD L", 1, 4),     // 0x85
    op("ADD M", 1, 7),     // 0x86
    op("ADD A", 1, 4),     // 0x87
    op("ADC B", 1, 4),     // 0x88
    op("ADC C", 1, 4),     // 0x89
    op("ADC D", 1, 4),     // 0x8A
    op("ADC E", 1, 4),     // 0x8B
    op("ADC H", 1, 4),     // 0x8C
    op("ADC L", 1, 4),     // 0x8D
    op("ADC M", 1, 7),     // 0x8E
    op("ADC A", 1, 4),     // 0x8F
    op("SUB B", 1, 4),     // 0x90
    op("SUB C", 1, 4),     // 0x91
    op("SUB D", 1, 4),     // 0x92
    op("SUB E", 1, 4),     // 0x93
    op("SUB H", 1, 4),     // 0x94
    op("SUB L", 1, 4),     // 0x95
    op("SUB M", 1, 7),     // 0x96
    op("SUB A", 1, 4),     // 0x97
    op("SBB B", 1, 4),     // 0x98
    op("SBB C", 1, 4),     // 0x99
    op("SBB D", 1, 4),     // 0x9A
    op("SBB E", 1, 4),     // 0x9B
    op("SBB H", 1, 4),     // 0x9C
    op("SBB L", 1, 4),     // 0x9D
    op("SBB M", 1, 7),     // 0x9E
    op("SBB A", 1, 4),     // 0x9F
    op("ANA B", 1, 4),     // 0xA0
    op("ANA C", 1, 4),     // 0xA1
    op("ANA D", 1, 4),     // 0xA2
    op("ANA E", 1, 4),     // 0xA3
    op("ANA H", 1, 4),     // 0xA4
    op("ANA L", 1, 4),     // 0xA5
    op("ANA M", 1, 7),     // 0xA6
    op("ANA A", 1, 4),     // 0xA7
    op("XRA B", 1, 4),     // 0xA8
    op("XRA C", 1, 4),     // 0xA9
    op("XRA D", 1, 4),     // 0xAA
    op("XRA E", 1, 4),     // 0xAB
    op("XRA H", 1, 4),     // 0xAC
    op("XRA L", 1, 4),     // 0xAD
    op("XRA M", 1, 7),     // 0xAE
    op("XRA A", 1, 4),     // 0xAF
    op("ORA B", 1, 4),     // 0xB0
    op("ORA C", 1, 4),     // 0xB1
    op("ORA D", 1, 4),     // 0xB2
    op("ORA E", 1, 4),     // 0xB3
    op("ORA H", 1, 4),     // 0xB4
    op("ORA L", 1, 4),     // 0xB5
    op("ORA M", 1, 7),     // 0xB6
    op("ORA A", 1, 4),     // 0xB7
    op("CMP B", 1, 4),     // 0xB8
    op("CMP C", 1, 4),     // 0xB9
    op("CMP D", 1, 4),     // 0xBA
    op("CMP E", 1, 4),     // 0xBB
    op("CMP H", 1, 4),     // 0xBC
    op("CMP L", 1, 4),     // 0xBD
    op("CMP M", 1, 7),     // 0xBE
    op("CMP A", 1, 4),     // 0xBF
    op("RNZ", 1, 11),      // 0xC0
    op("POP B", 1, 10),    // 0xC1
    op("JNZ", 3, 10),      // 0xC2
    op("JMP", 3, 10),      // 0xC3
    op("CNZ", 3, 17),      // 0xC4
    op("PUSH B", 1, 11),   // 0xC5
    op("ADI", 2, 7),       // 0xC6
    op("RST 0", 1, 11),    // 0xC7
    op("RZ", 1, 11),       // 0xC8
    op("RET", 1, 10),      // 0xC9
    op("JZ", 3, 10),       // 0xCA
    op("0xcb", 1, 10),     // 0xCB
    op("CZ", 3, 10),       // 0xCC
    op("CALL", 3, 17),     // 0xCD
    op("ACI", 2, 7),       // 0xCE
    op("RST 1", 1, 11),    // 0xCF
    op("RNC", 1, 11),      // 0xD0
    op("POP D", 1, 10),    // 0xD1
    op("JNC", 3, 10),      // 0xD2
    op("OUT", 2, 10),      // 0xD3
    op("CNC", 3, 17),      // 0xD4
    op("PUSH D", 1, 11),   // 0xD5
    op("SUI", 2, 7),       // 0xD6
    op("RST 2", 1, 11),    // 0xD7
    op("RC", 1, 11),       // 0xD8
    op("0xd9", 1, 10),     // 0xD9
    op("JC", 3, 10),       // 0xDA
    op("IN", 2, 10),       // 0xDB
    op("CC", 3, 10),       // 0xDC
    op("0xdd", 3, 17),     // 0xDD
    op("SBI", 2, 7),       // 0xDE
    op("RST 3", 1, 11),    // 0xDF
    op("RPO", 1, 11),      // 0xE0
    op("POP H", 1, 10),    // 0xE1
    op("JPO", 3, 10),      // 0xE2
    op("XTHL", 1, 18),     // 0xE3
    op("CPO", 3, 17),      // 0xE4
    op("PUSH H", 1, 11),   // 0xE5
    op("ANI", 2, 7),       // 0xE6
    op("RST 4", 1, 11),    // 0xE7
    op("RPE", 1, 11),      // 0xE8
    op("PCHL", 1, 5),      // 0xE9
    op("JPE", 3, 10),      // 0xEA
    op("XCHG", 1, 5),      // 0xEB
    op("CPE", 3, 17),      // 0xEC
    op("0xed", 3, 17),     // 0xED
    op("XRI", 2, 7),       // 0xEE
    op("RST 5", 1, 11),    // 0xEF
    op("RP", 1, 11),       // 0xF0
    op("POP PSW", 1, 10),  // 0xF1
    op("JP", 3, 10),       // 0xF2
    op("DI", 1, 4),        // 0xF3
    op("CP", 3, 17),       // 0xF4
    op("PUSH PSW", 1, 11), // 0xF5
    op("ORI", 2, 7),       // 0xF6
    op("RST 6", 1, 11),    // 0xF7
    op("RM", 1, 11),       // 0xF8
    op("SPHL", 1, 5),      // 0xF9
    op("JM", 3, 10),       // 0xFA
    op("EI", 1, 4),        // 0xFB
    op("CM", 3, 17),       // 0xFC
    op("0xfd", 3, 17),     // 0xFD
    op("CPI", 2, 7),       // 0xFE
    op("RST 7", 1, 11),    // 0xFF
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_checks() {
        assert_eq!(name(0x00), "NOP");
        assert_eq!((length(0x00), cycles(0x00)), (1, 4));

        assert_eq!(name(0x41), "MOV B, C");
        assert_eq!(name(0x76), "HLT");

        assert_eq!((name(0xc3), length(0xc3), cycles(0xc3)), ("JMP", 3, 10));
        assert_eq!((name(0xcd), length(0xcd), cycles(0xcd)), ("CALL", 3, 17));
        assert_eq!((name(0xe3), cycles(0xe3)), ("XTHL", 18));
        assert_eq!((name(0xfe), length(0xfe)), ("CPI", 2));
    }

    #[test]
    fn test_lengths_are_sane() {
        for info in OPCODES.iter() {
            assert!((1..=3).contains(&info.length), "{} has length {}", info.name, info.length);
            assert!(info.cycles >= 4, "{} has cycle cost {}", info.name, info.cycles);
        }
    }

    #[test]
    fn test_immediate_forms_are_two_bytes() {
        for opcode in [0xc6u8, 0xce, 0xd6, 0xde, 0xe6, 0xee, 0xf6, 0xfe, 0xdb, 0xd3] {
            assert_eq!(length(opcode), 2, "{}", name(opcode));
        }
    }

    #[test]
    fn test_word_forms_are_three_bytes() {
        for opcode in [0x01u8, 0x11, 0x21, 0x31, 0x22, 0x2a, 0x32, 0x3a, 0xc3, 0xcd] {
            assert_eq!(length(opcode), 3, "{}", name(opcode));
        }
    }
}
