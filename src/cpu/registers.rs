//! 8080 CPU registers.
//!
//! The 8080 has 7 byte-wide registers (the accumulator A plus B, C, D,
//! E, H, L) and two word-wide registers (SP, PC). B/C, D/E and H/L can
//! be addressed together as the 16-bit pairs BC, DE and HL. Only the
//! byte registers are stored; pair values are computed on demand so the
//! two views can never disagree.

use serde::{Serialize, Deserialize};

/// The 8080 register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: the accumulator, implicit operand of the 8-bit ALU.
    pub a: u8,

    /// B register (high half of BC).
    pub b: u8,

    /// C register (low half of BC).
    pub c: u8,

    /// D register (high half of DE).
    pub d: u8,

    /// E register (low half of DE).
    pub e: u8,

    /// H register (high half of HL, the memory-operand pointer).
    pub h: u8,

    /// L register (low half of HL).
    pub l: u8,

    /// 16-bit stack pointer.
    pub sp: u16,

    /// 16-bit program counter.
    pub pc: u16,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// B and C combined into the 16-bit pair BC.
    #[inline]
    pub fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    /// D and E combined into the 16-bit pair DE.
    #[inline]
    pub fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    /// H and L combined into the 16-bit pair HL.
    #[inline]
    pub fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    /// Set B and C from the 16-bit pair BC.
    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    /// Set D and E from the 16-bit pair DE.
    #[inline]
    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    /// Set H and L from the 16-bit pair HL.
    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pairs_are_views_over_the_byte_halves() {
        let mut regs = Registers::new();

        regs.set_bc(0x1234);
        assert_eq!(regs.b, 0x12);
        assert_eq!(regs.c, 0x34);

        regs.d = 0xab;
        regs.e = 0xcd;
        assert_eq!(regs.de(), 0xabcd);

        regs.set_hl(0xff00);
        assert_eq!(regs.h, 0xff);
        assert_eq!(regs.l, 0x00);
        assert_eq!(regs.hl(), 0xff00);
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.a = 0x42;
        regs.sp = 0x2400;
        regs.pc = 0x0100;

        regs.reset();

        assert_eq!(regs, Registers::default());
    }

    proptest! {
        #[test]
        fn pair_roundtrip(value in any::<u16>()) {
            let mut regs = Registers::new();

            regs.set_bc(value);
            prop_assert_eq!(regs.bc(), value);
            prop_assert_eq!(regs.b, (value >> 8) as u8);
            prop_assert_eq!(regs.c, value as u8);

            regs.set_de(value);
            prop_assert_eq!(regs.de(), value);

            regs.set_hl(value);
            prop_assert_eq!(regs.hl(), value);
        }
    }
}
