//! Condition-code (flags) register.
//!
//! Five bits of processor status: Zero, Sign, Parity, Carry and
//! Auxiliary Carry. Every ALU family updates a fixed subset of them,
//! encoded here as policy methods so the execute loop never hand-picks
//! flags at a call site.

use serde::{Serialize, Deserialize};

/// The five 8080 condition bits.
///
/// Packed into a byte (for the PSW pair) the layout is, from bit 7
/// down: `S Z 0 AC 0 P 1 CY`. Bit 1 always reads 1; bits 3 and 5
/// always read 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Z: the 8-bit result was zero.
    pub zero: bool,

    /// S: bit 7 of the 8-bit result was set.
    pub sign: bool,

    /// P: the 8-bit result had an even number of set bits.
    pub parity: bool,

    /// CY: carry out of bit 7 (addition) or borrow (subtraction),
    /// always taken from the pre-truncation intermediate result.
    pub carry: bool,

    /// AC: carry out of / borrow into bit 3. Consumed by DAA.
    pub aux_carry: bool,
}

/// Bit positions inside the PSW byte.
const SIGN_BIT: u8 = 0x80;
const ZERO_BIT: u8 = 0x40;
const AUX_CARRY_BIT: u8 = 0x10;
const PARITY_BIT: u8 = 0x04;
const CARRY_BIT: u8 = 0x01;

/// Mask applied on every write through the PSW pair: keeps the five
/// condition bits, forces bit 1 set and bits 3/5 clear.
const PSW_MASK: u8 = 0xd5;
const PSW_FIXED: u8 = 0x02;

impl Flags {
    /// Create a flags register with all condition bits clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all condition bits.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set Z from the truncated 8-bit result.
    #[inline]
    pub fn set_zero(&mut self, result: u8) {
        self.zero = result == 0;
    }

    /// Set S from bit 7 of the truncated 8-bit result.
    #[inline]
    pub fn set_sign(&mut self, result: u8) {
        self.sign = result & 0x80 != 0;
    }

    /// Set P from the population count of the truncated 8-bit result.
    #[inline]
    pub fn set_parity(&mut self, result: u8) {
        self.parity = result.count_ones() & 1 == 0;
    }

    /// Set CY directly (rotates, STC/CMC, DAD and DAA compute it
    /// themselves).
    #[inline]
    pub fn set_carry(&mut self, carry: bool) {
        self.carry = carry;
    }

    /// Set AC directly; the ALU derives it from the operand nibbles.
    #[inline]
    pub fn set_aux_carry(&mut self, aux_carry: bool) {
        self.aux_carry = aux_carry;
    }

    /// Policy for the add/subtract family: all five flags.
    ///
    /// `answer` is the unmasked 16-bit intermediate. For additions it
    /// exceeds 0xFF exactly on a carry out of bit 7; for subtractions
    /// computed with wrapping 16-bit arithmetic it exceeds 0xFF exactly
    /// when the minuend was smaller than the subtrahend.
    pub fn set_all(&mut self, answer: u16, aux_carry: bool) {
        self.set_zsp(answer as u8);
        self.carry = answer > 0xff;
        self.aux_carry = aux_carry;
    }

    /// Policy for INR/DCR: every flag except CY, which those
    /// instructions never touch.
    pub fn set_all_except_carry(&mut self, result: u8, aux_carry: bool) {
        self.set_zsp(result);
        self.aux_carry = aux_carry;
    }

    /// Policy for operations that leave AC alone but recompute CY from
    /// the unmasked intermediate.
    pub fn set_all_except_aux_carry(&mut self, answer: u16) {
        self.set_zsp(answer as u8);
        self.carry = answer > 0xff;
    }

    #[inline]
    fn set_zsp(&mut self, result: u8) {
        self.set_zero(result);
        self.set_sign(result);
        self.set_parity(result);
    }

    /// Pack the flags into the low byte of the PSW pair.
    pub fn to_byte(self) -> u8 {
        let mut byte = PSW_FIXED;
        if self.sign {
            byte |= SIGN_BIT;
        }
        if self.zero {
            byte |= ZERO_BIT;
        }
        if self.aux_carry {
            byte |= AUX_CARRY_BIT;
        }
        if self.parity {
            byte |= PARITY_BIT;
        }
        if self.carry {
            byte |= CARRY_BIT;
        }
        byte
    }

    /// Unpack a PSW byte. The reserved bits are discarded, so a
    /// subsequent `to_byte` always reports them in their fixed state.
    pub fn from_byte(byte: u8) -> Self {
        let byte = byte & PSW_MASK | PSW_FIXED;
        Self {
            sign: byte & SIGN_BIT != 0,
            zero: byte & ZERO_BIT != 0,
            aux_carry: byte & AUX_CARRY_BIT != 0,
            parity: byte & PARITY_BIT != 0,
            carry: byte & CARRY_BIT != 0,
        }
    }
}

impl std::fmt::Display for Flags {
    /// Compact `SZAPC` rendering used by trace output: a letter for a
    /// set flag, a dot for a clear one.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            if self.sign { 'S' } else { '.' },
            if self.zero { 'Z' } else { '.' },
            if self.aux_carry { 'A' } else { '.' },
            if self.parity { 'P' } else { '.' },
            if self.carry { 'C' } else { '.' },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_exhaustive() {
        let mut flags = Flags::new();

        for value in 0..=255u8 {
            flags.set_parity(value);

            let mut ones = 0;
            for bit in 0..8 {
                ones += (value >> bit) & 1;
            }
            assert_eq!(flags.parity, ones % 2 == 0, "parity wrong for {:#04x}", value);
        }
    }

    #[test]
    fn test_zero_and_sign() {
        let mut flags = Flags::new();

        flags.set_zero(0x00);
        assert!(flags.zero);
        flags.set_zero(0x01);
        assert!(!flags.zero);

        flags.set_sign(0x80);
        assert!(flags.sign);
        flags.set_sign(0x7f);
        assert!(!flags.sign);
    }

    #[test]
    fn test_set_all_carry_from_wide_answer() {
        let mut flags = Flags::new();

        // 0xff + 0x01: truncated result 0x00, carry out
        flags.set_all(0x100, false);
        assert!(flags.zero);
        assert!(flags.carry);
        assert!(flags.parity); // 0 set bits is even

        // wrapping 16-bit subtraction result for 0x05 - 0x0a
        flags.set_all(0x05u16.wrapping_sub(0x0a), false);
        assert!(flags.carry);
        assert!(!flags.zero);
    }

    #[test]
    fn test_set_all_except_carry_leaves_carry() {
        let mut flags = Flags::new();
        flags.carry = true;

        flags.set_all_except_carry(0x00, true);

        assert!(flags.carry, "CY must be untouched, not cleared");
        assert!(flags.zero);
        assert!(flags.aux_carry);
    }

    #[test]
    fn test_set_all_except_aux_carry_leaves_aux() {
        let mut flags = Flags::new();
        flags.aux_carry = true;

        flags.set_all_except_aux_carry(0x1fe);

        assert!(flags.aux_carry, "AC must be untouched");
        assert!(flags.carry);
        assert!(flags.sign); // 0xfe
    }

    #[test]
    fn test_psw_reserved_bits() {
        // All-ones input: reserved bits 3 and 5 must read back clear,
        // bit 1 must read back set.
        let flags = Flags::from_byte(0xff);
        assert_eq!(flags.to_byte(), 0xd7);

        let flags = Flags::from_byte(0x00);
        assert_eq!(flags.to_byte(), 0x02);
    }

    #[test]
    fn test_psw_roundtrip_masks() {
        for byte in 0..=255u8 {
            let roundtripped = Flags::from_byte(byte).to_byte();
            assert_eq!(roundtripped, byte & 0xd5 | 0x02);
        }
    }

    #[test]
    fn test_display() {
        let mut flags = Flags::new();
        assert_eq!(flags.to_string(), ".....");

        flags.sign = true;
        flags.carry = true;
        assert_eq!(flags.to_string(), "S...C");
    }
}
