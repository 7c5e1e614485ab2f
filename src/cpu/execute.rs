//! CPU execution engine for the 8080.
//!
//! Implements the fetch-decode-execute cycle and all instruction
//! behaviors. The 8080 dispatches directly on the opcode byte; per-byte
//! length and cycle metadata lives in [`crate::cpu::opcode`].

use crate::cpu::{Device, Flags, Memory, Registers};
use crate::cpu::memory::MemoryError;
use crate::cpu::opcode;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Clock frequency of the original part, in Hz.
pub const CLOCK_FREQUENCY: u64 = 2_000_000;

/// Length of one pacing slice in milliseconds.
pub const STEP_TIME_MS: u64 = 16;

/// Cycles the original hardware executes per pacing slice.
pub const STEP_CYCLES: u64 = STEP_TIME_MS * CLOCK_FREQUENCY / 1000;

/// Surcharge for a CALL/RET family opcode whose branch predicate holds.
/// The hardware charges extra cycles when the branch is actually taken.
const TAKEN_BRANCH_CYCLES: u32 = 6;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT). Terminal until the host resets.
    Halted,
}

/// The Intel 8080 CPU.
///
/// Owns its memory and register file exclusively; independent instances
/// never share state. One call to [`step`](Cpu::step) executes exactly
/// one instruction to completion.
pub struct Cpu<D: Device> {
    /// CPU registers.
    pub regs: Registers,
    /// Condition codes.
    pub flags: Flags,
    /// Main memory, with the program image already loaded.
    pub mem: Memory,
    /// Host device handling the IN/OUT port callbacks.
    pub device: D,
    /// Current execution state.
    pub state: CpuState,
    /// Interrupt-enable flip-flop (EI/DI, cleared on interrupt accept).
    pub int_enabled: bool,
    /// Total cycles executed (for pacing and profiling).
    pub cycles: u64,
}

/// Serializable snapshot of the processor state, for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub regs: Registers,
    pub flags: Flags,
    pub state: CpuState,
    pub int_enabled: bool,
    pub cycles: u64,
}

impl<D: Device> Cpu<D> {
    /// Create a new CPU over `mem` with the I/O ports wired to `device`.
    ///
    /// PC starts at 0; set `regs.pc` to the program origin before the
    /// first step.
    pub fn new(mem: Memory, device: D) -> Self {
        Self {
            regs: Registers::new(),
            flags: Flags::new(),
            mem,
            device,
            state: CpuState::Running,
            int_enabled: false,
            cycles: 0,
        }
    }

    /// Reset registers, flags and execution state.
    ///
    /// Memory is left intact so a loaded program image survives the
    /// reset; reload it explicitly if a fresh image is wanted.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.flags.reset();
        self.state = CpuState::Running;
        self.int_enabled = false;
        self.cycles = 0;
    }

    /// Execute a single instruction.
    ///
    /// Returns the number of cycles the instruction cost (base cost
    /// plus the taken-branch surcharge where applicable), or 0 if the
    /// CPU is halted.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        if self.state == CpuState::Halted {
            return Ok(0);
        }

        let op = self.next_byte();
        let extra = self.execute(op)?;

        let spent = opcode::cycles(op) + extra;
        self.cycles += spent as u64;

        Ok(spent)
    }

    /// Run until halt.
    ///
    /// Returns the number of cycles executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run until halt or until at least `max_cycles` cycles elapsed.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// External interrupt request targeting `addr` (usually an RST
    /// vector).
    ///
    /// Honored only while interrupts are enabled: clears the enable
    /// flip-flop, pushes PC and transfers control, at the cost of a
    /// CALL. A request while disabled is silently dropped, mirroring
    /// the hardware's masking.
    ///
    /// Returns the cycles consumed (0 when ignored).
    pub fn interrupt(&mut self, addr: u16) -> u32 {
        if !self.int_enabled {
            return 0;
        }

        self.int_enabled = false;
        self.push(self.regs.pc);
        self.regs.pc = addr;

        let spent = opcode::cycles(0xcd);
        self.cycles += spent as u64;
        spent
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// Capture a serializable view of the current processor state.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            regs: self.regs.clone(),
            flags: self.flags,
            state: self.state,
            int_enabled: self.int_enabled,
            cycles: self.cycles,
        }
    }

    /// A and the flags byte combined into the 16-bit PSW pair.
    pub fn af(&self) -> u16 {
        (self.regs.a as u16) << 8 | self.flags.to_byte() as u16
    }

    /// Set A and the flags from the 16-bit PSW pair. The reserved flag
    /// bits are forced to their fixed values.
    pub fn set_af(&mut self, value: u16) {
        self.regs.a = (value >> 8) as u8;
        self.flags = Flags::from_byte(value as u8);
    }

    /// Push a word onto the stack. SP decrements by 2 first.
    pub fn push(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.mem.write_word(self.regs.sp, value);
    }

    /// Pop a word off the stack. SP increments by 2 afterwards.
    pub fn pop(&mut self) -> u16 {
        let value = self.mem.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Fetch the byte at PC and advance PC by 1.
    fn next_byte(&mut self) -> u8 {
        let value = self.mem.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Fetch the word at PC and advance PC by 2.
    fn next_word(&mut self) -> u16 {
        let value = self.mem.read_word(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(2);
        value
    }

    /// Read the memory operand ("register 6"): the byte at [HL].
    fn read_m(&self) -> u8 {
        self.mem.read(self.regs.hl())
    }

    /// Write the memory operand: the byte at [HL].
    fn write_m(&mut self, value: u8) {
        self.mem.write(self.regs.hl(), value);
    }

    /// Execute one already-fetched opcode.
    ///
    /// Returns the extra cycles beyond the opcode's base cost.
    fn execute(&mut self, op: u8) -> Result<u32, CpuError> {
        let mut extra = 0;

        match op {
            // NOP, including the undocumented duplicate encodings.
            0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => {}

            // ==================== Carry Bit ====================

            // CMC
            0x3f => self.flags.set_carry(!self.flags.carry),
            // STC
            0x37 => self.flags.set_carry(true),

            // ==================== INR / DCR ====================

            0x04 => self.regs.b = self.inr(self.regs.b),
            0x0c => self.regs.c = self.inr(self.regs.c),
            0x14 => self.regs.d = self.inr(self.regs.d),
            0x1c => self.regs.e = self.inr(self.regs.e),
            0x24 => self.regs.h = self.inr(self.regs.h),
            0x2c => self.regs.l = self.inr(self.regs.l),
            0x34 => {
                let result = self.inr(self.read_m());
                self.write_m(result);
            }
            0x3c => self.regs.a = self.inr(self.regs.a),

            0x05 => self.regs.b = self.dcr(self.regs.b),
            0x0d => self.regs.c = self.dcr(self.regs.c),
            0x15 => self.regs.d = self.dcr(self.regs.d),
            0x1d => self.regs.e = self.dcr(self.regs.e),
            0x25 => self.regs.h = self.dcr(self.regs.h),
            0x2d => self.regs.l = self.dcr(self.regs.l),
            0x35 => {
                let result = self.dcr(self.read_m());
                self.write_m(result);
            }
            0x3d => self.regs.a = self.dcr(self.regs.a),

            // ==================== CMA / DAA ====================

            // CMA: complement accumulator, no flags
            0x2f => self.regs.a = !self.regs.a,
            // DAA: decimal adjust accumulator
            0x27 => self.daa(),

            // ==================== MOV ====================

            // MOV r, r onto itself is a no-op
            0x40 | 0x49 | 0x52 | 0x5b | 0x64 | 0x6d | 0x7f => {}

            0x41 => self.regs.b = self.regs.c,
            0x42 => self.regs.b = self.regs.d,
            0x43 => self.regs.b = self.regs.e,
            0x44 => self.regs.b = self.regs.h,
            0x45 => self.regs.b = self.regs.l,
            0x46 => self.regs.b = self.read_m(),
            0x47 => self.regs.b = self.regs.a,

            0x48 => self.regs.c = self.regs.b,
            0x4a => self.regs.c = self.regs.d,
            0x4b => self.regs.c = self.regs.e,
            0x4c => self.regs.c = self.regs.h,
            0x4d => self.regs.c = self.regs.l,
            0x4e => self.regs.c = self.read_m(),
            0x4f => self.regs.c = self.regs.a,

            0x50 => self.regs.d = self.regs.b,
            0x51 => self.regs.d = self.regs.c,
            0x53 => self.regs.d = self.regs.e,
            0x54 => self.regs.d = self.regs.h,
            0x55 => self.regs.d = self.regs.l,
            0x56 => self.regs.d = self.read_m(),
            0x57 => self.regs.d = self.regs.a,

            0x58 => self.regs.e = self.regs.b,
            0x59 => self.regs.e = self.regs.c,
            0x5a => self.regs.e = self.regs.d,
            0x5c => self.regs.e = self.regs.h,
            0x5d => self.regs.e = self.regs.l,
            0x5e => self.regs.e = self.read_m(),
            0x5f => self.regs.e = self.regs.a,

            0x60 => self.regs.h = self.regs.b,
            0x61 => self.regs.h = self.regs.c,
            0x62 => self.regs.h = self.regs.d,
            0x63 => self.regs.h = self.regs.e,
            0x65 => self.regs.h = self.regs.l,
            0x66 => self.regs.h = self.read_m(),
            0x67 => self.regs.h = self.regs.a,

            0x68 => self.regs.l = self.regs.b,
            0x69 => self.regs.l = self.regs.c,
            0x6a => self.regs.l = self.regs.d,
            0x6b => self.regs.l = self.regs.e,
            0x6c => self.regs.l = self.regs.h,
            0x6e => self.regs.l = self.read_m(),
            0x6f => self.regs.l = self.regs.a,

            0x70 => self.write_m(self.regs.b),
            0x71 => self.write_m(self.regs.c),
            0x72 => self.write_m(self.regs.d),
            0x73 => self.write_m(self.regs.e),
            0x74 => self.write_m(self.regs.h),
            0x75 => self.write_m(self.regs.l),
            0x77 => self.write_m(self.regs.a),

            0x78 => self.regs.a = self.regs.b,
            0x79 => self.regs.a = self.regs.c,
            0x7a => self.regs.a = self.regs.d,
            0x7b => self.regs.a = self.regs.e,
            0x7c => self.regs.a = self.regs.h,
            0x7d => self.regs.a = self.regs.l,
            0x7e => self.regs.a = self.read_m(),

            // ==================== STAX / LDAX ====================

            0x02 => self.mem.write(self.regs.bc(), self.regs.a),
            0x12 => self.mem.write(self.regs.de(), self.regs.a),
            0x0a => self.regs.a = self.mem.read(self.regs.bc()),
            0x1a => self.regs.a = self.mem.read(self.regs.de()),

            // ==================== Arithmetic ====================

            0x80 => self.add(self.regs.b),
            0x81 => self.add(self.regs.c),
            0x82 => self.add(self.regs.d),
            0x83 => self.add(self.regs.e),
            0x84 => self.add(self.regs.h),
            0x85 => self.add(self.regs.l),
            0x86 => {
                let operand = self.read_m();
                self.add(operand);
            }
            0x87 => self.add(self.regs.a),

            0x88 => self.adc(self.regs.b),
            0x89 => self.adc(self.regs.c),
            0x8a => self.adc(self.regs.d),
            0x8b => self.adc(self.regs.e),
            0x8c => self.adc(self.regs.h),
            0x8d => self.adc(self.regs.l),
            0x8e => {
                let operand = self.read_m();
                self.adc(operand);
            }
            0x8f => self.adc(self.regs.a),

            0x90 => self.sub(self.regs.b),
            0x91 => self.sub(self.regs.c),
            0x92 => self.sub(self.regs.d),
            0x93 => self.sub(self.regs.e),
            0x94 => self.sub(self.regs.h),
            0x95 => self.sub(self.regs.l),
            0x96 => {
                let operand = self.read_m();
                self.sub(operand);
            }
            0x97 => self.sub(self.regs.a),

            0x98 => self.sbb(self.regs.b),
            0x99 => self.sbb(self.regs.c),
            0x9a => self.sbb(self.regs.d),
            0x9b => self.sbb(self.regs.e),
            0x9c => self.sbb(self.regs.h),
            0x9d => self.sbb(self.regs.l),
            0x9e => {
                let operand = self.read_m();
                self.sbb(operand);
            }
            0x9f => self.sbb(self.regs.a),

            // ==================== Logical ====================

            0xa0 => self.ana(self.regs.b),
            0xa1 => self.ana(self.regs.c),
            0xa2 => self.ana(self.regs.d),
            0xa3 => self.ana(self.regs.e),
            0xa4 => self.ana(self.regs.h),
            0xa5 => self.ana(self.regs.l),
            0xa6 => {
                let operand = self.read_m();
                self.ana(operand);
            }
            0xa7 => self.ana(self.regs.a),

            0xa8 => self.xra(self.regs.b),
            0xa9 => self.xra(self.regs.c),
            0xaa => self.xra(self.regs.d),
            0xab => self.xra(self.regs.e),
            0xac => self.xra(self.regs.h),
            0xad => self.xra(self.regs.l),
            0xae => {
                let operand = self.read_m();
                self.xra(operand);
            }
            0xaf => self.xra(self.regs.a),

            0xb0 => self.ora(self.regs.b),
            0xb1 => self.ora(self.regs.c),
            0xb2 => self.ora(self.regs.d),
            0xb3 => self.ora(self.regs.e),
            0xb4 => self.ora(self.regs.h),
            0xb5 => self.ora(self.regs.l),
            0xb6 => {
                let operand = self.read_m();
                self.ora(operand);
            }
            0xb7 => self.ora(self.regs.a),

            0xb8 => self.cmp(self.regs.b),
            0xb9 => self.cmp(self.regs.c),
            0xba => self.cmp(self.regs.d),
            0xbb => self.cmp(self.regs.e),
            0xbc => self.cmp(self.regs.h),
            0xbd => self.cmp(self.regs.l),
            0xbe => {
                let operand = self.read_m();
                self.cmp(operand);
            }
            0xbf => self.cmp(self.regs.a),

            // ==================== Rotate ====================

            0x07 => self.rlc(),
            0x0f => self.rrc(),
            0x17 => self.ral(),
            0x1f => self.rar(),

            // ==================== Stack ====================

            0xc5 => self.push(self.regs.bc()),
            0xd5 => self.push(self.regs.de()),
            0xe5 => self.push(self.regs.hl()),
            0xf5 => self.push(self.af()),

            0xc1 => {
                let value = self.pop();
                self.regs.set_bc(value);
            }
            0xd1 => {
                let value = self.pop();
                self.regs.set_de(value);
            }
            0xe1 => {
                let value = self.pop();
                self.regs.set_hl(value);
            }
            0xf1 => {
                let value = self.pop();
                self.set_af(value);
            }

            // ==================== 16-bit Arithmetic ====================

            0x09 => self.dad(self.regs.bc()),
            0x19 => self.dad(self.regs.de()),
            0x29 => self.dad(self.regs.hl()),
            0x39 => self.dad(self.regs.sp),

            // INX/DCX: wraparound, no flags
            0x03 => self.regs.set_bc(self.regs.bc().wrapping_add(1)),
            0x13 => self.regs.set_de(self.regs.de().wrapping_add(1)),
            0x23 => self.regs.set_hl(self.regs.hl().wrapping_add(1)),
            0x33 => self.regs.sp = self.regs.sp.wrapping_add(1),

            0x0b => self.regs.set_bc(self.regs.bc().wrapping_sub(1)),
            0x1b => self.regs.set_de(self.regs.de().wrapping_sub(1)),
            0x2b => self.regs.set_hl(self.regs.hl().wrapping_sub(1)),
            0x3b => self.regs.sp = self.regs.sp.wrapping_sub(1),

            // ==================== Register/Stack Exchange ====================

            // XCHG: swap DE and HL
            0xeb => {
                std::mem::swap(&mut self.regs.h, &mut self.regs.d);
                std::mem::swap(&mut self.regs.l, &mut self.regs.e);
            }

            // XTHL: swap HL with the word at [SP]
            0xe3 => {
                let mem_sp = self.mem.read_word(self.regs.sp);
                let hl = self.regs.hl();
                self.regs.set_hl(mem_sp);
                self.mem.write_word(self.regs.sp, hl);
            }

            // SPHL
            0xf9 => self.regs.sp = self.regs.hl(),

            // ==================== Immediate Loads ====================

            0x01 => {
                let value = self.next_word();
                self.regs.set_bc(value);
            }
            0x11 => {
                let value = self.next_word();
                self.regs.set_de(value);
            }
            0x21 => {
                let value = self.next_word();
                self.regs.set_hl(value);
            }
            0x31 => self.regs.sp = self.next_word(),

            0x06 => self.regs.b = self.next_byte(),
            0x0e => self.regs.c = self.next_byte(),
            0x16 => self.regs.d = self.next_byte(),
            0x1e => self.regs.e = self.next_byte(),
            0x26 => self.regs.h = self.next_byte(),
            0x2e => self.regs.l = self.next_byte(),
            0x36 => {
                let value = self.next_byte();
                self.write_m(value);
            }
            0x3e => self.regs.a = self.next_byte(),

            // ==================== Immediate ALU ====================

            // ADI
            0xc6 => {
                let operand = self.next_byte();
                self.add(operand);
            }
            // ACI
            0xce => {
                let operand = self.next_byte();
                self.adc(operand);
            }
            // SUI
            0xd6 => {
                let operand = self.next_byte();
                self.sub(operand);
            }
            // SBI
            0xde => {
                let operand = self.next_byte();
                self.sbb(operand);
            }
            // ANI
            0xe6 => {
                let operand = self.next_byte();
                self.ana(operand);
            }
            // XRI
            0xee => {
                let operand = self.next_byte();
                self.xra(operand);
            }
            // ORI
            0xf6 => {
                let operand = self.next_byte();
                self.ora(operand);
            }
            // CPI
            0xfe => {
                let operand = self.next_byte();
                self.cmp(operand);
            }

            // ==================== Direct Addressing ====================

            // STA
            0x32 => {
                let addr = self.next_word();
                self.mem.write(addr, self.regs.a);
            }
            // LDA
            0x3a => {
                let addr = self.next_word();
                self.regs.a = self.mem.read(addr);
            }
            // SHLD
            0x22 => {
                let addr = self.next_word();
                self.mem.write_word(addr, self.regs.hl());
            }
            // LHLD
            0x2a => {
                let addr = self.next_word();
                let value = self.mem.read_word(addr);
                self.regs.set_hl(value);
            }

            // ==================== Branch ====================

            // PCHL
            0xe9 => self.regs.pc = self.regs.hl(),

            // JMP and conditional jumps
            0xc3 | 0xda | 0xd2 | 0xca | 0xc2 | 0xfa | 0xf2 | 0xea | 0xe2 => {
                let addr = self.next_word();
                if self.branch_condition(op)? {
                    self.regs.pc = addr;
                }
            }

            // CALL and conditional calls: the pushed return address is
            // the instruction after the full 3-byte encoding.
            0xcd | 0xdc | 0xd4 | 0xcc | 0xc4 | 0xec | 0xe4 | 0xfc | 0xf4 => {
                let addr = self.next_word();
                if self.branch_condition(op)? {
                    extra = TAKEN_BRANCH_CYCLES;
                    self.push(self.regs.pc);
                    self.regs.pc = addr;
                }
            }

            // RET and conditional returns
            0xc9 | 0xd8 | 0xd0 | 0xc8 | 0xc0 | 0xf8 | 0xf0 | 0xe8 | 0xe0 => {
                if self.branch_condition(op)? {
                    extra = TAKEN_BRANCH_CYCLES;
                    self.regs.pc = self.pop();
                }
            }

            // RST: vector address is encoded in bits 3-5
            0xc7 | 0xcf | 0xd7 | 0xdf | 0xe7 | 0xef | 0xf7 | 0xff => {
                self.push(self.regs.pc);
                self.regs.pc = (op & 0x38) as u16;
            }

            // ==================== I/O and Control ====================

            // EI / DI
            0xfb => self.int_enabled = true,
            0xf3 => self.int_enabled = false,

            // IN
            0xdb => {
                let port = self.next_byte();
                self.regs.a = self.device.input(port);
            }
            // OUT
            0xd3 => {
                let port = self.next_byte();
                self.device.output(port, self.regs.a);
            }

            // HLT
            0x76 => self.state = CpuState::Halted,

            _ => return Err(CpuError::UnimplementedInstruction(op)),
        }

        Ok(extra)
    }

    /// Evaluate the branch predicate encoded in a JMP/CALL/RET family
    /// opcode: always-true for the unconditional forms, one of the
    /// eight flag tests otherwise.
    fn branch_condition(&self, op: u8) -> Result<bool, CpuError> {
        match op {
            // JMP / CALL / RET
            0xc3 | 0xcd | 0xc9 => Ok(true),
            // JC / CC / RC
            0xda | 0xdc | 0xd8 => Ok(self.flags.carry),
            // JNC / CNC / RNC
            0xd2 | 0xd4 | 0xd0 => Ok(!self.flags.carry),
            // JZ / CZ / RZ
            0xca | 0xcc | 0xc8 => Ok(self.flags.zero),
            // JNZ / CNZ / RNZ
            0xc2 | 0xc4 | 0xc0 => Ok(!self.flags.zero),
            // JM / CM / RM
            0xfa | 0xfc | 0xf8 => Ok(self.flags.sign),
            // JP / CP / RP
            0xf2 | 0xf4 | 0xf0 => Ok(!self.flags.sign),
            // JPE / CPE / RPE
            0xea | 0xec | 0xe8 => Ok(self.flags.parity),
            // JPO / CPO / RPO
            0xe2 | 0xe4 | 0xe0 => Ok(!self.flags.parity),

            _ => Err(CpuError::Unreachable("branch predicate for non-branch opcode")),
        }
    }

    // ==================== ALU ====================

    /// Increment: all flags except CY, which INR never touches.
    fn inr(&mut self, num: u8) -> u8 {
        let result = num.wrapping_add(1);
        self.flags.set_all_except_carry(result, (num & 0x0f) + 0x01 > 0x0f);
        result
    }

    /// Decrement: all flags except CY. AC is set unless the low nibble
    /// borrowed (wrapped to 0xF).
    fn dcr(&mut self, num: u8) -> u8 {
        let result = num.wrapping_sub(1);
        self.flags.set_all_except_carry(result, result & 0x0f != 0x0f);
        result
    }

    /// Decimal adjust: fix each nibble of A up by 6 where it no longer
    /// represents a decimal digit. The correction runs through the add
    /// path, then CY is force-written - DAA can set the carry but never
    /// clears one that was already set.
    fn daa(&mut self) {
        let mut correction: u8 = 0;
        let mut carry = self.flags.carry;

        let lsb = self.regs.a & 0x0f;
        let msb = self.regs.a >> 4;

        if lsb > 9 || self.flags.aux_carry {
            correction += 0x06;
        }

        if msb > 9 || self.flags.carry || (msb >= 9 && lsb > 9) {
            correction += 0x60;
            carry = true;
        }

        self.add(correction);
        self.flags.set_carry(carry);
    }

    fn add(&mut self, num: u8) {
        let a = self.regs.a;
        let answer = a as u16 + num as u16;

        self.flags.set_all(answer, (a & 0x0f) + (num & 0x0f) > 0x0f);
        self.regs.a = answer as u8;
    }

    fn adc(&mut self, num: u8) {
        let carry = self.flags.carry as u8;
        let a = self.regs.a;
        let answer = a as u16 + num as u16 + carry as u16;

        self.flags.set_all(answer, (a & 0x0f) + (num & 0x0f) + carry > 0x0f);
        self.regs.a = answer as u8;
    }

    fn sub(&mut self, num: u8) {
        let a = self.regs.a;
        // The wrapped 16-bit difference exceeds 0xFF exactly when a
        // borrow occurred, so set_all reads CY straight off it.
        let answer = (a as u16).wrapping_sub(num as u16);

        self.flags.set_all(answer, a & 0x0f >= num & 0x0f);
        self.regs.a = answer as u8;
    }

    fn sbb(&mut self, num: u8) {
        let carry = self.flags.carry as u8;
        let a = self.regs.a;
        let answer = (a as u16)
            .wrapping_sub(num as u16)
            .wrapping_sub(carry as u16);

        self.flags.set_all(answer, a & 0x0f >= (num & 0x0f) + carry);
        self.regs.a = answer as u8;
    }

    /// AND: CY cleared, AC from bit 3 of the OR of the operands (an
    /// 8080 quirk the diagnostics check for).
    fn ana(&mut self, num: u8) {
        let result = self.regs.a & num;

        self.flags.set_all(result as u16, (self.regs.a | num) & 0x08 != 0);
        self.regs.a = result;
    }

    /// XOR: CY and AC both cleared.
    fn xra(&mut self, num: u8) {
        let result = self.regs.a ^ num;

        self.flags.set_all(result as u16, false);
        self.regs.a = result;
    }

    /// OR: CY and AC both cleared.
    fn ora(&mut self, num: u8) {
        let result = self.regs.a | num;

        self.flags.set_all(result as u16, false);
        self.regs.a = result;
    }

    /// Compare: subtraction for flag effect only, A is preserved.
    fn cmp(&mut self, num: u8) {
        let a = self.regs.a;
        self.sub(num);
        self.regs.a = a;
    }

    /// Rotate left; bit 7 goes to both CY and bit 0.
    fn rlc(&mut self) {
        let carry = self.regs.a & 0x80 != 0;

        self.regs.a = self.regs.a << 1 | carry as u8;
        self.flags.set_carry(carry);
    }

    /// Rotate right; bit 0 goes to both CY and bit 7.
    fn rrc(&mut self) {
        let carry = self.regs.a & 0x01 != 0;

        self.regs.a = (carry as u8) << 7 | self.regs.a >> 1;
        self.flags.set_carry(carry);
    }

    /// Rotate left through carry: the previous CY enters at bit 0
    /// while bit 7 leaves into CY (a 9-bit rotation).
    fn ral(&mut self) {
        let carry = self.regs.a & 0x80 != 0;

        self.regs.a = self.regs.a << 1 | self.flags.carry as u8;
        self.flags.set_carry(carry);
    }

    /// Rotate right through carry: the previous CY enters at bit 7
    /// while bit 0 leaves into CY.
    fn rar(&mut self) {
        let carry = self.regs.a & 0x01 != 0;

        self.regs.a = (self.flags.carry as u8) << 7 | self.regs.a >> 1;
        self.flags.set_carry(carry);
    }

    /// 16-bit add into HL; only CY is affected.
    fn dad(&mut self, num: u16) {
        let hl = self.regs.hl();

        self.flags.set_carry(hl > 0xffff - num);
        self.regs.set_hl(hl.wrapping_add(num));
    }
}

impl<D: Device> std::fmt::Debug for Cpu<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
///
/// All of them are fatal: an emulator facing an unknown instruction has
/// no well-defined next state. Ordinary outcomes - arithmetic overflow,
/// wrapped addresses, branches not taken - are never errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CpuError {
    #[error("unimplemented instruction {} (0x{0:02x})", opcode::name(*.0))]
    UnimplementedInstruction(u8),

    #[error("memory error: {0}")]
    MemoryError(#[from] MemoryError),

    /// A dispatch defect in the emulator itself, not a guest-program
    /// error.
    #[error("unreachable condition: {0}")]
    Unreachable(&'static str),
}
