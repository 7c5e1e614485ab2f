//! CPU emulation for the Intel 8080.
//!
//! This module implements the complete 8080 architecture:
//! - 64 KB flat byte-addressable memory
//! - 7 byte registers + SP/PC, with BC/DE/HL pair views
//! - five condition bits with per-family update policies
//! - the full instruction set, undocumented NOP duplicates included

pub mod memory;
pub mod registers;
pub mod flags;
pub mod opcode;
pub mod device;
pub mod execute;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::Registers;
pub use flags::Flags;
pub use opcode::{OpcodeInfo, OPCODES};
pub use device::{Device, NullDevice};
pub use execute::{Cpu, CpuError, CpuSnapshot, CpuState, CLOCK_FREQUENCY, STEP_CYCLES, STEP_TIME_MS};
