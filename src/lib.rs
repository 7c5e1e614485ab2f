//! # eighty80
//!
//! An emulator of the Intel 8080 (1974), the 8-bit microprocessor
//! behind CP/M machines and arcade boards like Space Invaders.
//!
//! The core executes one instruction per [`Cpu::step`] call and reports
//! the cycles it cost, so a host can pace execution against the 2 MHz
//! clock. I/O ports are delegated to a host-supplied [`Device`]; the
//! [`diag`] module runs the classic CP/M diagnostic images against the
//! core.

pub mod cpu;
pub mod diag;

// Re-export commonly used types
pub use cpu::{Cpu, CpuError, CpuSnapshot, CpuState, Device, Flags, Memory, NullDevice, Registers};
