//! Intel 8080 Emulator - CLI Entry Point
//!
//! Commands:
//! - `eighty80-emu run <program>` - Run a raw 8080 binary image
//! - `eighty80-emu test <rom-dir>` - Run the CP/M diagnostic images

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eighty80-emu")]
#[command(version = "0.1.0")]
#[command(about = "An Intel 8080 microprocessor emulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program image until it halts
    Run {
        /// Path to the raw 8080 binary image
        program: String,
        /// Load address and initial program counter (hex accepted)
        #[arg(short, long, default_value = "0x0100", value_parser = parse_addr)]
        origin: u16,
        /// Maximum number of cycles to run
        #[arg(short, long, default_value = "1000000")]
        max_cycles: u64,
        /// Show per-instruction trace output
        #[arg(short, long)]
        trace: bool,
        /// Throttle execution to the original 2 MHz clock
        #[arg(short, long)]
        pace: bool,
        /// Print the final CPU state as JSON
        #[arg(short, long)]
        dump_state: bool,
    },
    /// Run the CP/M diagnostic images found in a directory
    Test {
        /// Directory containing the images (8080PRE.bin, TST8080.bin, ...)
        rom_dir: String,
        /// Cycle budget per image (the exerciser needs billions)
        #[arg(short, long, default_value = "50000000000")]
        max_cycles: u64,
    },
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { program, origin, max_cycles, trace, pace, dump_state } => {
            run_program(&program, origin, max_cycles, trace, pace, dump_state);
        }
        Commands::Test { rom_dir, max_cycles } => {
            run_fixtures(&rom_dir, max_cycles);
        }
    }
}

fn run_program(path: &str, origin: u16, max_cycles: u64, trace: bool, pace: bool, dump_state: bool) {
    use eighty80::{Cpu, Memory, NullDevice};
    use eighty80::cpu::{STEP_CYCLES, STEP_TIME_MS};
    use std::time::{Duration, Instant};

    println!("🔧 Running: {}", path);

    let image = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };
    println!("📂 Loaded {} bytes at {:#06x}", image.len(), origin);

    let mut mem = Memory::new();
    if let Err(e) = mem.load(&image, origin) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    let mut cpu = Cpu::new(mem, NullDevice);
    cpu.regs.pc = origin;

    println!();
    println!("━━━ Execution ━━━");

    // Real-time pacing: let STEP_CYCLES simulated cycles play out per
    // STEP_TIME_MS wall-clock slice.
    let slice = Duration::from_millis(STEP_TIME_MS);
    let mut step_cycles: u64 = 0;
    let mut step_zero = Instant::now();

    while cpu.is_running() && cpu.cycles < max_cycles {
        if pace && step_cycles > STEP_CYCLES {
            step_cycles -= STEP_CYCLES;

            let elapsed = step_zero.elapsed();
            if elapsed < slice {
                std::thread::sleep(slice - elapsed);
            }
            step_zero += slice;
        }

        let pc = cpu.regs.pc;
        let op = cpu.mem.read(pc);

        match cpu.step() {
            Ok(spent) => {
                step_cycles += spent as u64;
                if trace {
                    println!("{}", trace_line(&cpu, pc, op));
                }
            }
            Err(e) => {
                eprintln!("❌ CPU error at PC={:04X}: {}", pc, e);
                std::process::exit(1);
            }
        }
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cpu.cycles);
    println!("State: {:?}", cpu.state);
    println!(
        "A={:02X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X}",
        cpu.regs.a,
        cpu.regs.bc(),
        cpu.regs.de(),
        cpu.regs.hl(),
        cpu.regs.sp,
        cpu.regs.pc
    );
    println!("Flags: {}", cpu.flags);

    if cpu.cycles >= max_cycles {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }

    if dump_state {
        match serde_json::to_string_pretty(&cpu.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// One human-readable trace line: address, mnemonic, full register and
/// flag snapshot after the instruction.
fn trace_line(cpu: &eighty80::Cpu<eighty80::NullDevice>, pc: u16, op: u8) -> String {
    use eighty80::cpu::opcode;

    format!(
        "[{:04X}]  {:<15}(SP={:04X} A={:02X} F={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X} FLAGS={})",
        pc,
        opcode::name(op),
        cpu.regs.sp,
        cpu.regs.a,
        cpu.flags.to_byte(),
        cpu.regs.b,
        cpu.regs.c,
        cpu.regs.d,
        cpu.regs.e,
        cpu.regs.h,
        cpu.regs.l,
        cpu.flags
    )
}

fn run_fixtures(rom_dir: &str, max_cycles: u64) {
    use eighty80::diag::{self, FIXTURES};
    use std::io::Write;
    use std::path::Path;

    println!("━━━ 8080 Diagnostics ━━━");
    println!();

    let mut ran = 0;
    for (filename, success) in FIXTURES {
        let path = Path::new(rom_dir).join(filename);
        if !path.exists() {
            continue;
        }

        print!("{}... ", filename);
        let _ = std::io::stdout().flush();

        let image = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("✗");
                eprintln!("❌ Failed to read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };

        match diag::run_image(&image, max_cycles) {
            Ok(run) if run.passed(success) => {
                println!("✓ ({} cycles)", run.cycles);
                ran += 1;
            }
            Ok(run) => {
                println!("✗");
                if run.completed {
                    eprintln!("❌ Output did not end with \"{}\":", success);
                } else {
                    eprintln!("❌ Cycle budget exhausted after {} cycles:", run.cycles);
                }
                eprintln!("{}", run.output.trim());
                std::process::exit(1);
            }
            Err(e) => {
                println!("✗");
                eprintln!("❌ CPU error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if ran == 0 {
        eprintln!("❌ No diagnostic images found in {}", rom_dir);
        std::process::exit(1);
    }

    println!();
    println!("✓ All {} diagnostics passed!", ran);
}
