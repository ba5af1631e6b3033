//! Simulator driver.
//!
//! Builds the system described by a [`Config`] and drives the core:
//! 1. **Construction:** Validates the configuration, maps RAM and the optional
//!    finisher on the bus and creates the CPU.
//! 2. **Loading:** Copies raw binaries or ELF segments into memory.
//! 3. **Running:** Single ticks, bounded runs and run-to-pc.
//! 4. **Stimulus:** Interrupt lines and additional devices.
//! 5. **Debug:** Halt, resume and step requests and abstract register access.

use tracing::{debug, info};

use super::error::SimError;
use super::loader::parse_elf;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::cpu::debug::DebugError;
use crate::soc::devices::Finisher;
use crate::soc::{Bus, Device, Interrupt, Memory};
use crate::stats::SimStats;

/// Why [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// A device requested the end of the simulation with this exit code.
    Finished(u32),
    /// The cycle budget was exhausted.
    CycleLimit,
    /// The core entered debug mode.
    DebugHalted,
}

/// Top-level simulator: the CPU and the system around it.
#[derive(Debug)]
pub struct Simulator {
    /// The simulated core, including its bus and devices.
    pub cpu: Cpu,
}

impl Simulator {
    /// Creates a simulator in its reset state.
    ///
    /// # Arguments
    ///
    /// * `config` - System configuration; validated before use.
    ///
    /// # Returns
    ///
    /// The simulator, or `SimError::Config` if the configuration is rejected.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        let mut bus = Bus::new(config.memory.latency);
        bus.add_device(Box::new(Memory::new(
            config.memory.ram_base,
            config.memory.ram_size,
        )));
        if let Some(addr) = config.memory.finisher {
            bus.add_device(Box::new(Finisher::new(addr)));
        }
        debug!(devices = ?bus.device_names(), "bus ready");
        Ok(Self {
            cpu: Cpu::new(config, bus)?,
        })
    }

    /// Attaches an additional device to the bus.
    pub fn add_device(&mut self, dev: Box<dyn Device>) {
        self.cpu.bus.add_device(dev);
    }

    /// Copies a raw binary into memory.
    ///
    /// # Arguments
    ///
    /// * `addr` - Load address.
    /// * `bytes` - Image contents.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or `SimError::OutOfRange` if part of the image is unmapped.
    pub fn load_binary(&mut self, addr: u32, bytes: &[u8]) -> Result<(), SimError> {
        let end = u64::from(addr) + bytes.len() as u64;
        if end > 1 << 32 {
            return Err(SimError::OutOfRange {
                addr,
                len: bytes.len(),
            });
        }
        self.cpu
            .bus
            .write_bytes(addr, bytes)
            .map_err(|_| SimError::OutOfRange {
                addr,
                len: bytes.len(),
            })?;
        info!(addr = %format_args!("{addr:#010x}"), len = bytes.len(), "loaded binary");
        Ok(())
    }

    /// Loads an ELF executable and starts fetching at its entry point.
    ///
    /// Must be called before the first tick.
    ///
    /// # Returns
    ///
    /// The entry point.
    pub fn load_elf(&mut self, bytes: &[u8]) -> Result<u32, SimError> {
        let image = parse_elf(bytes)?;
        for seg in &image.segments {
            self.load_binary(seg.addr, seg.data)?;
        }
        self.cpu.pc = image.entry;
        Ok(image.entry)
    }

    /// Advances the simulator by one clock cycle.
    pub fn tick(&mut self) {
        self.cpu.tick();
    }

    /// Runs until a device ends the simulation, the core halts in debug mode
    /// or `max_cycles` cycles have elapsed.
    pub fn run(&mut self, max_cycles: u64) -> RunOutcome {
        for _ in 0..max_cycles {
            self.cpu.tick();
            if let Some(code) = self.cpu.exit_code() {
                info!(code, cycles = self.cpu.stats.cycles, "simulation finished");
                return RunOutcome::Finished(code);
            }
            if self.cpu.is_halted() {
                return RunOutcome::DebugHalted;
            }
        }
        RunOutcome::CycleLimit
    }

    /// Runs until the instruction at `pc` retires.
    ///
    /// # Returns
    ///
    /// `true` if it retired within `max_cycles` cycles.
    pub fn run_until_retired(&mut self, pc: u32, max_cycles: u64) -> bool {
        for _ in 0..max_cycles {
            let retired = self.cpu.stats.instructions_retired;
            self.cpu.tick();
            if self.cpu.stats.instructions_retired != retired && self.cpu.last_retired == Some(pc)
            {
                return true;
            }
        }
        false
    }

    /// Drives an interrupt line; the level is sampled at the end of each tick.
    pub fn set_irq(&mut self, irq: Interrupt, level: bool) {
        self.cpu.irq_lines.set(irq, level);
    }

    /// Returns `true` while the core is halted in debug mode.
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Requests a debug halt at the next instruction boundary.
    pub fn debug_halt(&mut self) -> Result<(), DebugError> {
        self.cpu.debug_halt()
    }

    /// Resumes a halted core at `dpc`.
    pub fn debug_resume(&mut self) -> Result<(), DebugError> {
        self.cpu.debug_resume()
    }

    /// Resumes a halted core for exactly one instruction.
    pub fn debug_step(&mut self) -> Result<(), DebugError> {
        self.cpu.debug_step()
    }

    /// Abstract command: reads general-purpose register `idx`.
    pub fn debug_read_gpr(&self, idx: usize) -> Result<u32, DebugError> {
        self.cpu.debug_read_gpr(idx)
    }

    /// Abstract command: writes general-purpose register `idx`.
    pub fn debug_write_gpr(&mut self, idx: usize, val: u32) -> Result<(), DebugError> {
        self.cpu.debug_write_gpr(idx, val)
    }

    /// Abstract command: reads the CSR at `addr`.
    pub fn debug_read_csr(&self, addr: u32) -> Result<u32, DebugError> {
        self.cpu.debug_read_csr(addr)
    }

    /// Abstract command: writes the CSR at `addr`.
    pub fn debug_write_csr(&mut self, addr: u32, val: u32) -> Result<(), DebugError> {
        self.cpu.debug_write_csr(addr, val)
    }

    /// Reads `len` bytes of memory without timing side effects.
    pub fn read_memory(&mut self, addr: u32, len: usize) -> Result<Vec<u8>, SimError> {
        self.cpu
            .bus
            .read_bytes(addr, len)
            .map_err(|_| SimError::OutOfRange { addr, len })
    }

    /// Performance statistics collected so far.
    pub const fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }
}
