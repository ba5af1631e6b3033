//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which holds the entire processor
//! state. It coordinates the following:
//! 1. **Architectural State:** General-purpose registers, the CSR file and the fetch pc.
//! 2. **Pipeline State:** The five inter-stage latches and the pending fetch redirect.
//! 3. **Memory Ports:** The fetch unit (I-cache) and load/store unit (D-cache, write buffer).
//! 4. **Control Units:** Interrupt inputs, the optional debug unit and trigger bank.

/// Control and Status Register access rules.
pub mod csr;

/// Debug interface: halt, resume, step and abstract register access.
pub mod debug;

/// Clock tick orchestration.
pub mod execution;

/// Trap entry and Memory-stage redirects.
pub mod trap;

use crate::config::{Config, ConfigError};
use crate::core::arch::csr::Csrs;
use crate::core::arch::gpr::Gpr;
use crate::core::pipeline::latches::Latches;
use crate::core::units::bru::StaticPredictor;
use crate::core::units::debug::DebugUnit;
use crate::core::units::debug::trigger::TriggerUnit;
use crate::core::units::fetch::FetchUnit;
use crate::core::units::lsu::LoadStoreUnit;
use crate::soc::{Bus, IrqLines};
use crate::stats::SimStats;

/// Main CPU structure containing all processor state and components.
///
/// The CPU advances its six-stage pipeline one clock at a time through
/// [`Cpu::tick`], owns both memory ports and tracks performance statistics.
#[derive(Debug)]
pub struct Cpu {
    /// General Purpose Registers.
    pub regs: Gpr,
    /// Next sequential fetch address.
    pub pc: u32,
    /// Control and Status Registers.
    pub csrs: Csrs,

    /// System bus and devices.
    pub bus: Bus,
    /// Inter-stage latches.
    pub latches: Latches,
    /// Fetch address requested by Decode, Execute or Memory for the next Address cycle.
    pub redirect: Option<u32>,
    /// Instruction port and I-cache.
    pub fetch: FetchUnit,
    /// Data port, D-cache and write buffer.
    pub lsu: LoadStoreUnit,

    /// Interrupt input levels, sampled once per cycle.
    pub irq_lines: IrqLines,
    /// Debug unit, when configured.
    pub debug: Option<DebugUnit>,
    /// Trigger bank, when configured.
    pub triggers: Option<TriggerUnit>,

    /// Whether the M extension is implemented.
    pub with_muldiv: bool,
    /// Decode-stage branch predictor.
    pub predictor: StaticPredictor,

    /// Performance statistics.
    pub stats: SimStats,
    /// Pc of every retired instruction, when enabled.
    pub retire_trace: Option<Vec<u32>>,
    /// Pc of the most recently retired instruction.
    pub last_retired: Option<u32>,
}

impl Cpu {
    /// Creates a CPU in its reset state.
    ///
    /// # Arguments
    ///
    /// * `config` - Core configuration; validated before any unit is built.
    /// * `bus` - Bus with the devices already attached.
    ///
    /// # Returns
    ///
    /// A CPU with empty latches that fetches from the reset address on its first
    /// tick, or the first problem [`Config::validate`] reports.
    pub fn new(config: &Config, bus: Bus) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            regs: Gpr::new(),
            pc: config.general.reset_address,
            csrs: Csrs::new(config.general.with_muldiv),
            bus,
            latches: Latches::default(),
            redirect: None,
            fetch: FetchUnit::new(&config.icache),
            lsu: LoadStoreUnit::new(config),
            irq_lines: IrqLines::default(),
            debug: config.debug.enabled.then(DebugUnit::new),
            triggers: config
                .debug
                .with_trigger
                .then(|| TriggerUnit::new(config.debug.nb_triggers, config.debug.enabled)),
            with_muldiv: config.general.with_muldiv,
            predictor: StaticPredictor,
            stats: SimStats::default(),
            retire_trace: None,
            last_retired: None,
        })
    }

    /// Starts recording the pc of every retired instruction.
    pub fn enable_retire_trace(&mut self) {
        if self.retire_trace.is_none() {
            self.retire_trace = Some(Vec::new());
        }
    }

    /// Returns the exit code once a device has requested termination.
    pub fn exit_code(&self) -> Option<u32> {
        self.bus.exit_code()
    }

    /// Formats the register file and pc for diagnostics.
    pub fn dump_state(&self) -> String {
        format!("pc = {:#010x}\n{}", self.pc, self.regs.dump())
    }
}
