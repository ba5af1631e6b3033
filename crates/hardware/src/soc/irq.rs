//! Interrupt input lines.
//!
//! The core has three machine-level interrupt inputs: software, timer and a
//! 32-bit vector of external lines. They are level-sensitive and sampled into
//! `mip`/`irq_pending` once per cycle.

/// Machine-level interrupt sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// Machine software interrupt.
    Software,
    /// Machine timer interrupt.
    Timer,
    /// One of the 32 external interrupt lines.
    External(u8),
}

/// Current level of every interrupt input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IrqLines {
    /// Software interrupt line.
    pub software: bool,
    /// Timer interrupt line.
    pub timer: bool,
    /// External interrupt lines, one bit per line.
    pub external: u32,
}

impl IrqLines {
    /// Drives one interrupt input.
    ///
    /// # Arguments
    ///
    /// * `irq` - Line to drive; external lines above 31 are ignored.
    /// * `level` - `true` to assert, `false` to deassert.
    pub const fn set(&mut self, irq: Interrupt, level: bool) {
        match irq {
            Interrupt::Software => self.software = level,
            Interrupt::Timer => self.timer = level,
            Interrupt::External(line) => {
                if line < 32 {
                    let bit = 1u32 << line;
                    if level {
                        self.external |= bit;
                    } else {
                        self.external &= !bit;
                    }
                }
            }
        }
    }
}
