//! Simulator error type.
//!
//! Failures that happen outside the modelled core: building the system from a
//! configuration and loading programs into it. Traps raised by the program are
//! architectural events and never appear here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by the simulator and the program loader.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A program file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The ELF image is malformed.
    #[error("malformed ELF image: {0}")]
    Elf(#[from] object::Error),

    /// The ELF image is well formed but cannot run on this core.
    #[error("unsupported ELF image: {0}")]
    UnsupportedElf(&'static str),

    /// Part of a program image falls outside every device on the bus.
    #[error("{len} bytes at {addr:#010x} do not fit in simulated memory")]
    OutOfRange {
        /// Start address of the rejected range.
        addr: u32,
        /// Length of the rejected range in bytes.
        len: usize,
    },
}
