//! Program Loader.
//!
//! This module turns program files into memory images. It performs:
//! 1. **File reading:** Reads raw binaries or ELF files from disk.
//! 2. **ELF parsing:** Extracts the entry point and the loadable segments of a
//!    32-bit little-endian RISC-V executable.

use std::fs;
use std::path::Path;

use object::read::elf::ElfFile32;
use object::{Architecture, Endianness, Object, ObjectSegment};

use super::error::SimError;

/// A loadable segment of an ELF image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'data> {
    /// Load address.
    pub addr: u32,
    /// Initialized contents; the rest of the segment stays zero.
    pub data: &'data [u8],
}

/// Entry point and loadable segments of an ELF executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElfImage<'data> {
    /// Address of the first instruction.
    pub entry: u32,
    /// `PT_LOAD` segments in file order.
    pub segments: Vec<Segment<'data>>,
}

/// Reads a program file from disk.
///
/// # Arguments
///
/// * `path` - Path to a raw binary or ELF file.
///
/// # Returns
///
/// The raw bytes of the file.
pub fn read_program(path: &Path) -> Result<Vec<u8>, SimError> {
    fs::read(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses an RV32 little-endian ELF executable.
///
/// # Arguments
///
/// * `bytes` - Contents of the ELF file.
///
/// # Returns
///
/// The entry point and the segments to copy into memory, or an error if the
/// file is malformed or built for another machine.
pub fn parse_elf(bytes: &[u8]) -> Result<ElfImage<'_>, SimError> {
    let elf = ElfFile32::<Endianness>::parse(bytes)?;
    if elf.endianness() != Endianness::Little {
        return Err(SimError::UnsupportedElf("big-endian image"));
    }
    if elf.architecture() != Architecture::Riscv32 {
        return Err(SimError::UnsupportedElf("not a RISC-V 32-bit image"));
    }
    let entry = u32::try_from(elf.entry())
        .map_err(|_| SimError::UnsupportedElf("entry point above 4 GiB"))?;
    let segments = elf
        .segments()
        .map(|seg| {
            let addr = u32::try_from(seg.address())
                .map_err(|_| SimError::UnsupportedElf("segment above 4 GiB"))?;
            Ok(Segment {
                addr,
                data: seg.data()?,
            })
        })
        .collect::<Result<Vec<_>, SimError>>()?;
    Ok(ElfImage { entry, segments })
}
