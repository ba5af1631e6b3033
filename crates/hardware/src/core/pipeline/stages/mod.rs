//! Pipeline stage implementations.
//!
//! This module contains the individual implementations for the six stages of the
//! instruction pipeline. It includes:
//! 1. **Address:** Selects the next fetch address.
//! 2. **Fetch:** Retrieves instructions through the instruction port.
//! 3. **Decode:** Decodes instructions, resolves operands and predicts branches.
//! 4. **Execute:** Performs ALU operations and resolves branches.
//! 5. **Memory:** Handles loads, stores, CSRs and traps.
//! 6. **Writeback:** Commits results to the register file.

/// Next-fetch-address selection.
pub mod address;

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction execute stage implementation.
pub mod execute;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Memory access stage implementation.
pub mod memory;

/// Writeback stage implementation.
pub mod writeback;

/// Address stage entry point (AD stage).
pub use address::address_stage;
/// Decode stage entry point (ID stage).
pub use decode::decode_stage;
/// Execute stage entry point (EX stage).
pub use execute::execute_stage;
/// Fetch stage entry point (IF stage).
pub use fetch::fetch_stage;
/// Memory stage entry point (MEM stage).
pub use memory::mem_stage;
/// Writeback stage entry point (WB stage).
pub use writeback::wb_stage;
