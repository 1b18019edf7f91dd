//! QSPI types and command structures
//!
//! This module provides types for representing QSPI transactions,
//! the MT25Q opcode set, and the status register layout.

mod address;
mod command;
pub mod opcodes;
mod status;

pub use address::AddressWidth;
pub use command::QspiCommand;
pub use status::Status;
