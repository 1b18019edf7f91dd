//! MT25Q command opcodes
//!
//! The subset of the MT25Q instruction set used by the self-test, as
//! documented in the Micron MT25Q datasheet. All instructions are single
//! bytes sent on one line; the 4-byte-address variants are the dedicated
//! opcodes rather than the 3-byte commands in extended-address mode.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write/erase operation
pub const WREN: u8 = 0x06;

// ============================================================================
// Status and identification
// ============================================================================

/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Read JEDEC ID (manufacturer + device type + capacity)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Read / program / erase, 4-byte address
// ============================================================================

/// Read Data with 4-byte address (slow read, no dummy cycles)
pub const READ_4B: u8 = 0x13;
/// Page Program with 4-byte address
pub const PP_4B: u8 = 0x12;
/// Subsector Erase 4KB with 4-byte address
pub const SE_4B: u8 = 0x21;

// ============================================================================
// 4-byte address mode control
// ============================================================================

/// Enter 4-Byte Address Mode
pub const EN4B: u8 = 0xB7;

// ============================================================================
// Software Reset
// ============================================================================

/// Reset Enable
pub const RSTEN: u8 = 0x66;
/// Reset Memory
pub const RST: u8 = 0x99;
