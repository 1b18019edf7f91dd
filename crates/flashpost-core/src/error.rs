//! Error types for flashpost-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// QSPI transfer failed
    TransferFailed,
    /// A bounded status poll exceeded its deadline
    Timeout,
    /// Data read back does not match expected content
    VerifyMismatch {
        /// Offset into the test region where the first mismatch was found
        offset: u32,
        /// The byte that should have been there
        expected: u8,
        /// The byte actually read
        found: u8,
    },
    /// Page program size is zero or crosses a page boundary
    InvalidLength,
    /// Address is beyond the flash chip size
    AddressOutOfBounds,
    /// Write-type command issued without the write-enable latch set
    WriteProtected,
    /// Opcode is not supported by the transport
    OpcodeNotSupported,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransferFailed => write!(f, "QSPI transfer failed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::VerifyMismatch {
                offset,
                expected,
                found,
            } => {
                write!(
                    f,
                    "verify mismatch at +{}: expected 0x{:02X}, found 0x{:02X}",
                    offset, expected, found
                )
            }
            Self::InvalidLength => write!(f, "program size is zero or exceeds one page"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::WriteProtected => write!(f, "write-enable latch not set"),
            Self::OpcodeNotSupported => write!(f, "opcode not supported by transport"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display_names_offset_and_both_bytes() {
        let e = Error::VerifyMismatch {
            offset: 7,
            expected: 0xA2,
            found: 0xA3,
        };
        let msg = std::format!("{}", e);
        assert_eq!(msg, "verify mismatch at +7: expected 0xA2, found 0xA3");
    }
}
