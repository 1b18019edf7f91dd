//! Address width types

/// Address width for QSPI commands
///
/// The MT25Q diagnostic drives the chip exclusively through the dedicated
/// 4-byte-address opcodes, so an address phase is either absent or a full
/// 32 bits wide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// No address phase
    #[default]
    None,
    /// 4-byte (32-bit) address - supports up to 4 GiB
    FourByte,
}
