//! QSPI command structure

use super::AddressWidth;

/// A single QSPI transaction
///
/// Designed to avoid allocation - uses slices for data.
/// The lifetime parameter `'a` ties the command to the buffers it references.
/// A command is built fresh for each driver call and dropped as soon as the
/// transaction completes or fails.
pub struct QspiCommand<'a> {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any)
    pub address: Option<u32>,

    /// Address width
    pub address_width: AddressWidth,

    /// Number of dummy clock cycles after the address phase
    pub dummy_cycles: u8,

    /// Data to write after opcode/address/dummy
    pub write_data: &'a [u8],

    /// Buffer to read into (mutable)
    pub read_buf: &'a mut [u8],
}

impl<'a> QspiCommand<'a> {
    /// Create a simple command with no address or data (e.g., WREN, RSTEN)
    pub fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            dummy_cycles: 0,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Create a read register command with no address (e.g., RDSR, RDID)
    pub fn read_reg(opcode: u8, buf: &'a mut [u8]) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            dummy_cycles: 0,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a read command with 4-byte address
    pub fn read_4b(opcode: u8, addr: u32, buf: &'a mut [u8]) -> Self {
        Self {
            opcode,
            address: Some(addr),
            address_width: AddressWidth::FourByte,
            dummy_cycles: 0,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a write command with 4-byte address
    pub fn write_4b(opcode: u8, addr: u32, data: &'a [u8]) -> Self {
        Self {
            opcode,
            address: Some(addr),
            address_width: AddressWidth::FourByte,
            dummy_cycles: 0,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create an erase command with 4-byte address (address phase, no data)
    pub fn erase_4b(opcode: u8, addr: u32) -> Self {
        Self {
            opcode,
            address: Some(addr),
            address_width: AddressWidth::FourByte,
            dummy_cycles: 0,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Returns true if this command has a read phase
    pub fn has_read(&self) -> bool {
        !self.read_buf.is_empty()
    }

    /// Returns true if this command has a write phase
    pub fn has_write(&self) -> bool {
        !self.write_data.is_empty()
    }

    /// Returns true if this command has an address phase
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::opcodes;

    #[test]
    fn simple_command_has_no_phases() {
        let cmd = QspiCommand::simple(opcodes::WREN);
        assert_eq!(cmd.opcode, opcodes::WREN);
        assert_eq!(cmd.address_width, AddressWidth::None);
        assert!(!cmd.has_address());
        assert!(!cmd.has_read());
        assert!(!cmd.has_write());
    }

    #[test]
    fn erase_command_has_address_but_no_data() {
        let cmd = QspiCommand::erase_4b(opcodes::SE_4B, 0x0100_0000);
        assert_eq!(cmd.address, Some(0x0100_0000));
        assert_eq!(cmd.address_width, AddressWidth::FourByte);
        assert!(!cmd.has_read());
        assert!(!cmd.has_write());
    }

    #[test]
    fn program_command_carries_payload() {
        let data = [0x12, 0x34];
        let cmd = QspiCommand::write_4b(opcodes::PP_4B, 0x10, &data);
        assert_eq!(cmd.address_width, AddressWidth::FourByte);
        assert!(cmd.has_write());
        assert_eq!(cmd.write_data, &data);
    }
}
