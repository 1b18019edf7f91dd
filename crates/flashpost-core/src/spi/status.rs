//! Status register layout

use bitflags::bitflags;

bitflags! {
    /// MT25Q status register bits
    ///
    /// A snapshot of one RDSR byte. Never cached - the register is re-read
    /// on every poll.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Write In Progress - the chip is mid erase/program and will
        /// ignore new array commands until this clears
        const WIP = 1 << 0;
        /// Write Enable Latch - must be set for the chip to accept the
        /// next write-type command; consumed by that command
        const WEL = 1 << 1;
    }
}

impl Status {
    /// Interpret a raw RDSR byte, keeping unknown bits
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// True if an erase or program operation is still running
    pub const fn busy(&self) -> bool {
        self.contains(Self::WIP)
    }

    /// True if the write-enable latch is set
    pub const fn write_enabled(&self) -> bool {
        self.contains(Self::WEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_datasheet() {
        assert_eq!(Status::WIP.bits(), 0x01);
        assert_eq!(Status::WEL.bits(), 0x02);
    }

    #[test]
    fn from_byte_keeps_reserved_bits() {
        let s = Status::from_byte(0x83);
        assert!(s.busy());
        assert!(s.write_enabled());
        assert_eq!(s.bits(), 0x83);
    }

    #[test]
    fn idle_status_reads_clear() {
        let s = Status::from_byte(0x00);
        assert!(!s.busy());
        assert!(!s.write_enabled());
    }
}
