//! flashpost-sim - In-memory MT25Q behavioral model
//!
//! This crate provides a simulated MT25Q flash chip that implements the
//! [`QspiMaster`] transport, so the protocol driver and self-test can run
//! without hardware. The model tracks the write-enable latch, the
//! write-in-progress window on a virtual millisecond clock, the software
//! reset handshake, and the program-can-only-clear-bits rule.
//!
//! Two fault-injection knobs exist for exercising the failure paths:
//! a chip that never leaves the busy state, and stuck-at-1 bits that
//! refuse to program.

use flashpost_core::error::{Error, Result};
use flashpost_core::master::QspiMaster;
use flashpost_core::spi::{opcodes, AddressWidth, QspiCommand, Status};

/// Configuration for the simulated chip
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// JEDEC ID bytes (manufacturer, device type, capacity)
    pub jedec_id: [u8; 3],
    /// Flash size in bytes
    pub size: usize,
    /// Page size for programming
    pub page_size: usize,
    /// Subsector size for the smallest erase
    pub subsector_size: usize,
    /// How long a subsector erase keeps WIP set, in virtual milliseconds
    pub erase_latency_ms: u32,
    /// How long a page program keeps WIP set, in virtual milliseconds
    pub program_latency_ms: u32,
    /// Fault: WIP never clears
    pub stuck_busy: bool,
    /// Fault: at this address, these bits read back 1 no matter what was
    /// programmed
    pub stuck_bits: Option<(u32, u8)>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            jedec_id: [0x20, 0xBA, 0x20], // Micron MT25QL512
            size: 64 * 1024 * 1024,
            page_size: 256,
            subsector_size: 4096,
            erase_latency_ms: 30,
            program_latency_ms: 1,
            stuck_busy: false,
            stuck_bits: None,
        }
    }
}

/// Simulated MT25Q flash chip
///
/// Doubles as the transport: executing a command applies it directly to the
/// in-memory array. Time only advances through `delay_ms`, which keeps the
/// busy-window and timeout tests deterministic.
pub struct SimFlash {
    config: SimConfig,
    data: Vec<u8>,
    clock_ms: u32,
    busy_until_ms: u32,
    write_enabled: bool,
    in_4byte_mode: bool,
    reset_enabled: bool,
}

impl SimFlash {
    /// Create a new simulated chip, fully erased
    pub fn new(config: SimConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            clock_ms: 0,
            busy_until_ms: 0,
            write_enabled: false,
            in_4byte_mode: false,
            reset_enabled: false,
        }
    }

    /// Create a simulated chip with the default configuration (MT25QL512)
    pub fn new_default() -> Self {
        Self::new(SimConfig::default())
    }

    /// Get a reference to the flash array
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash array
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// True if the chip has been switched to 4-byte address mode
    pub fn in_4byte_mode(&self) -> bool {
        self.in_4byte_mode
    }

    fn busy(&self) -> bool {
        self.config.stuck_busy || self.clock_ms < self.busy_until_ms
    }

    fn status_byte(&self) -> u8 {
        let mut status = Status::empty();
        if self.busy() {
            status |= Status::WIP;
        }
        if self.write_enabled {
            status |= Status::WEL;
        }
        status.bits()
    }

    /// Extract the 32-bit address phase of an array command
    ///
    /// A command built without its address phase is malformed and must
    /// surface as an error rather than silently target address 0.
    fn require_addr(cmd: &QspiCommand<'_>) -> Result<usize> {
        if cmd.address_width != AddressWidth::FourByte {
            return Err(Error::TransferFailed);
        }
        match cmd.address {
            Some(addr) => Ok(addr as usize),
            None => Err(Error::TransferFailed),
        }
    }

    /// Consume the write-enable latch, or reject the command
    fn take_write_enable(&mut self) -> Result<()> {
        if !self.write_enabled {
            return Err(Error::WriteProtected);
        }
        self.write_enabled = false;
        Ok(())
    }

    fn handle_read(&mut self, cmd: &mut QspiCommand<'_>) -> Result<()> {
        let addr = Self::require_addr(cmd)?;
        let len = cmd.read_buf.len();

        if addr + len > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        cmd.read_buf.copy_from_slice(&self.data[addr..addr + len]);
        Ok(())
    }

    fn handle_page_program(&mut self, cmd: &QspiCommand<'_>) -> Result<()> {
        let addr = Self::require_addr(cmd)?;
        self.take_write_enable()?;

        let data = cmd.write_data;

        if addr + data.len() > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        // Programming can only change bits 1 -> 0
        for (i, &byte) in data.iter().enumerate() {
            self.data[addr + i] &= byte;
        }

        if let Some((stuck_addr, mask)) = self.config.stuck_bits {
            let stuck_addr = stuck_addr as usize;
            if (addr..addr + data.len()).contains(&stuck_addr) {
                self.data[stuck_addr] |= mask;
            }
        }

        self.busy_until_ms = self.clock_ms.wrapping_add(self.config.program_latency_ms);
        Ok(())
    }

    fn handle_subsector_erase(&mut self, cmd: &QspiCommand<'_>) -> Result<()> {
        let addr = Self::require_addr(cmd)?;
        self.take_write_enable()?;

        let erase_size = self.config.subsector_size;
        let aligned = addr & !(erase_size - 1);

        if aligned + erase_size > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        for byte in &mut self.data[aligned..aligned + erase_size] {
            *byte = 0xFF;
        }

        self.busy_until_ms = self.clock_ms.wrapping_add(self.config.erase_latency_ms);
        Ok(())
    }

    fn handle_reset(&mut self) {
        self.write_enabled = false;
        self.in_4byte_mode = false;
        self.busy_until_ms = self.clock_ms;
    }
}

impl QspiMaster for SimFlash {
    fn execute(&mut self, cmd: &mut QspiCommand<'_>) -> Result<()> {
        log::trace!("sim: opcode 0x{:02X}", cmd.opcode);

        // While WIP is set the chip only answers status, ID, and array
        // reads; everything else - including RSTEN, so it cannot arm a
        // reset - is silently dropped, as on the real part.
        if self.busy()
            && !matches!(cmd.opcode, opcodes::RDSR | opcodes::RDID | opcodes::READ_4B)
        {
            return Ok(());
        }

        // RST is only honored directly after RSTEN
        let reset_armed = self.reset_enabled;
        self.reset_enabled = cmd.opcode == opcodes::RSTEN;

        match cmd.opcode {
            opcodes::RDID => {
                let len = cmd.read_buf.len().min(3);
                cmd.read_buf[..len].copy_from_slice(&self.config.jedec_id[..len]);
                Ok(())
            }

            opcodes::RDSR => {
                if !cmd.read_buf.is_empty() {
                    cmd.read_buf[0] = self.status_byte();
                }
                Ok(())
            }

            opcodes::WREN => {
                self.write_enabled = true;
                Ok(())
            }

            opcodes::EN4B => {
                self.take_write_enable()?;
                self.in_4byte_mode = true;
                Ok(())
            }

            opcodes::READ_4B => self.handle_read(cmd),
            opcodes::PP_4B => self.handle_page_program(cmd),
            opcodes::SE_4B => self.handle_subsector_erase(cmd),

            opcodes::RSTEN => Ok(()),
            opcodes::RST => {
                if reset_armed {
                    self.handle_reset();
                }
                Ok(())
            }

            _ => Err(Error::OpcodeNotSupported),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock_ms = self.clock_ms.wrapping_add(ms);
    }

    fn ticks_ms(&self) -> u32 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashpost_core::{protocol, selftest};

    #[test]
    fn read_id_returns_configured_bytes() {
        let mut flash = SimFlash::new_default();
        let id = protocol::read_id(&mut flash).unwrap();
        assert_eq!(id, [0x20, 0xBA, 0x20]);
    }

    #[test]
    fn write_enable_sets_latch_and_is_idempotent() {
        let mut flash = SimFlash::new_default();
        protocol::write_enable(&mut flash).unwrap();
        assert!(protocol::read_status(&mut flash).unwrap().write_enabled());

        // Repeating with no intervening write-type command is harmless
        protocol::write_enable(&mut flash).unwrap();
        protocol::write_enable(&mut flash).unwrap();
        assert!(protocol::read_status(&mut flash).unwrap().write_enabled());
    }

    #[test]
    fn latch_is_consumed_by_program() {
        let mut flash = SimFlash::new_default();
        protocol::page_program_4b(&mut flash, 0, &[0x00]).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::SHORT_TIMEOUT_MS).unwrap();
        assert!(!protocol::read_status(&mut flash).unwrap().write_enabled());
    }

    #[test]
    fn page_program_rejects_bad_sizes() {
        let mut flash = SimFlash::new_default();
        assert_eq!(
            protocol::page_program_4b(&mut flash, 0, &[]),
            Err(Error::InvalidLength)
        );
        let too_big = [0u8; 257];
        assert_eq!(
            protocol::page_program_4b(&mut flash, 0, &too_big),
            Err(Error::InvalidLength)
        );
    }

    #[test]
    fn page_program_accepts_one_to_page_size() {
        let mut flash = SimFlash::new_default();
        protocol::page_program_4b(&mut flash, 0, &[0x42]).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::SHORT_TIMEOUT_MS).unwrap();

        let full = [0x42u8; 256];
        protocol::page_program_4b(&mut flash, 0x100, &full).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::SHORT_TIMEOUT_MS).unwrap();

        let mut buf = [0u8; 256];
        protocol::read_4b(&mut flash, 0x100, &mut buf).unwrap();
        assert_eq!(buf, full);
    }

    #[test]
    fn erase_restores_all_ff() {
        let mut flash = SimFlash::new_default();
        let zeros = [0u8; 256];
        protocol::page_program_4b(&mut flash, 0x2000, &zeros).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::SHORT_TIMEOUT_MS).unwrap();

        protocol::erase_subsector_4b(&mut flash, 0x2000).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::ERASE_TIMEOUT_MS).unwrap();

        let mut buf = [0u8; 256];
        protocol::read_4b(&mut flash, 0x2000, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn wait_while_busy_returns_ok_when_idle() {
        let mut flash = SimFlash::new_default();
        let before = flash.ticks_ms();
        protocol::wait_while_busy(&mut flash, 0).unwrap();
        // Returned on the first poll, without burning the budget
        assert_eq!(flash.ticks_ms(), before);
    }

    #[test]
    fn wait_while_busy_outlasts_an_erase() {
        let mut flash = SimFlash::new_default();
        protocol::erase_subsector_4b(&mut flash, 0).unwrap();
        assert!(protocol::read_status(&mut flash).unwrap().busy());
        protocol::wait_while_busy(&mut flash, selftest::ERASE_TIMEOUT_MS).unwrap();
        assert!(!protocol::read_status(&mut flash).unwrap().busy());
    }

    #[test]
    fn wait_while_busy_times_out_on_stuck_chip() {
        let mut flash = SimFlash::new(SimConfig {
            stuck_busy: true,
            ..SimConfig::default()
        });
        assert_eq!(
            protocol::wait_while_busy(&mut flash, 50),
            Err(Error::Timeout)
        );
        // The deadline was honored against the tick source
        assert!(flash.ticks_ms() >= 50);
    }

    #[test]
    fn reset_requires_the_enable_prefix() {
        let mut flash = SimFlash::new_default();
        protocol::enter_4byte_mode(&mut flash).unwrap();
        assert!(flash.in_4byte_mode());

        // A bare RST is ignored
        protocol::issue_simple(&mut flash, opcodes::RST).unwrap();
        assert!(flash.in_4byte_mode());

        protocol::software_reset(&mut flash).unwrap();
        assert!(!flash.in_4byte_mode());
    }

    #[test]
    fn reset_is_not_armed_while_busy() {
        let mut flash = SimFlash::new_default();
        protocol::enter_4byte_mode(&mut flash).unwrap();
        protocol::erase_subsector_4b(&mut flash, 0).unwrap();
        assert!(protocol::read_status(&mut flash).unwrap().busy());

        // Both reset commands land inside the erase window and are dropped
        protocol::software_reset(&mut flash).unwrap();
        assert!(flash.in_4byte_mode());

        protocol::wait_while_busy(&mut flash, selftest::ERASE_TIMEOUT_MS).unwrap();

        // The dropped RSTEN must not have armed a reset either
        protocol::issue_simple(&mut flash, opcodes::RST).unwrap();
        assert!(flash.in_4byte_mode());
    }

    #[test]
    fn array_command_without_address_is_rejected() {
        let mut flash = SimFlash::new_default();

        let mut buf = [0u8; 4];
        let mut cmd = QspiCommand::read_reg(opcodes::READ_4B, &mut buf);
        assert_eq!(flash.execute(&mut cmd), Err(Error::TransferFailed));

        // An erase missing its address phase is rejected too, before the
        // latch is consumed
        protocol::write_enable(&mut flash).unwrap();
        let mut cmd = QspiCommand::simple(opcodes::SE_4B);
        assert_eq!(flash.execute(&mut cmd), Err(Error::TransferFailed));
        assert!(protocol::read_status(&mut flash).unwrap().write_enabled());
    }

    #[test]
    fn selftest_passes_on_healthy_chip() {
        let mut flash = SimFlash::new_default();
        selftest::run(&mut flash).unwrap();

        assert!(flash.in_4byte_mode());
        let start = selftest::TEST_ADDR as usize;
        for i in 0..selftest::TEST_PAGE_SIZE {
            assert_eq!(flash.data()[start + i], (i as u8) ^ selftest::PATTERN_MASK);
        }
    }

    #[test]
    fn selftest_reports_first_program_mismatch() {
        // Bit 1 at the first test byte refuses to program; the pattern
        // byte there is 0xA5, so it reads back 0xA7.
        let mut flash = SimFlash::new(SimConfig {
            stuck_bits: Some((selftest::TEST_ADDR, 0x02)),
            ..SimConfig::default()
        });
        assert_eq!(
            selftest::run(&mut flash),
            Err(Error::VerifyMismatch {
                offset: 0,
                expected: 0xA5,
                found: 0xA7,
            })
        );
    }

    #[test]
    fn selftest_times_out_on_stuck_chip() {
        let mut flash = SimFlash::new(SimConfig {
            stuck_busy: true,
            ..SimConfig::default()
        });
        assert_eq!(selftest::run(&mut flash), Err(Error::Timeout));
    }

    #[test]
    fn verify_erased_reports_offset_of_leftover_byte() {
        let mut flash = SimFlash::new_default();
        selftest::reset(&mut flash).unwrap();
        selftest::setup_addressing(&mut flash).unwrap();
        selftest::erase_test_region(&mut flash).unwrap();

        flash.data_mut()[selftest::TEST_ADDR as usize + 5] = 0x12;
        assert_eq!(
            selftest::verify_erased(&mut flash),
            Err(Error::VerifyMismatch {
                offset: 5,
                expected: 0xFF,
                found: 0x12,
            })
        );
    }

    #[test]
    fn verify_covers_only_the_test_window() {
        // The erased unit is 4KB but the diagnostic only checks one page;
        // garbage past the window must not fail the erase verify.
        let mut flash = SimFlash::new_default();
        selftest::reset(&mut flash).unwrap();
        selftest::setup_addressing(&mut flash).unwrap();
        selftest::erase_test_region(&mut flash).unwrap();

        let past_window = selftest::TEST_ADDR as usize + selftest::TEST_PAGE_SIZE;
        flash.data_mut()[past_window] = 0x00;
        selftest::verify_erased(&mut flash).unwrap();
    }

    #[test]
    fn program_only_clears_bits() {
        let mut flash = SimFlash::new_default();
        protocol::page_program_4b(&mut flash, 0x3000, &[0x0F]).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::SHORT_TIMEOUT_MS).unwrap();
        protocol::page_program_4b(&mut flash, 0x3000, &[0xF0]).unwrap();
        protocol::wait_while_busy(&mut flash, selftest::SHORT_TIMEOUT_MS).unwrap();

        let mut buf = [0u8; 1];
        protocol::read_4b(&mut flash, 0x3000, &mut buf).unwrap();
        assert_eq!(buf[0], 0x00);
    }

    #[test]
    fn read_past_end_is_rejected() {
        let mut flash = SimFlash::new(SimConfig {
            size: 0x2000,
            ..SimConfig::default()
        });
        let mut buf = [0u8; 16];
        assert_eq!(
            protocol::read_4b(&mut flash, 0x1FF8, &mut buf),
            Err(Error::AddressOutOfBounds)
        );
    }
}
