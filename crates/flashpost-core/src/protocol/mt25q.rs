//! MT25Q command sequences
//!
//! This module translates logical flash operations into [`QspiCommand`]
//! transactions and drives the busy/ready protocol.
//!
//! Every write-type operation walks the same implicit state machine:
//! WREN issued -> WEL confirmed -> command issued -> busy -> idle. A failed
//! transition aborts the whole operation; there is no retry in the driver.
//! Erase and program only *start* the operation on the chip - the caller
//! must follow up with [`wait_while_busy`] using a budget that matches the
//! operation (erase is on the order of seconds worst case).

use crate::error::{Error, Result};
use crate::master::QspiMaster;
use crate::spi::{opcodes, QspiCommand, Status};

/// One page of the MT25Q program buffer
///
/// A program command's data must not cross a page boundary on this chip
/// family.
pub const PAGE_SIZE: usize = 256;

/// Bound on the WEL-confirmation poll inside [`write_enable`]
pub const WRITE_ENABLE_TIMEOUT_MS: u32 = 100;

/// Delay between status polls in [`wait_while_busy`]
const POLL_INTERVAL_MS: u32 = 1;

/// Settle time after the reset-enable/reset-memory pair (tRST is short)
const RESET_SETTLE_MS: u32 = 1;

/// Send a one-byte instruction with no address or data phase
pub fn issue_simple<M: QspiMaster>(master: &mut M, opcode: u8) -> Result<()> {
    let mut cmd = QspiCommand::simple(opcode);
    master.execute(&mut cmd)
}

/// Read the status register
pub fn read_status<M: QspiMaster>(master: &mut M) -> Result<Status> {
    let mut buf = [0u8; 1];
    let mut cmd = QspiCommand::read_reg(opcodes::RDSR, &mut buf);
    master.execute(&mut cmd)?;
    Ok(Status::from_byte(buf[0]))
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Polls the status register until WIP clears, returning `Ok(())` as soon
/// as it does. Returns [`Error::Timeout`] once `timeout_ms` has elapsed on
/// the master's tick source, or propagates the first failed poll. The
/// status is sampled at least once even with a zero budget.
pub fn wait_while_busy<M: QspiMaster>(master: &mut M, timeout_ms: u32) -> Result<()> {
    let start = master.ticks_ms();
    loop {
        if !read_status(master)?.busy() {
            return Ok(());
        }
        if master.ticks_ms().wrapping_sub(start) >= timeout_ms {
            return Err(Error::Timeout);
        }
        master.delay_ms(POLL_INTERVAL_MS);
    }
}

/// Send Write Enable and confirm the latch
///
/// Issues WREN, then polls status until WEL is observed set, bounded by
/// [`WRITE_ENABLE_TIMEOUT_MS`]. The chip clears WEL on completion of any
/// write-type command, so this must be called immediately before every
/// erase or program, with nothing else on the bus in between.
pub fn write_enable<M: QspiMaster>(master: &mut M) -> Result<()> {
    issue_simple(master, opcodes::WREN)?;

    let start = master.ticks_ms();
    loop {
        if read_status(master)?.write_enabled() {
            return Ok(());
        }
        if master.ticks_ms().wrapping_sub(start) >= WRITE_ENABLE_TIMEOUT_MS {
            return Err(Error::Timeout);
        }
        master.delay_ms(POLL_INTERVAL_MS);
    }
}

/// Read the 3-byte JEDEC ID (manufacturer, device type, capacity)
///
/// The bytes are returned raw; the caller decides what is acceptable.
pub fn read_id<M: QspiMaster>(master: &mut M) -> Result<[u8; 3]> {
    let mut id = [0u8; 3];
    let mut cmd = QspiCommand::read_reg(opcodes::RDID, &mut id);
    master.execute(&mut cmd)?;
    Ok(id)
}

/// Enter 4-byte address mode
///
/// The addressing width is a persistent mode bit on the chip, not a
/// per-command parameter, so this runs once before any 4-byte-address
/// operation. EN4B is latch-gated on the MT25Q.
pub fn enter_4byte_mode<M: QspiMaster>(master: &mut M) -> Result<()> {
    write_enable(master)?;
    issue_simple(master, opcodes::EN4B)
}

/// Start a 4KB subsector erase at `addr`
///
/// Only starts the operation; the caller must `wait_while_busy` with a
/// generous budget before touching the array again.
pub fn erase_subsector_4b<M: QspiMaster>(master: &mut M, addr: u32) -> Result<()> {
    write_enable(master)?;
    let mut cmd = QspiCommand::erase_4b(opcodes::SE_4B, addr);
    master.execute(&mut cmd)
}

/// Start programming one page at `addr`
///
/// Rejects an empty payload or one longer than [`PAGE_SIZE`] with
/// [`Error::InvalidLength`]. Only starts the operation; the caller must
/// `wait_while_busy` afterwards.
pub fn page_program_4b<M: QspiMaster>(master: &mut M, addr: u32, data: &[u8]) -> Result<()> {
    if data.is_empty() || data.len() > PAGE_SIZE {
        return Err(Error::InvalidLength);
    }

    write_enable(master)?;
    let mut cmd = QspiCommand::write_4b(opcodes::PP_4B, addr, data);
    master.execute(&mut cmd)
}

/// Read `buf.len()` bytes starting at `addr`
///
/// Reads are never latch-gated, so no write-enable is involved.
pub fn read_4b<M: QspiMaster>(master: &mut M, addr: u32, buf: &mut [u8]) -> Result<()> {
    let mut cmd = QspiCommand::read_4b(opcodes::READ_4B, addr, buf);
    master.execute(&mut cmd)
}

/// Send the software reset sequence (reset-enable, then reset-memory)
///
/// Both commands must succeed; a short settle delay follows.
pub fn software_reset<M: QspiMaster>(master: &mut M) -> Result<()> {
    issue_simple(master, opcodes::RSTEN)?;
    issue_simple(master, opcodes::RST)?;
    master.delay_ms(RESET_SETTLE_MS);
    Ok(())
}
