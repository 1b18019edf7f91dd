//! Power-on self-test orchestration
//!
//! A fixed linear diagnostic: reset, identify, switch to 4-byte addressing,
//! then erase/program/read one test region and verify the round-trip. The
//! sequence aborts on the first failure; there is no retry and no recovery.
//! An aborted erase or program leaves the chip in an indeterminate but not
//! unsafe state - the region is idempotently re-erasable on the next run.
//!
//! Each step is a public function so tests (and bring-up debugging) can run
//! them individually; [`run`] strings them together.

use crate::error::{Error, Result};
use crate::master::QspiMaster;
use crate::protocol;

/// Start of the test region
///
/// Placed just above the 16 MiB boundary so the diagnostic genuinely
/// exercises 4-byte addressing (a 3-byte address cannot reach it).
pub const TEST_ADDR: u32 = 0x0100_0000;

/// Size of the test window - one page
pub const TEST_PAGE_SIZE: usize = 256;

/// Size of the erased unit containing the test window
pub const SUBSECTOR_SIZE: usize = 4096;

/// XOR mask for the deterministic test pattern
pub const PATTERN_MASK: u8 = 0xA5;

/// Value every byte of an erased region reads as
pub const ERASED_VALUE: u8 = 0xFF;

/// Poll budget for fast operations (page program, mode switch)
pub const SHORT_TIMEOUT_MS: u32 = 100;

/// Poll budget for subsector erase (seconds worst case)
pub const ERASE_TIMEOUT_MS: u32 = 5000;

/// Fill `buf` with the test pattern: byte `i` = `i XOR PATTERN_MASK`
pub fn fill_test_pattern(buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = (i as u8) ^ PATTERN_MASK;
    }
}

/// Step 1: software reset, both commands must succeed
pub fn reset<M: QspiMaster>(master: &mut M) -> Result<()> {
    protocol::software_reset(master)
}

/// Step 2: read and log the JEDEC ID
///
/// The raw bytes are logged regardless of value - the diagnostic passes no
/// judgement on identity, it only proves the chip answers.
pub fn identify<M: QspiMaster>(master: &mut M) -> Result<[u8; 3]> {
    let id = protocol::read_id(master)?;
    log::info!("JEDEC ID: {:02X} {:02X} {:02X}", id[0], id[1], id[2]);
    Ok(id)
}

/// Step 3: enter 4-byte address mode and confirm the chip is not busy
pub fn setup_addressing<M: QspiMaster>(master: &mut M) -> Result<()> {
    protocol::enter_4byte_mode(master)?;
    protocol::wait_while_busy(master, SHORT_TIMEOUT_MS)
}

/// Step 4: erase the subsector containing the test region
pub fn erase_test_region<M: QspiMaster>(master: &mut M) -> Result<()> {
    log::info!("erasing 4KB @ 0x{:08X}", TEST_ADDR);
    protocol::erase_subsector_4b(master, TEST_ADDR)?;
    protocol::wait_while_busy(master, ERASE_TIMEOUT_MS)
}

/// Step 5: read back the test window and require every byte erased
///
/// Deliberately covers only `TEST_PAGE_SIZE` of the 4KB subsector - the
/// diagnostic checks the window it is about to program, not the whole
/// erase unit.
pub fn verify_erased<M: QspiMaster>(master: &mut M) -> Result<()> {
    let mut buf = [0u8; TEST_PAGE_SIZE];
    protocol::read_4b(master, TEST_ADDR, &mut buf)?;

    for (i, &byte) in buf.iter().enumerate() {
        if byte != ERASED_VALUE {
            return Err(Error::VerifyMismatch {
                offset: i as u32,
                expected: ERASED_VALUE,
                found: byte,
            });
        }
    }
    Ok(())
}

/// Step 6: program the test pattern over one page
pub fn program_test_pattern<M: QspiMaster>(master: &mut M) -> Result<()> {
    let mut pattern = [0u8; TEST_PAGE_SIZE];
    fill_test_pattern(&mut pattern);

    log::info!("programming {} bytes @ 0x{:08X}", pattern.len(), TEST_ADDR);
    protocol::page_program_4b(master, TEST_ADDR, &pattern)?;
    protocol::wait_while_busy(master, SHORT_TIMEOUT_MS)
}

/// Step 7: read back the test window and compare against the pattern
pub fn verify_test_pattern<M: QspiMaster>(master: &mut M) -> Result<()> {
    let mut expected = [0u8; TEST_PAGE_SIZE];
    fill_test_pattern(&mut expected);

    let mut buf = [0u8; TEST_PAGE_SIZE];
    protocol::read_4b(master, TEST_ADDR, &mut buf)?;

    for (i, (&want, &got)) in expected.iter().zip(buf.iter()).enumerate() {
        if want != got {
            return Err(Error::VerifyMismatch {
                offset: i as u32,
                expected: want,
                found: got,
            });
        }
    }
    Ok(())
}

/// Run the full diagnostic, aborting at the first failure
pub fn run<M: QspiMaster>(master: &mut M) -> Result<()> {
    log::info!("MT25Q self-test start");

    reset(master)?;
    identify(master)?;
    setup_addressing(master)?;
    erase_test_region(master)?;
    verify_erased(master)?;
    log::info!("erase OK");
    program_test_pattern(master)?;
    verify_test_pattern(master)?;

    log::info!("program/verify OK, connection and basic ops look good");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_is_offset_xor_mask() {
        let mut buf = [0u8; TEST_PAGE_SIZE];
        fill_test_pattern(&mut buf);
        assert_eq!(buf[0], 0xA5);
        assert_eq!(buf[1], 0xA4);
        assert_eq!(buf[0xA5], 0x00);
        for (i, &b) in buf.iter().enumerate() {
            assert_eq!(b, (i as u8) ^ PATTERN_MASK);
        }
    }

    #[test]
    fn test_region_exercises_4byte_addressing() {
        // A 3-byte address tops out at 16 MiB
        assert!(TEST_ADDR >= 1 << 24);
        assert!(TEST_PAGE_SIZE <= SUBSECTOR_SIZE);
    }
}
