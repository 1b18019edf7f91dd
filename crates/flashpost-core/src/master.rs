//! Transport trait definitions
//!
//! The driver never touches a QSPI peripheral directly; everything goes
//! through [`QspiMaster`]. The platform side (HAL glue on a microcontroller,
//! or the in-memory chip model in flashpost-sim) implements this trait.

use crate::error::Result;
use crate::spi::QspiCommand;

/// A synchronous QSPI bus master
///
/// One transaction at a time, blocking until it completes or the transport's
/// own timeout fires. The trait also carries the two timing primitives the
/// driver needs: a blocking delay and a monotonic millisecond tick source
/// for bounding status-poll loops.
///
/// Exclusive ownership is assumed - only one logical caller ever drives the
/// bus, so implementations need no locking.
pub trait QspiMaster {
    /// Execute a single QSPI command
    ///
    /// The command contains all the information needed for the transaction:
    /// opcode, optional address (with width), dummy cycles, data to write,
    /// and a buffer to read into. Write and read phases are mutually
    /// exclusive on this chip's command set.
    fn execute(&mut self, cmd: &mut QspiCommand<'_>) -> Result<()>;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Monotonic millisecond counter
    ///
    /// Only differences are ever taken, so wrap-around is fine as long as
    /// callers use `wrapping_sub`.
    fn ticks_ms(&self) -> u32;
}
