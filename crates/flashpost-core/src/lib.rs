//! flashpost-core - QSPI command driver and self-test sequencer for MT25Q
//!
//! This crate implements the command/status protocol for Micron MT25Q-family
//! NOR flash chips and a power-on diagnostic that exercises it: reset,
//! identify, erase, program, and read back one fixed test region.
//!
//! The crate is `no_std` compatible; the actual bus access is abstracted
//! behind the [`master::QspiMaster`] trait, so the same sequences run against
//! real QSPI hardware or an in-memory chip model.
//!
//! # Example
//!
//! ```ignore
//! use flashpost_core::{master::QspiMaster, selftest};
//!
//! fn post<M: QspiMaster>(master: &mut M) {
//!     match selftest::run(master) {
//!         Ok(()) => log::info!("flash self-test passed"),
//!         Err(e) => log::error!("flash self-test failed: {}", e),
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod error;
pub mod master;
pub mod protocol;
pub mod selftest;
pub mod spi;

pub use error::{Error, Result};
