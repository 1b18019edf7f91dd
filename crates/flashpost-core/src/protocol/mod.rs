//! Protocol implementations
//!
//! Command sequences and busy/ready polling for the MT25Q command set.

mod mt25q;

pub use mt25q::*;
