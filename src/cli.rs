//! CLI argument parsing

use clap::{Parser, ValueEnum};

/// Fault to inject into the simulated chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Fault {
    /// Healthy chip
    None,
    /// WIP never clears - exercises the timeout path
    StuckBusy,
    /// A bit in the test region refuses to program - exercises the
    /// verify-mismatch path
    WeakByte,
}

#[derive(Parser)]
#[command(name = "flashpost")]
#[command(author, version, about = "Power-on self-test for MT25Q QSPI NOR flash", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Fault to inject into the simulated chip
    #[arg(long, value_enum, default_value = "none")]
    pub inject: Fault,
}
