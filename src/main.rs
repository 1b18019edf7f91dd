//! flashpost - power-on self-test for MT25Q QSPI NOR flash
//!
//! Runs the erase/program/verify diagnostic from flashpost-core against the
//! simulated chip from flashpost-sim. On a target board the same
//! `selftest::run` is driven through a `QspiMaster` implementation over the
//! real QSPI peripheral; here the simulator stands in, with optional fault
//! injection to demonstrate the failure reporting.

mod cli;

use clap::Parser;
use cli::{Cli, Fault};
use flashpost_core::selftest;
use flashpost_sim::{SimConfig, SimFlash};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match cli.inject {
        Fault::None => SimConfig::default(),
        Fault::StuckBusy => SimConfig {
            stuck_busy: true,
            ..SimConfig::default()
        },
        Fault::WeakByte => SimConfig {
            stuck_bits: Some((selftest::TEST_ADDR, 0x02)),
            ..SimConfig::default()
        },
    };

    let mut flash = SimFlash::new(config);
    match selftest::run(&mut flash) {
        Ok(()) => {
            log::info!("self-test passed");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("self-test failed: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
