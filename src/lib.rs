//! Common functionality for PolicySim, a tool for evaluating urban transportation policies.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod analysis;
pub mod cli;
pub mod context;
pub mod id;
pub mod input;
pub mod log;
pub mod mode;
pub mod model;
pub mod output;
pub mod parameters;
pub mod policy;
pub mod scenario;
pub mod settings;
pub mod simulation;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the folder in which program configuration files are stored.
///
/// Falls back to the current working directory if the platform has no config folder.
pub fn get_policysim_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::new();
    };
    config_dir.push("policysim");

    config_dir
}
