#![allow(dead_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod testbench;

pub use config::Config;
pub use error::{Error, SimulationError};
pub use testbench::{elaborate, elaborate_file, elaborate_with_config, Testbench};
