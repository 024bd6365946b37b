//! Small helpers shared by the console binaries: typed environment
//! variable access and application configuration.

pub mod config;
pub mod env;
