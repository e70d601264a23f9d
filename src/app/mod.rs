//! Application layer: run configuration shared by the CLI and library users.

pub mod config;

pub use config::RunConfig;
