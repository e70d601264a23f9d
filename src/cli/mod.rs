//! CLI infrastructure for the `qlearn` binary
//!
//! This module provides the command-line interface for training agents,
//! replaying saved Q-tables and inspecting snapshots.

pub mod commands;
pub mod config;
pub mod output;
