//! Command-line interface for music-shelf.
//!
//! This module provides CLI commands for scanning the library folder,
//! inspecting covers and editing per-track state.

mod commands;

pub use commands::{Cli, Commands, run_command};
