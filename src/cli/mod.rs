//! CLI module for the round timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `session`: The interactive workout loop

pub mod commands;
pub mod display;
pub mod session;

pub use commands::{Cli, Commands, StartArgs};
pub use display::{Display, OutputMode};
pub use session::{
    apply_control, run_session, run_workout, toggle_mute, ControlCommand, SessionOptions,
    SessionOutcome,
};
