//! One-shot release utilities exposed as subcommands.
//!
//! Unlike activation, these terminate the process with a non-zero status on
//! any unrecoverable error; they run as build steps with no partial-success
//! mode worth preserving.

pub mod changelog;
pub mod render;
