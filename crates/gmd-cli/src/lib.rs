//! Library components of the `gmd` command-line tool.

pub mod commands;
pub mod logging;
pub mod songs;
