//! CLI subcommand implementations.

pub mod check;
pub mod log;
pub mod sessions;
pub mod util;
