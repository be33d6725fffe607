//! Command-line interface module.

mod args;
pub mod preview;
pub mod serve;
pub mod tokens;

pub use args::{Cli, Commands};
