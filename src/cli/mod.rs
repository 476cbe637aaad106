//! Command-line interface module.

mod args;
pub mod build;
pub mod check;
pub mod locate;

pub use args::{Cli, Commands};
