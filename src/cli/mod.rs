pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ProvisionArgs};
pub use output::{OutputFormat, OutputFormatter};
