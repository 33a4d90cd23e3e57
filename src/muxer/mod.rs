pub mod command_builder;
pub mod process;

pub use command_builder::{BuiltCommands, CommandBuilder, CommandSpec};
pub use process::run_tool;
