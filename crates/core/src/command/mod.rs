//! Build command generation

pub mod cargo_command;
pub mod script;
pub mod target;

// Re-export commonly used types
pub use cargo_command::CargoCommand;
pub use script::{ShellScript, shell_quote};
pub use target::Profile;
