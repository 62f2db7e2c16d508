pub mod build;
pub mod info;

pub use build::{build_command, render_build};
pub use info::info_command;
