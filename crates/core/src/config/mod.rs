//! Plugin policy settings

mod settings;

pub use settings::{Bootstrap, PluginSettings};
