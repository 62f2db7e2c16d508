//! vib-cargo - build plugin that compiles Rust projects inside vib recipes
//!
//! This crate provides functionality to:
//! - Parse the module descriptor and recipe context the host sends as JSON
//! - Fetch the module's sources into the recipe's sources directory
//! - Generate the shell command that builds the module with cargo and installs it
pub mod command;
pub mod config;
pub mod error;
pub mod module;
pub mod plugin;
pub mod resolver;
pub mod source;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};

// Re-export main API components
pub use config::{Bootstrap, PluginSettings};
pub use module::{ModuleDescriptor, RecipeContext};
pub use plugin::{BuildOutcome, PluginInfo, PluginType, describe_plugin, wire_result};
pub use resolver::ModuleResolver;
pub use source::{DryRunFetcher, FetchError, FsSourceFetcher, Source, SourceFetcher, SourceKind};
