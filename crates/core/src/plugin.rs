//! Plugin metadata and the string contract spoken with the host

use crate::error::Result;
use serde::{Serialize, Serializer};

pub const PLUGIN_NAME: &str = "cargo";
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Plugin categories understood by the host, encoded as integers on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginType {
    BuildPlugin = 0,
    FinalizePlugin = 1,
}

impl Serialize for PluginType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginInfo {
    pub name: String,
    #[serde(rename = "Type")]
    pub plugin_type: PluginType,
    pub use_container_cmds: bool,
}

impl PluginInfo {
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => format!("{ERROR_PREFIX}{e}"),
        }
    }
}

pub fn describe_plugin() -> PluginInfo {
    PluginInfo {
        name: PLUGIN_NAME.to_string(),
        plugin_type: PluginType::BuildPlugin,
        use_container_cmds: false,
    }
}

/// Successful result of resolving a module for one architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Shell command that builds and installs the module
    Command(String),
    /// The module does not apply to the target architecture and is skipped
    Inapplicable,
}

impl BuildOutcome {
    pub fn command(&self) -> Option<&str> {
        match self {
            BuildOutcome::Command(cmd) => Some(cmd),
            BuildOutcome::Inapplicable => None,
        }
    }

    pub fn into_wire(self) -> String {
        match self {
            BuildOutcome::Command(cmd) => cmd,
            BuildOutcome::Inapplicable => String::new(),
        }
    }
}

/// Flattens a build result into the host's string convention: the command,
/// an empty string for inapplicable modules, or `ERROR: <message>`
pub fn wire_result(result: Result<BuildOutcome>) -> String {
    match result {
        Ok(outcome) => outcome.into_wire(),
        Err(e) => format!("{ERROR_PREFIX}{e}"),
    }
}
