use crate::config::PluginSettings;
use crate::error::{Error, Result};
use crate::source::Source;
use crate::utils::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};

/// Declarative description of one cargo module in a vib recipe
///
/// Both `sources` and the single `source` key are accepted; a non-empty
/// `sources` list always wins and `source` is only read when it is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Unset builds in release mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<bool>,
    #[serde(rename = "no-default", default, deserialize_with = "null_as_default")]
    pub no_default_features: bool,
    #[serde(rename = "install-path", default, deserialize_with = "null_as_default")]
    pub install_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(rename = "build-flags", default, deserialize_with = "null_as_default")]
    pub build_flags: Vec<String>,
}

impl ModuleDescriptor {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::MalformedModule)
    }

    pub fn resolved_sources(&self) -> Vec<Source> {
        if !self.sources.is_empty() {
            return self.sources.clone();
        }
        self.source.iter().cloned().collect()
    }

    pub fn is_release(&self) -> bool {
        self.release.unwrap_or(true)
    }

    pub fn effective_build_flags(&self, settings: &PluginSettings) -> Vec<String> {
        if self.build_flags.is_empty() {
            settings.default_build_flags.clone()
        } else {
            self.build_flags.clone()
        }
    }

    pub fn effective_install_path(&self, settings: &PluginSettings) -> String {
        if self.install_path.is_empty() {
            settings.default_install_path.clone()
        } else {
            self.install_path.clone()
        }
    }
}
