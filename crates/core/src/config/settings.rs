use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the generated command obtains `cargo` when the build image lacks it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bootstrap {
    /// Upstream rustup installer, installs into `$HOME/.cargo/bin`
    #[default]
    Rustup,
    /// Distribution package via apt
    Apt,
}

impl Bootstrap {
    /// Shell fragment that makes `cargo` available on `PATH`
    pub fn to_shell(self) -> String {
        match self {
            Bootstrap::Rustup => concat!(
                r#"export PATH="$HOME/.cargo/bin:$PATH" && "#,
                "if ! command -v cargo >/dev/null 2>&1; then ",
                "echo 'installing rustup...' >&2 && ",
                "curl https://sh.rustup.rs -sSf | sh -s -- -y; fi"
            )
            .to_string(),
            Bootstrap::Apt => concat!(
                "if ! command -v cargo >/dev/null 2>&1; then ",
                "apt-get update && apt-get install -y cargo; fi"
            )
            .to_string(),
        }
    }
}

/// Policy defaults applied when a module descriptor leaves a field empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PluginSettings {
    pub default_install_path: String,
    pub default_build_flags: Vec<String>,
    pub bootstrap: Bootstrap,
    /// Directory the build container mounts the recipe's sources under
    pub work_root: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            default_install_path: "/usr/bin".to_string(),
            default_build_flags: vec!["--locked".to_string()],
            bootstrap: Bootstrap::Rustup,
            work_root: "/sources".to_string(),
        }
    }
}

impl PluginSettings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse settings: {e}")))?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize settings: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
