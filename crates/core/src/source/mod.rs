//! Source descriptors and the fetch collaborator that materializes them

mod fetcher;

pub use fetcher::FsSourceFetcher;

use crate::impl_case_insensitive_deserialize;
use crate::module::RecipeContext;
use crate::utils::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Kind of origin a source is fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Git,
    Tar,
    File,
    Local,
    #[default]
    Unknown,
}

impl_case_insensitive_deserialize!(
    SourceKind,
    fallback = Unknown,
    Git => "git",
    Tar => "tar",
    File => "file",
    Local => "local"
);

/// A fetchable origin plus optional architecture restrictions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checksum: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub branch: String,
    #[serde(
        rename = "onlyarches",
        alias = "onlyArches",
        alias = "only-arches",
        default,
        deserialize_with = "null_as_default"
    )]
    pub only_arches: Vec<String>,
}

impl Source {
    /// Last path segment of the URL, ignoring a trailing slash
    pub fn url_leaf(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// Empty restriction lists apply to every architecture
pub fn test_arch_applicable(only_arches: &[String], target_arch: &str) -> bool {
    only_arches.is_empty() || only_arches.iter().any(|arch| arch == target_arch)
}

/// Path of a source relative to the downloads or sources directory
pub fn get_source_path(source: &Source, module_name: &str) -> String {
    match source.kind {
        SourceKind::Git => {
            let repo = source.url_leaf().trim_end_matches(".git");
            join_segments(&[module_name, &source.destination, repo])
        }
        _ => join_segments(&[module_name, &source.destination]),
    }
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Failures raised while downloading or placing a source
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to download {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("git error: {0}")]
    Git(String),

    #[error("unsupported source type for {0}")]
    UnsupportedType(String),
}

/// Host-side collaborator that materializes sources before the build runs
pub trait SourceFetcher {
    /// Fetch a source into the recipe's downloads directory
    fn download_source(
        &self,
        recipe: &RecipeContext,
        source: &Source,
        module_name: &str,
    ) -> Result<(), FetchError>;

    /// Place a downloaded source under the recipe's sources directory
    fn move_source(
        &self,
        downloads_dir: &Path,
        sources_dir: &Path,
        source: &Source,
        module_name: &str,
    ) -> Result<(), FetchError>;
}

/// Fetcher that touches nothing, for previewing the generated command
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunFetcher;

impl SourceFetcher for DryRunFetcher {
    fn download_source(
        &self,
        _recipe: &RecipeContext,
        source: &Source,
        module_name: &str,
    ) -> Result<(), FetchError> {
        tracing::info!("dry run: would download {} for {}", source.url, module_name);
        Ok(())
    }

    fn move_source(
        &self,
        _downloads_dir: &Path,
        _sources_dir: &Path,
        source: &Source,
        module_name: &str,
    ) -> Result<(), FetchError> {
        tracing::info!(
            "dry run: would move {} to {}",
            source.url,
            get_source_path(source, module_name)
        );
        Ok(())
    }
}
