use crate::error::{Error, Result};
use crate::utils::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};

/// Paths of the enclosing recipe build, used only to place fetched sources
///
/// The host serializes its recipe struct with Go field names; only the two
/// directories matter here and every other key is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeContext {
    #[serde(
        rename = "DownloadsPath",
        alias = "downloadsPath",
        alias = "downloads_path",
        default,
        deserialize_with = "null_as_default"
    )]
    pub downloads_path: String,
    #[serde(
        rename = "SourcesPath",
        alias = "sourcesPath",
        alias = "sources_path",
        default,
        deserialize_with = "null_as_default"
    )]
    pub sources_path: String,
}

impl RecipeContext {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::MalformedRecipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_recipe_shape() {
        let recipe = RecipeContext::from_json(
            r#"{"Name": "desktop", "DownloadsPath": "/tmp/dl", "SourcesPath": "/tmp/src", "Stages": []}"#,
        )
        .unwrap();
        assert_eq!(recipe.downloads_path, "/tmp/dl");
        assert_eq!(recipe.sources_path, "/tmp/src");
    }

    #[test]
    fn test_aliases_and_missing_keys() {
        let recipe = RecipeContext::from_json(r#"{"downloads_path": "/dl"}"#).unwrap();
        assert_eq!(recipe.downloads_path, "/dl");
        assert!(recipe.sources_path.is_empty());
    }

    #[test]
    fn test_malformed_recipe() {
        let err = RecipeContext::from_json("{\"DownloadsPath\": ").unwrap_err();
        assert!(matches!(err, Error::MalformedRecipe(_)));
        assert!(err.to_string().starts_with("malformed recipe: "));

        let err = RecipeContext::from_json("null").unwrap_err();
        assert!(matches!(err, Error::MalformedRecipe(_)));
    }
}
