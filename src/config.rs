//! Configuration for the filter key set.
//!
//! ```toml
//! [keys]
//! name = "name"
//! tag = "tags"
//! owner = "owner"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{FilterError, FilterResult};
use crate::keys::KeySet;
use crate::parser::FilterParser;

/// On-disk layout of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    /// Filter key -> record field.
    keys: Option<BTreeMap<String, String>>,
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub keys: KeySet,
    /// File the configuration was read from, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Default config file: `<config_dir>/catalog-filter/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catalog-filter").join("config.toml"))
    }

    /// Parse configuration from TOML text.
    ///
    /// Without a `[keys]` table the built-in key set is used.
    pub fn from_toml(content: &str) -> FilterResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let keys = match file.keys {
            None => KeySet::default(),
            Some(map) if map.is_empty() => {
                return Err(FilterError::config("[keys] must define at least one key"));
            }
            Some(map) => KeySet::new(map)?,
        };

        Ok(Self { keys, source: None })
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read when present and the built-in key set is used otherwise.
    pub fn load(path: Option<&Path>) -> FilterResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    info!("no config file found, using built-in filter keys");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| FilterError::io(&path, e))?;
        let mut config = Self::from_toml(&content)?;
        info!(path = %path.display(), keys = config.keys.len(), "loaded filter config");
        config.source = Some(path);
        Ok(config)
    }

    /// A parser over the configured keys.
    pub fn parser(&self) -> FilterParser {
        FilterParser::new(self.keys.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_table() {
        let config = Config::from_toml(
            r#"
            [keys]
            Name = "display_name"
            team = "owner"
            "#,
        )
        .unwrap();
        assert_eq!(config.keys.keys().collect::<Vec<_>>(), vec!["name", "team"]);
        assert_eq!(config.keys.field("NAME"), Some("display_name"));
        assert!(config.parser().parse("team:core").is_ok());
        assert!(config.parser().parse("tag:core").is_err());
    }

    #[test]
    fn test_missing_keys_table_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.keys, KeySet::default());
    }

    #[test]
    fn test_empty_keys_table_rejected() {
        let err = Config::from_toml("[keys]\n").unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn test_bad_input_rejected() {
        assert!(matches!(
            Config::from_toml("[keys]\n\"bad key\" = \"x\"\n"),
            Err(FilterError::InvalidKey(_))
        ));
        assert!(matches!(
            Config::from_toml("colour = \"red\"\n"),
            Err(FilterError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let path = Path::new("/nonexistent/catalog-filter.toml");
        let err = Config::load(Some(path)).unwrap_err();
        assert!(matches!(
            &err,
            FilterError::Io { path: p, source } if p == path && source.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(err.to_string().starts_with("IO error on /nonexistent/catalog-filter.toml"));
    }
}
