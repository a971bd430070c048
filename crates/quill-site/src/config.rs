//! Site configuration: the raw `config.yml` document and its resolved,
//! immutable form.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors loading or parsing `config.yml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Build mode, selected by the CLI subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Use `baseUrl` — the real published address.
    Publish,
    /// Use `testUrl` — a local or staging address.
    Preview,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Publish => write!(f, "publish"),
            Mode::Preview => write!(f, "preview"),
        }
    }
}

/// One collection definition from `config.yml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CollectionDef {
    /// Group pages by the property named after this collection.
    #[serde(default)]
    pub has_property: bool,

    /// Alternative mode: a flat, named list of pages whose property
    /// scalar-equals a fixed value. No value pages are synthesized.
    #[serde(default)]
    pub property_equals: Option<PropertyEquals>,

    /// Template for synthesized per-value index pages.
    #[serde(default)]
    pub prop_value_template: Option<String>,

    /// Template for the synthesized root page. The root page exists
    /// only when this is set.
    #[serde(default)]
    pub root_template: Option<String>,

    #[serde(default)]
    pub root_title: Option<String>,

    /// Fold the root page into the site-wide menu.
    #[serde(default)]
    pub add_to_menu: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEquals {
    pub property: String,
    pub value: String,
}

/// The `config.yml` document exactly as written.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub base_url: String,
    pub test_url: String,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub collections: BTreeMap<String, CollectionDef>,

    /// Optional template name for a site-wide stylesheet artifact.
    #[serde(default)]
    pub stylesheet: Option<String>,

    #[serde(default = "default_template")]
    pub default_template: String,
}

fn default_date_format() -> String {
    "%B %e, %Y".to_string()
}

fn default_template() -> String {
    "default".to_string()
}

impl RawConfig {
    /// Load `config.yml` from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved configuration. Built once by [`SiteConfig::resolve`]
/// and never mutated afterwards; every render context reads from it.
#[derive(Debug, Clone, Serialize)]
pub struct SiteConfig {
    /// The URL selected for this build mode.
    pub base_url: String,
    pub date_format: String,

    #[serde(skip)]
    pub collections: BTreeMap<String, CollectionDef>,

    #[serde(skip)]
    pub stylesheet: Option<String>,

    #[serde(skip)]
    pub default_template: String,
}

impl SiteConfig {
    /// Resolve a raw document for one build mode. Pure: the raw
    /// config is consumed, nothing is mutated in place.
    pub fn resolve(raw: RawConfig, mode: Mode) -> Self {
        let base_url = match mode {
            Mode::Publish => raw.base_url,
            Mode::Preview => raw.test_url,
        };

        Self {
            base_url,
            date_format: raw.date_format,
            collections: raw.collections,
            stylesheet: raw.stylesheet,
            default_template: raw.default_template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "\
baseUrl: https://example.org
testUrl: http://localhost:8000
dateFormat: \"%Y-%m-%d\"
collections:
  tags:
    hasProperty: true
    propValueTemplate: tag
    rootTemplate: tags
    rootTitle: All tags
    addToMenu: true
  posts:
    propertyEquals:
      property: kind
      value: post
    rootTemplate: posts
";

    #[test]
    fn parses_full_config() {
        let raw: RawConfig = serde_yaml::from_str(CONFIG).unwrap();

        assert_eq!(raw.base_url, "https://example.org");
        assert_eq!(raw.date_format, "%Y-%m-%d");

        let tags = &raw.collections["tags"];
        assert!(tags.has_property);
        assert_eq!(tags.prop_value_template.as_deref(), Some("tag"));
        assert!(tags.add_to_menu);

        let posts = &raw.collections["posts"];
        let eq = posts.property_equals.as_ref().unwrap();
        assert_eq!(eq.property, "kind");
        assert_eq!(eq.value, "post");
    }

    #[test]
    fn resolve_selects_url_by_mode() {
        let raw: RawConfig = serde_yaml::from_str(CONFIG).unwrap();
        let publish = SiteConfig::resolve(raw, Mode::Publish);
        assert_eq!(publish.base_url, "https://example.org");

        let raw: RawConfig = serde_yaml::from_str(CONFIG).unwrap();
        let preview = SiteConfig::resolve(raw, Mode::Preview);
        assert_eq!(preview.base_url, "http://localhost:8000");
    }

    #[test]
    fn defaults_apply_when_absent() {
        let raw: RawConfig =
            serde_yaml::from_str("baseUrl: a\ntestUrl: b\n").unwrap();

        assert_eq!(raw.default_template, "default");
        assert!(raw.collections.is_empty());
        assert!(raw.stylesheet.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = RawConfig::load(Path::new("/nonexistent/config.yml")).unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
