//! Configuration management for inkpost.
//!
//! Parses `inkpost.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [render]
//! link_style = "footnote"
//! gfm = true
//! platform_prefixes = ["https://mp.weixin.qq.com/s"]
//! ```
//!
//! Explicit overrides can be applied during load via [`ConfigOverrides`].

use std::path::{Path, PathBuf};

use inkpost_renderer::{DEFAULT_PLATFORM_PREFIXES, LinkStyle, RenderOptions};
use serde::Deserialize;

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override link rendering mode.
    pub link_style: Option<LinkStyle>,
    /// Override GitHub Flavored Markdown flag.
    pub gfm: Option<bool>,
    /// Override first-party platform prefixes.
    pub platform_prefixes: Option<Vec<String>>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "inkpost.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render configuration.
    pub render: RenderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Link rendering mode.
    pub link_style: LinkStyle,
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// URL prefixes never converted to footnotes.
    pub platform_prefixes: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            link_style: LinkStyle::default(),
            gfm: true,
            platform_prefixes: DEFAULT_PLATFORM_PREFIXES
                .iter()
                .map(|&p| p.to_owned())
                .collect(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `inkpost.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// Overrides are applied after loading and validated together with the
    /// file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Build the renderer options described by this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_link_style(self.render.link_style)
            .with_gfm(self.render.gfm)
            .with_platform_prefixes(self.render.platform_prefixes.iter().cloned())
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for prefix in &self.render.platform_prefixes {
            require_non_empty(prefix, "render.platform_prefixes")?;
            require_http_url(prefix, "render.platform_prefixes")?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(link_style) = overrides.link_style {
            self.render.link_style = link_style;
        }
        if let Some(gfm) = overrides.gfm {
            self.render.gfm = gfm;
        }
        if let Some(prefixes) = &overrides.platform_prefixes {
            self.render.platform_prefixes.clone_from(prefixes);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.link_style, LinkStyle::Direct);
        assert!(config.render.gfm);
        assert_eq!(
            config.render.platform_prefixes,
            vec![
                "https://mp.weixin.qq.com/mp".to_owned(),
                "https://mp.weixin.qq.com/s".to_owned()
            ]
        );
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render.link_style, LinkStyle::Direct);
        assert!(config.render.gfm);
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
link_style = "footnote"
gfm = false
platform_prefixes = ["https://blog.example.com"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.link_style, LinkStyle::Footnote);
        assert!(!config.render.gfm);
        assert_eq!(
            config.render.platform_prefixes,
            vec!["https://blog.example.com".to_owned()]
        );
    }

    #[test]
    fn test_parse_unknown_link_style() {
        let toml = r#"
[render]
link_style = "inline"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_options() {
        let toml = r#"
[render]
link_style = "footnote"
platform_prefixes = ["https://blog.example.com"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let options = config.render_options();

        assert_eq!(options.link_style, LinkStyle::Footnote);
        assert!(options.gfm);
        assert!(options.is_platform_url("https://blog.example.com/post/1"));
        assert!(!options.is_platform_url("https://mp.weixin.qq.com/s/abc"));
    }

    #[test]
    fn test_default_render_options_match_renderer_defaults() {
        assert_eq!(Config::default().render_options(), RenderOptions::default());
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_prefix() {
        let mut config = Config::default();
        config.render.platform_prefixes = vec![String::new()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_prefix_invalid_scheme() {
        let mut config = Config::default();
        config.render.platform_prefixes = vec!["ftp://files.example.com".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));
    }

    #[test]
    fn test_validate_empty_prefix_list_passes() {
        let mut config = Config::default();
        config.render.platform_prefixes.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            link_style: Some(LinkStyle::Footnote),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        assert_eq!(config.render.link_style, LinkStyle::Footnote);
        assert!(config.render.gfm); // Unchanged
    }

    #[test]
    fn test_apply_overrides_multiple() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            link_style: Some(LinkStyle::Footnote),
            gfm: Some(false),
            platform_prefixes: Some(vec!["https://a.example".to_owned()]),
        };

        config.apply_overrides(&overrides);

        assert_eq!(config.render.link_style, LinkStyle::Footnote);
        assert!(!config.render.gfm);
        assert_eq!(
            config.render.platform_prefixes,
            vec!["https://a.example".to_owned()]
        );
    }

    #[test]
    fn test_apply_overrides_empty() {
        let mut config = Config::default();
        config.apply_overrides(&ConfigOverrides::default());
        assert_eq!(config.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[render]\nlink_style = \"footnote\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.render.link_style, LinkStyle::Footnote);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(
            matches!(err, ConfigError::NotFound(ref p) if *p == path),
            "Expected ConfigError::NotFound, got {err:?}"
        );
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpost.toml");
        std::fs::write(&path, "[render\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpost.toml");
        std::fs::write(&path, "[render]\nplatform_prefixes = [\"example.com\"]\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_overrides_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpost.toml");
        std::fs::write(&path, "[render]\nlink_style = \"footnote\"\ngfm = false\n").unwrap();
        let overrides = ConfigOverrides {
            link_style: Some(LinkStyle::Direct),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&overrides)).unwrap();

        assert_eq!(config.render.link_style, LinkStyle::Direct);
        assert!(!config.render.gfm);
    }

    #[test]
    fn test_load_validates_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpost.toml");
        std::fs::write(&path, "").unwrap();
        let overrides = ConfigOverrides {
            platform_prefixes: Some(vec!["mp.weixin.qq.com".to_owned()]),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let nested = dir.path().join("posts").join("2024");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }

    #[test]
    fn test_discover_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let nested = dir.path().join("posts");
        std::fs::create_dir_all(&nested).unwrap();
        let nearest = nested.join(CONFIG_FILENAME);
        std::fs::write(&nearest, "").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(nearest));
    }
}
