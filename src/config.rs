use anyhow::{Context, Result};
use regex::{Captures, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::internal::error::TimestampResult;
use crate::internal::models::TimestampStyle;
use crate::internal::render::{TimestampRenderer, resolve_time_zone};
use crate::utils::phrases::{EnglishPhrases, Numeric, PhraseStyle};
use crate::utils::units::UnitTable;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Style used when a timestamp is given without one (Discord defaults to "f")
    #[serde(default)]
    pub default_style: TimestampStyle,
    /// IANA time zone for absolute styles (e.g. "Europe/Berlin").
    /// `None` uses the system time zone.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// `auto` allows "yesterday" / "next week"; `always` keeps numbers.
    #[serde(default)]
    pub numeric: Numeric,
    /// `long` ("3 hours ago") or `narrow` ("3h ago")
    #[serde(default)]
    pub phrase_style: PhraseStyle,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level, overridden entirely by RUST_LOG when set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Per-module levels, e.g. `{"discord_time::internal::live": "debug"}`
    #[serde(default)]
    pub module_levels: BTreeMap<String, String>,
    /// Write logs to a daily rolling file in this directory instead of stderr
    #[serde(default)]
    pub log_directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            module_levels: BTreeMap::new(),
            log_directory: None,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive string built from the level and module overrides.
    pub fn filter_directives(&self) -> String {
        let mut filter_str = self.level.clone();
        for (module, level) in &self.module_levels {
            filter_str.push_str(&format!(",{}={}", module, level));
        }
        filter_str
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_style: TimestampStyle::default(),
            time_zone: None,
            numeric: Numeric::default(),
            phrase_style: PhraseStyle::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// First `config.ron` found in the current directory or next to the executable.
    pub fn discover() -> Option<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current working directory
        candidates.push(PathBuf::from("config.ron"));

        // 2. Next to executable
        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join("config.ron"));
        }

        candidates.into_iter().find(|path| path.exists())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        ron::from_str::<AppConfig>(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn phrases(&self) -> EnglishPhrases {
        EnglishPhrases::new(self.numeric, self.phrase_style)
    }

    pub fn renderer(&self) -> TimestampResult<TimestampRenderer> {
        let time_zone = resolve_time_zone(self.time_zone.as_deref())?;
        Ok(TimestampRenderer::new(
            time_zone,
            UnitTable::discord(),
            self.phrases(),
        ))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Try to read existing config to preserve comments
        let existing_content = fs::read_to_string(path).unwrap_or_default();

        if existing_content.is_empty() {
            // Fallback to standard serialization if file doesn't exist or is empty
            self.write_pretty(path)?;
            tracing::info!("Saved config to {}", path.display());
            return Ok(());
        }

        let patches = [
            ("default_style", STRING_VALUE, ron::to_string(&self.default_style)?),
            ("time_zone", OPTION_VALUE, ron::to_string(&self.time_zone)?),
            ("numeric", IDENT_VALUE, ron::to_string(&self.numeric)?),
            ("phrase_style", IDENT_VALUE, ron::to_string(&self.phrase_style)?),
            ("level", STRING_VALUE, ron::to_string(&self.logging.level)?),
            (
                "log_directory",
                OPTION_VALUE,
                ron::to_string(&self.logging.log_directory)?,
            ),
        ];

        let mut new_content = existing_content;
        for (key, value_pattern, value) in &patches {
            replace_key(&mut new_content, key, value_pattern, value)?;
        }

        // Keys missing from the file, or `module_levels`, cannot be patched in place.
        match ron::from_str::<AppConfig>(&new_content) {
            Ok(patched) if patched == *self => {
                fs::write(path, new_content)
                    .with_context(|| format!("Failed to update config at {}", path.display()))?;
                tracing::info!("Updated config at {} (preserving comments)", path.display());
            }
            _ => {
                tracing::warn!(
                    "Config at {} could not be updated in place, rewriting it without comments",
                    path.display()
                );
                self.write_pretty(path)?;
            }
        }
        Ok(())
    }

    fn write_pretty(&self, path: &Path) -> Result<()> {
        let pretty = ron::ser::PrettyConfig::default()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(true);

        let content =
            ron::ser::to_string_pretty(self, pretty).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

const STRING_VALUE: &str = r#""(?:[^"\\]|\\.)*""#;
const OPTION_VALUE: &str = r#"(?:None|Some\("(?:[^"\\]|\\.)*"\)|"(?:[^"\\]|\\.)*")"#;
const IDENT_VALUE: &str = r"[A-Za-z_][A-Za-z0-9_]*";

/// Replace the value of every `key: <value_pattern>` in RON text with `value`.
fn replace_key(content: &mut String, key: &str, value_pattern: &str, value: &str) -> Result<()> {
    let re = RegexBuilder::new(&format!(
        r"(\b{}\s*:\s*){}",
        regex::escape(key),
        value_pattern
    ))
    .build()?;
    *content = re
        .replace_all(content, |caps: &Captures| format!("{}{}", &caps[1], value))
        .to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_partial_config() {
        let config: AppConfig = ron::from_str(
            r#"(
    default_style: "R",
    numeric: always,
    logging: (level: "debug"),
)"#,
        )
        .unwrap();

        assert_eq!(config.default_style, TimestampStyle::Relative);
        assert_eq!(config.numeric, Numeric::Always);
        assert_eq!(config.phrase_style, PhraseStyle::Long);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.time_zone, None);
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(ron::from_str::<AppConfig>(r#"(default_style: "x")"#).is_err());
    }

    #[test]
    fn filter_directives_include_module_levels() {
        let mut logging = LoggingConfig::default();
        logging
            .module_levels
            .insert("discord_time::internal::live".to_string(), "trace".to_string());
        assert_eq!(
            logging.filter_directives(),
            "info,discord_time::internal::live=trace"
        );
    }

    #[test]
    fn renderer_uses_configured_zone() {
        let config = AppConfig {
            time_zone: Some("UTC".to_string()),
            ..AppConfig::default()
        };
        assert!(config.renderer().is_ok());

        let config = AppConfig {
            time_zone: Some("Nowhere/Special".to_string()),
            ..AppConfig::default()
        };
        assert!(config.renderer().is_err());
    }

    #[test]
    fn test_save_writes_defaults_and_reloads() {
        let config_path = std::env::temp_dir().join("discord_time_config_defaults.ron");
        let _ = fs::remove_file(&config_path);

        let config = AppConfig {
            default_style: TimestampStyle::LongDate,
            ..AppConfig::default()
        };
        config.save_to(&config_path).unwrap();

        let reloaded = AppConfig::load_from(&config_path).unwrap();
        assert_eq!(reloaded, config);

        let _ = fs::remove_file(config_path);
    }

    #[test]
    fn test_save_preserves_comments() {
        use std::io::Write;

        // Create a temporary config file with comments
        let config_path = std::env::temp_dir().join("discord_time_config_comments.ron");

        let initial_content = r#"(
    // Timestamp settings
    default_style: "f",
    numeric: auto,
)"#;

        {
            let mut file = fs::File::create(&config_path).unwrap();
            file.write_all(initial_content.as_bytes()).unwrap();
        }

        let mut config: AppConfig = ron::from_str(initial_content).unwrap();
        config.default_style = TimestampStyle::Relative;
        config.numeric = Numeric::Always;

        config.save_to(&config_path).unwrap();

        let new_content = fs::read_to_string(&config_path).unwrap();
        assert!(new_content.contains("default_style: \"R\""));
        assert!(new_content.contains("numeric: always"));
        assert!(new_content.contains("// Timestamp settings"));

        let _ = fs::remove_file(config_path);
    }

    #[test]
    fn load_from_rejects_malformed_file() {
        let config_path = std::env::temp_dir().join("discord_time_config_malformed.ron");
        fs::write(&config_path, "(default_style: \"x\", numeric: ").unwrap();

        let err = AppConfig::load_from(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        let _ = fs::remove_file(config_path);
    }

    #[test]
    fn load_from_reports_missing_file() {
        let config_path = std::env::temp_dir().join("discord_time_config_missing.ron");
        let _ = fs::remove_file(&config_path);
        assert!(AppConfig::load_from(&config_path).is_err());
    }

    #[test]
    fn test_save_clears_time_zone_and_updates_logging() {
        let config_path = std::env::temp_dir().join("discord_time_config_clear_zone.ron");

        let initial_content = r#"(
    // Absolute styles use this zone
    default_style: "f",
    time_zone: Some("UTC"),
    logging: (
        // quiet by default
        level: "warn",
        log_directory: None,
    ),
)"#;
        fs::write(&config_path, initial_content).unwrap();

        let mut config: AppConfig = ron::from_str(initial_content).unwrap();
        config.time_zone = None;
        config.logging.level = "debug".to_string();
        config.logging.log_directory = Some("logs".to_string());

        config.save_to(&config_path).unwrap();

        let new_content = fs::read_to_string(&config_path).unwrap();
        assert!(new_content.contains("time_zone: None"));
        assert!(new_content.contains("level: \"debug\""));
        assert!(new_content.contains("log_directory: Some(\"logs\")"));
        assert!(new_content.contains("// quiet by default"));
        assert_eq!(AppConfig::load_from(&config_path).unwrap(), config);

        let _ = fs::remove_file(config_path);
    }

    #[test]
    fn test_save_rewrites_when_module_levels_change() {
        let config_path = std::env::temp_dir().join("discord_time_config_module_levels.ron");

        let initial_content = r#"(
    // dropped on rewrite
    numeric: auto,
)"#;
        fs::write(&config_path, initial_content).unwrap();

        let mut config: AppConfig = ron::from_str(initial_content).unwrap();
        config
            .logging
            .module_levels
            .insert("discord_time::internal::live".to_string(), "trace".to_string());

        config.save_to(&config_path).unwrap();

        assert_eq!(AppConfig::load_from(&config_path).unwrap(), config);

        let _ = fs::remove_file(config_path);
    }
}
