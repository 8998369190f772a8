//! Configuration file loading for brandcheck.
//!
//! Discovers and loads `brandcheck.toml` from the working directory (or an explicit path).
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use brandcheck_core::{EngineSettings, FusionConfig, RuleOverrides};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "brandcheck.toml";

/// Top-level configuration from brandcheck.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrandcheckConfig {
    /// Engine settings (policy set, units, concurrency, timeouts, audit).
    pub engine: EngineConfig,

    /// Vision fusion thresholds.
    pub fusion: FusionConfig,

    /// Rule enable/disable switches.
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy_set: Option<String>,
    pub reference_width_mm: Option<f64>,
    pub max_concurrency: Option<usize>,
    pub vision_timeout_ms: Option<u64>,
    pub advisory_timeout_ms: Option<u64>,
    pub actor: Option<String>,

    /// Append audit entries to this JSON-lines file.
    pub audit_log: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids to enable even when disabled in the catalog.
    pub enable: Vec<String>,

    /// Rule ids to skip.
    pub disable: Vec<String>,
}

/// Discover the brandcheck.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a brandcheck.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<BrandcheckConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<BrandcheckConfig> {
    let config: BrandcheckConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load `explicit` if given, else `dir/brandcheck.toml` if present, else defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> anyhow::Result<BrandcheckConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(BrandcheckConfig::default()),
    }
}

/// Settings the command line can override.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub policy_set: Option<String>,
    pub reference_width_mm: Option<f64>,
    pub max_concurrency: Option<usize>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub audit_log: Option<Utf8PathBuf>,
}

/// Config file and CLI arguments, merged.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub settings: EngineSettings,
    pub audit_log: Option<Utf8PathBuf>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: BrandcheckConfig,
}

impl ConfigMerger {
    pub fn new(config: BrandcheckConfig) -> Self {
        Self { config }
    }

    /// CLI values replace file values. CLI `enable`/`disable` extend the file lists, and a rule
    /// named on the command line is removed from the opposite file list.
    pub fn merge(self, cli: &CliOverrides) -> MergedConfig {
        let BrandcheckConfig {
            engine,
            fusion,
            rules,
        } = self.config;
        let defaults = EngineSettings::default();

        let mut enable = rules.enable;
        let mut disable = rules.disable;
        for id in &cli.enable {
            disable.retain(|d| d != id);
            if !enable.contains(id) {
                enable.push(id.clone());
            }
        }
        for id in &cli.disable {
            enable.retain(|e| e != id);
            if !disable.contains(id) {
                disable.push(id.clone());
            }
        }

        let settings = EngineSettings {
            policy_set: cli
                .policy_set
                .clone()
                .or(engine.policy_set)
                .unwrap_or(defaults.policy_set),
            reference_width_mm: cli
                .reference_width_mm
                .or(engine.reference_width_mm)
                .unwrap_or(defaults.reference_width_mm),
            max_concurrency: cli
                .max_concurrency
                .or(engine.max_concurrency)
                .unwrap_or(defaults.max_concurrency),
            vision_timeout_ms: engine
                .vision_timeout_ms
                .unwrap_or(defaults.vision_timeout_ms),
            advisory_timeout_ms: engine
                .advisory_timeout_ms
                .unwrap_or(defaults.advisory_timeout_ms),
            actor: engine.actor.unwrap_or(defaults.actor),
            overrides: RuleOverrides { enable, disable },
            fusion,
        };

        MergedConfig {
            settings,
            audit_log: cli.audit_log.clone().or(engine.audit_log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_example_config() {
        let contents = r#"
[engine]
policy_set = "retail-uk"
reference_width_mm = 210.0
max_concurrency = 4
vision_timeout_ms = 2500
actor = "studio-bot"
audit_log = "audit/brandcheck.jsonl"

[fusion]
min_logo_confidence = 0.7

[rules]
disable = ["max-colors"]
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.engine.policy_set.as_deref(), Some("retail-uk"));
        assert_eq!(config.engine.max_concurrency, Some(4));
        assert_eq!(config.fusion.min_logo_confidence, 0.7);
        // Unset fusion fields keep their defaults.
        assert_eq!(config.fusion.min_ocr_confidence, 0.6);
        assert_eq!(config.rules.disable, vec!["max-colors"]);

        let merged = ConfigMerger::new(config).merge(&CliOverrides::default());
        assert_eq!(merged.settings.policy_set, "retail-uk");
        assert_eq!(merged.settings.reference_width_mm, 210.0);
        assert_eq!(merged.settings.vision_timeout_ms, 2500);
        assert_eq!(merged.settings.advisory_timeout_ms, 3000);
        assert_eq!(merged.settings.actor, "studio-bot");
        assert_eq!(
            merged.audit_log,
            Some(Utf8PathBuf::from("audit/brandcheck.jsonl"))
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        let merged = ConfigMerger::new(config).merge(&CliOverrides::default());
        assert_eq!(merged.settings, EngineSettings::default());
        assert!(merged.audit_log.is_none());
    }

    #[test]
    fn test_unknown_key_type_is_an_error() {
        let err = parse_config("[engine]\nmax_concurrency = \"many\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_cli_values_take_precedence() {
        let config = BrandcheckConfig {
            engine: EngineConfig {
                policy_set: Some("retail-uk".to_string()),
                max_concurrency: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            policy_set: Some("default".to_string()),
            max_concurrency: Some(16),
            ..Default::default()
        };

        let merged = ConfigMerger::new(config).merge(&cli);
        assert_eq!(merged.settings.policy_set, "default");
        assert_eq!(merged.settings.max_concurrency, 16);
    }

    #[test]
    fn test_cli_rule_switches_override_file_lists() {
        let config = BrandcheckConfig {
            rules: RulesConfig {
                enable: vec!["text-legibility".to_string()],
                disable: vec!["max-colors".to_string(), "logo-position".to_string()],
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            enable: vec!["max-colors".to_string()],
            disable: vec!["text-legibility".to_string(), "safe-zone".to_string()],
            ..Default::default()
        };

        let merged = ConfigMerger::new(config).merge(&cli);
        assert_eq!(merged.settings.overrides.enable, vec!["max-colors"]);
        assert_eq!(
            merged.settings.overrides.disable,
            vec!["logo-position", "text-legibility", "safe-zone"]
        );
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_explicit_path_wins_over_discovery() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::write(root.join(CONFIG_FILE_NAME), "[engine]\nactor = \"found\"\n")
            .expect("write config");
        let explicit = root.join("other.toml");
        std::fs::write(&explicit, "[engine]\nactor = \"explicit\"\n").expect("write config");

        let cfg = load_or_default(Some(&explicit), &root).expect("load");
        assert_eq!(cfg.engine.actor.as_deref(), Some("explicit"));
        let cfg = load_or_default(None, &root).expect("load");
        assert_eq!(cfg.engine.actor.as_deref(), Some("found"));
    }
}
