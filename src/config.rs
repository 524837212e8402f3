//! Tool configuration.
//!
//! Settings come from `dtsgen.toml` in the project root, with `DTSGEN_*`
//! environment variables layered on top. Every field has a default, so a
//! project with no config file at all still gets the standard egg layout.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DtsgenError, DtsgenResult};

/// Filename of the project-level config file.
pub const CONFIG_FILE: &str = "dtsgen.toml";

/// Glob applied to a watched directory when neither the directory config
/// nor the generator supplies one.
pub const DEFAULT_PATTERN: &str = "**/*.{ts,js}";

/// When to regenerate for a watched directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Add,
    Change,
    Remove,
}

/// Per-directory settings, merged with the generator's defaults at watch
/// time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchDirConfig {
    /// Directory to watch, relative to the project root.
    pub path: String,
    /// Source glob; falls back to the generator default, then
    /// [`DEFAULT_PATTERN`].
    pub pattern: Option<String>,
    /// Which change kinds regenerate. Defaults to add/remove; content
    /// changes only regenerate where configured (the config directory).
    pub trigger: Option<Vec<Trigger>>,
    /// Generator name, looked up in the registry.
    pub generator: Option<String>,
    /// Interface name for the generated block. `None` means a synthetic
    /// name is allocated.
    pub interface: Option<String>,
    /// Dotted namespace chain the interface is nested under, e.g.
    /// `"IController.sub"`.
    pub declare_to: Option<String>,
    /// Template applied to each leaf value, `{{ 0 }}` standing for the
    /// imported name.
    pub interface_handle: Option<String>,
    /// Property case mapping: `lower`, `upper` or `camel`.
    pub case_style: Option<String>,
    /// Module the declarations attach to; falls back to the project-wide
    /// framework.
    pub framework: Option<String>,
    pub enabled: Option<bool>,
}

impl WatchDirConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn generator_name(&self) -> &str {
        self.generator.as_deref().unwrap_or("class")
    }

    /// Fills unset fields from generator defaults.
    pub fn merged(&self, defaults: &crate::generators::GeneratorDefaults) -> WatchDirConfig {
        let mut merged = self.clone();
        if merged.trigger.is_none() {
            merged.trigger = Some(vec![Trigger::Add, Trigger::Remove]);
        }
        if merged.pattern.is_none() {
            merged.pattern = defaults.pattern.clone();
        }
        if merged.interface.is_none() {
            merged.interface = defaults.interface.clone();
        }
        if merged.interface_handle.is_none() {
            merged.interface_handle = defaults.interface_handle.clone();
        }
        merged
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(DEFAULT_PATTERN)
    }
}

/// Project-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Project root. Not read from the file; set by the loader.
    #[serde(skip)]
    pub cwd: PathBuf,
    /// Module name the generated declarations attach to.
    pub framework: String,
    /// Output directory for declaration files, relative to the root.
    pub typings: String,
    /// Debounce window in milliseconds.
    pub throttle_ms: u64,
    /// Project-wide property case mapping.
    pub case_style: String,
    /// Whether `watch` keeps running after the initial build.
    pub watch: bool,
    /// Remove compiled `.js` files that sit next to a same-name `.ts`.
    pub auto_remove_js: bool,
    /// Suppress per-file progress output.
    pub silent: bool,
    /// Watched directories by name; merged over the built-in set.
    pub watch_dirs: BTreeMap<String, WatchDirConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cwd: PathBuf::from("."),
            framework: "egg".to_string(),
            typings: "typings".to_string(),
            throttle_ms: crate::watcher::DEBOUNCE_MS,
            case_style: "lower".to_string(),
            watch: true,
            auto_remove_js: true,
            silent: false,
            watch_dirs: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads config for the project at `cwd`: file, then environment, then
    /// validation. A missing file is fine.
    pub fn load(cwd: &Path) -> DtsgenResult<Config> {
        let path = cwd.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw)?
        } else {
            Config::default()
        };
        config.cwd = cwd.to_path_buf();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(framework) = env::var("DTSGEN_FRAMEWORK") {
            self.framework = framework;
        }
        if let Ok(typings) = env::var("DTSGEN_TYPINGS") {
            self.typings = typings;
        }
        if let Ok(ms) = env::var("DTSGEN_THROTTLE_MS") {
            if let Ok(ms) = ms.parse() {
                self.throttle_ms = ms;
            }
        }
        if let Ok(silent) = env::var("DTSGEN_SILENT") {
            self.silent = silent != "0" && !silent.is_empty();
        }
    }

    fn validate(&self) -> DtsgenResult<()> {
        use std::str::FromStr;

        crate::mapper::CaseStyle::from_str(&self.case_style)
            .map_err(|message| DtsgenError::Config { message })?;
        for (name, dir) in &self.watch_dirs {
            if let Some(style) = &dir.case_style {
                crate::mapper::CaseStyle::from_str(style).map_err(|message| {
                    DtsgenError::Config {
                        message: format!("watch_dirs.{name}: {message}"),
                    }
                })?;
            }
            if dir.path.is_empty() {
                return Err(DtsgenError::Config {
                    message: format!("watch_dirs.{name}: path must not be empty"),
                });
            }
        }
        Ok(())
    }

    /// Absolute path of the declaration output root.
    pub fn typings_root(&self) -> PathBuf {
        self.cwd.join(&self.typings)
    }

    /// Built-in directories merged with the configured overrides. An
    /// override with the same name replaces the built-in entirely.
    pub fn effective_watch_dirs(&self) -> BTreeMap<String, WatchDirConfig> {
        let mut dirs = default_watch_dirs();
        for (name, dir) in &self.watch_dirs {
            dirs.insert(name.clone(), dir.clone());
        }
        dirs
    }
}

/// The standard egg application layout.
pub fn default_watch_dirs() -> BTreeMap<String, WatchDirConfig> {
    let mut dirs = BTreeMap::new();
    dirs.insert(
        "controller".to_string(),
        WatchDirConfig {
            path: "app/controller".to_string(),
            interface: Some("IController".to_string()),
            ..Default::default()
        },
    );
    dirs.insert(
        "service".to_string(),
        WatchDirConfig {
            path: "app/service".to_string(),
            interface: Some("IService".to_string()),
            ..Default::default()
        },
    );
    dirs.insert(
        "middleware".to_string(),
        WatchDirConfig {
            path: "app/middleware".to_string(),
            generator: Some("function".to_string()),
            interface: Some("IMiddleware".to_string()),
            ..Default::default()
        },
    );
    dirs.insert(
        "model".to_string(),
        WatchDirConfig {
            path: "app/model".to_string(),
            interface: Some("IModel".to_string()),
            case_style: Some("upper".to_string()),
            enabled: Some(false),
            ..Default::default()
        },
    );
    dirs.insert(
        "config".to_string(),
        WatchDirConfig {
            path: "config".to_string(),
            generator: Some("config".to_string()),
            trigger: Some(vec![Trigger::Add, Trigger::Remove, Trigger::Change]),
            ..Default::default()
        },
    );
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.framework, "egg");
        assert_eq!(config.typings, "typings");
        assert_eq!(config.throttle_ms, 500);
        assert!(config.watch);
        assert!(config.auto_remove_js);
    }

    #[test]
    fn test_parse_config_file() {
        let raw = r#"
framework = "larva"
throttle_ms = 200

[watch_dirs.custom]
path = "app/custom"
interface = "ICustom"
trigger = ["add", "remove"]
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.framework, "larva");
        assert_eq!(config.throttle_ms, 200);
        let custom = &config.watch_dirs["custom"];
        assert_eq!(custom.path, "app/custom");
        assert_eq!(custom.interface.as_deref(), Some("ICustom"));
        assert_eq!(
            custom.trigger.as_deref(),
            Some(&[Trigger::Add, Trigger::Remove][..])
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let raw = "framewrok = \"egg\"\n";
        assert!(toml::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn test_invalid_case_style_rejected() {
        let mut config = Config::default();
        config.case_style = "snake".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_replaces_builtin() {
        let mut config = Config::default();
        config.watch_dirs.insert(
            "controller".to_string(),
            WatchDirConfig {
                path: "src/controller".to_string(),
                enabled: Some(false),
                ..Default::default()
            },
        );
        let dirs = config.effective_watch_dirs();
        assert_eq!(dirs["controller"].path, "src/controller");
        assert!(!dirs["controller"].enabled());
        // untouched builtins survive
        assert_eq!(dirs["service"].path, "app/service");
    }

    #[test]
    fn test_merged_trigger_defaults_to_add_remove() {
        let defaults = crate::generators::GeneratorDefaults::default();
        let dir = WatchDirConfig {
            path: "app/controller".to_string(),
            ..Default::default()
        };
        assert_eq!(
            dir.merged(&defaults).trigger.as_deref(),
            Some(&[Trigger::Add, Trigger::Remove][..])
        );
        // an explicit set survives the merge
        let config_dir = default_watch_dirs()["config"].clone();
        assert_eq!(
            config_dir.merged(&defaults).trigger.as_deref(),
            Some(&[Trigger::Add, Trigger::Remove, Trigger::Change][..])
        );
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.cwd, dir.path());
        assert_eq!(config.framework, "egg");
    }

    #[test]
    fn test_effective_dirs_include_builtins() {
        let config = Config::default();
        let dirs = config.effective_watch_dirs();
        for name in ["controller", "service", "middleware", "model", "config"] {
            assert!(dirs.contains_key(name), "missing {name}");
        }
        assert!(!dirs["model"].enabled());
        assert_eq!(dirs["middleware"].generator_name(), "function");
    }
}
