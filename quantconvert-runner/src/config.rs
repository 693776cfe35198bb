//! Configuration file access and path resolution.
//!
//! The configuration is a TOML file organized in sections:
//!
//! ```toml
//! [quantdatamanager]
//! path = "C:/QuantDataManager"
//! application = "qdm.exe"
//! getsymbols = "getSymbols.bat"
//! updatequotes = "updateQuotes.bat"
//! exportquotes = "exportQuotes.bat"
//!
//! [scripts]
//! path = "bat"
//!
//! [data]
//! path = "data"
//! symbollist = "symbols.csv"
//!
//! [export]
//! timeframe = "M1"
//! ```
//!
//! [`Config`] is the raw `get(section, key)` lookup. [`PipelineConfig`] is
//! the resolved view the pipeline works with.

use quantconvert_core::domain::Timeframe;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "config/config.toml";

pub const SECTION_DATA_MANAGER: &str = "quantdatamanager";
pub const SECTION_SCRIPTS: &str = "scripts";
pub const SECTION_DATA: &str = "data";
pub const SECTION_EXPORT: &str = "export";

pub const SCRIPT_GET_SYMBOLS: &str = "getsymbols";
pub const SCRIPT_UPDATE_QUOTES: &str = "updatequotes";
pub const SCRIPT_EXPORT_QUOTES: &str = "exportquotes";

const DEFAULT_SCRIPTS_DIR: &str = "bat";

/// Errors from loading or resolving configuration. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("section '{section}' not found in '{origin}'")]
    MissingSection { section: String, origin: String },

    #[error("option '{option}' not found at section '{section}' in '{origin}'")]
    MissingOption {
        section: String,
        option: String,
        origin: String,
    },

    #[error("option '{option}' has no value at section '{section}' in '{origin}'")]
    EmptyValue {
        section: String,
        option: String,
        origin: String,
    },

    #[error("{what} not found at '{}'", .path.display())]
    MissingFile { what: String, path: PathBuf },

    #[error("invalid value for '{section}.{option}': {reason}")]
    InvalidValue {
        section: String,
        option: String,
        reason: String,
    },

    #[error("failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The `[export]` section. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub timeframe: Timeframe,
}

/// Sectioned key/value configuration backed by a TOML table.
#[derive(Debug, Clone)]
pub struct Config {
    origin: String,
    table: toml::Table,
}

impl Config {
    /// Load a configuration file. A missing file is a [`ConfigError::NotFound`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("config file = '{}'", path.display());
        Self::parse(&content, path.display().to_string())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>".to_string())
    }

    fn parse(content: &str, origin: String) -> Result<Self, ConfigError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::Parse(format!("{origin}: {e}")))?;
        Ok(Self { origin, table })
    }

    /// Where this configuration came from (file path or `<inline>`).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Look up `section.option`.
    ///
    /// Fails when the section or option is missing, or when the value is an
    /// empty string. Non-string scalars are returned in their TOML text form.
    pub fn get(&self, section: &str, option: &str) -> Result<String, ConfigError> {
        let entries = self
            .table
            .get(section)
            .and_then(|v| v.as_table())
            .ok_or_else(|| ConfigError::MissingSection {
                section: section.to_string(),
                origin: self.origin.clone(),
            })?;

        let value = entries
            .get(option)
            .ok_or_else(|| ConfigError::MissingOption {
                section: section.to_string(),
                option: option.to_string(),
                origin: self.origin.clone(),
            })?;

        let text = match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                section: section.to_string(),
                option: option.to_string(),
                origin: self.origin.clone(),
            });
        }
        Ok(text)
    }

    /// Typed view of the `[export]` section; defaults when it is absent.
    pub fn export_section(&self) -> Result<ExportSection, ConfigError> {
        let Some(section) = self.table.get(SECTION_EXPORT) else {
            return Ok(ExportSection::default());
        };
        section
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::InvalidValue {
                section: SECTION_EXPORT.into(),
                option: "timeframe".into(),
                reason: e.to_string(),
            })
    }

    /// Like [`Config::get`] but falls back to `default` when the section or
    /// option is absent. An explicitly empty value is still an error.
    pub fn get_or(&self, section: &str, option: &str, default: &str) -> Result<String, ConfigError> {
        match self.get(section, option) {
            Ok(v) => Ok(v),
            Err(ConfigError::MissingSection { .. } | ConfigError::MissingOption { .. }) => {
                Ok(default.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

/// Resolved paths and defaults for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    config: Config,
    /// Full path of the data manager console application.
    pub data_manager: PathBuf,
    /// Directory the data manager exports into and converted files land in.
    pub data_dir: PathBuf,
    /// Full path of the normalized symbol list.
    pub symbol_list: PathBuf,
    /// Directory holding the per-operation invocation scripts.
    pub scripts_dir: PathBuf,
    /// Timeframe used when the caller does not pick one.
    pub timeframe: Timeframe,
}

impl PipelineConfig {
    /// Resolve everything the pipeline needs, relative to `base_dir`.
    ///
    /// The data manager program must exist. The data directory is created if
    /// it is missing. Scripts are only checked when a step asks for them.
    pub fn from_config(config: Config, base_dir: &Path) -> Result<Self, ConfigError> {
        let dm_dir = config.get(SECTION_DATA_MANAGER, "path")?;
        let dm_app = config.get(SECTION_DATA_MANAGER, "application")?;
        let data_manager = Path::new(&dm_dir).join(dm_app);
        if !data_manager.is_file() {
            return Err(ConfigError::MissingFile {
                what: "Quant Data Manager".into(),
                path: data_manager,
            });
        }

        let data_dir = base_dir.join(config.get(SECTION_DATA, "path")?);
        std::fs::create_dir_all(&data_dir).map_err(|source| ConfigError::CreateDir {
            path: data_dir.clone(),
            source,
        })?;
        let symbol_list = data_dir.join(config.get(SECTION_DATA, "symbollist")?);

        let scripts_dir =
            base_dir.join(config.get_or(SECTION_SCRIPTS, "path", DEFAULT_SCRIPTS_DIR)?);

        let timeframe = config.export_section()?.timeframe;

        debug!(
            data_manager = %data_manager.display(),
            data_dir = %data_dir.display(),
            "configuration resolved"
        );

        Ok(Self {
            config,
            data_manager,
            data_dir,
            symbol_list,
            scripts_dir,
            timeframe,
        })
    }

    /// Full path of the script configured under `[quantdatamanager].<option>`.
    /// The script must exist.
    pub fn script_path(&self, option: &str) -> Result<PathBuf, ConfigError> {
        let name = self.config.get(SECTION_DATA_MANAGER, option)?;
        let path = self.scripts_dir.join(name);
        if !path.is_file() {
            return Err(ConfigError::MissingFile {
                what: "batch file".into(),
                path,
            });
        }
        Ok(path)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"
[quantdatamanager]
path = "C:/QuantDataManager"
application = "qdm.exe"
exportquotes = ""

[data]
path = "data"
symbollist = "symbols.csv"
retries = 3
"#;

    #[test]
    fn get_returns_string_values() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.get("data", "symbollist").unwrap(), "symbols.csv");
    }

    #[test]
    fn get_renders_non_string_values() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.get("data", "retries").unwrap(), "3");
    }

    #[test]
    fn missing_section_is_reported() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        let err = cfg.get("export", "timeframe").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { ref section, .. } if section == "export"));
    }

    #[test]
    fn missing_option_is_reported() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        let err = cfg.get("data", "nope").unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption { ref option, .. } if option == "nope"));
    }

    #[test]
    fn empty_value_is_reported() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        let err = cfg.get("quantdatamanager", "exportquotes").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue { .. }));
        assert!(err.to_string().contains("has no value"));
    }

    #[test]
    fn get_or_defaults_only_when_absent() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.get_or("scripts", "path", "bat").unwrap(), "bat");
        assert!(cfg.get_or("quantdatamanager", "exportquotes", "x").is_err());
    }

    #[test]
    fn export_section_defaults_when_absent() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.export_section().unwrap(), ExportSection::default());
        assert_eq!(cfg.export_section().unwrap().timeframe, Timeframe::M1);
    }

    #[test]
    fn export_section_deserializes_timeframe() {
        let cfg = Config::from_toml("[export]\ntimeframe = \"m15\"\n").unwrap();
        assert_eq!(cfg.export_section().unwrap().timeframe, Timeframe::M15);

        let cfg = Config::from_toml("[export]\n").unwrap();
        assert_eq!(cfg.export_section().unwrap().timeframe, Timeframe::M1);
    }

    #[test]
    fn export_section_rejects_non_string_timeframe() {
        let cfg = Config::from_toml("[export]\ntimeframe = 5\n").unwrap();
        assert!(matches!(
            cfg.export_section(),
            Err(ConfigError::InvalidValue { ref section, .. }) if section == "export"
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        assert!(matches!(
            Config::from_toml("[data\npath = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    fn write_layout(root: &Path, extra: &str) -> Config {
        let dm_dir = root.join("qdm");
        fs::create_dir_all(&dm_dir).unwrap();
        fs::write(dm_dir.join("qdm.exe"), "").unwrap();
        fs::create_dir_all(root.join("bat")).unwrap();
        fs::write(root.join("bat").join("export.sh"), "").unwrap();

        let toml = format!(
            "[quantdatamanager]\npath = {:?}\napplication = \"qdm.exe\"\nexportquotes = \"export.sh\"\ngetsymbols = \"missing.sh\"\n\n[data]\npath = \"data\"\nsymbollist = \"symbols.csv\"\n{extra}",
            dm_dir.display().to_string()
        );
        let path = root.join("config.toml");
        fs::write(&path, toml).unwrap();
        Config::from_file(&path).unwrap()
    }

    #[test]
    fn pipeline_config_resolves_paths_and_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_layout(dir.path(), "");
        let pc = PipelineConfig::from_config(cfg, dir.path()).unwrap();

        assert_eq!(pc.data_manager, dir.path().join("qdm").join("qdm.exe"));
        assert_eq!(pc.data_dir, dir.path().join("data"));
        assert!(pc.data_dir.is_dir());
        assert_eq!(pc.symbol_list, dir.path().join("data").join("symbols.csv"));
        assert_eq!(pc.scripts_dir, dir.path().join("bat"));
        assert_eq!(pc.timeframe, Timeframe::M1);
    }

    #[test]
    fn pipeline_config_reads_timeframe() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_layout(dir.path(), "\n[export]\ntimeframe = \"h1\"\n");
        let pc = PipelineConfig::from_config(cfg, dir.path()).unwrap();
        assert_eq!(pc.timeframe, Timeframe::H1);
    }

    #[test]
    fn pipeline_config_rejects_bad_timeframe() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_layout(dir.path(), "\n[export]\ntimeframe = \"W1\"\n");
        let err = PipelineConfig::from_config(cfg, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn missing_data_manager_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::from_toml(
            "[quantdatamanager]\npath = \"/nonexistent\"\napplication = \"qdm.exe\"\n[data]\npath = \"d\"\nsymbollist = \"s.csv\"\n",
        )
        .unwrap();
        let err = PipelineConfig::from_config(cfg, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn script_path_requires_existing_script() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_layout(dir.path(), "");
        let pc = PipelineConfig::from_config(cfg, dir.path()).unwrap();

        assert_eq!(
            pc.script_path(SCRIPT_EXPORT_QUOTES).unwrap(),
            dir.path().join("bat").join("export.sh")
        );
        assert!(matches!(
            pc.script_path(SCRIPT_GET_SYMBOLS),
            Err(ConfigError::MissingFile { .. })
        ));
        assert!(matches!(
            pc.script_path(SCRIPT_UPDATE_QUOTES),
            Err(ConfigError::MissingOption { .. })
        ));
    }
}
