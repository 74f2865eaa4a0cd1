//! Launch configuration (console-launch.toml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "CONSOLE_LAUNCH_CONFIG";

/// Configuration file looked up beside the launcher executable
pub const CONFIG_FILE_NAME: &str = "console-launch.toml";

/// Windows `CreateProcess` command line limit, in characters
pub const DEFAULT_MAX_COMMAND_LINE: usize = 32767;

/// What to launch and how
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Companion executable; relative paths resolve next to the launcher
    pub program: PathBuf,
    /// Flag inserted before the forwarded arguments
    pub flag: String,
    /// Upper bound (exclusive) on the assembled command line length
    pub max_command_line: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(format!("Rained{}", std::env::consts::EXE_SUFFIX)),
            flag: String::from("--console"),
            max_command_line: DEFAULT_MAX_COMMAND_LINE,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<LaunchConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: LaunchConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    anyhow::ensure!(
        !config.program.as_os_str().is_empty(),
        "Config file {:?} sets an empty program",
        path
    );

    Ok(config)
}

/// Pick the configuration file to use, if any
///
/// An explicit path from the environment wins; otherwise a
/// `console-launch.toml` beside the launcher is used when present.
pub fn locate_config(env_value: Option<OsString>, exe_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(explicit) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }

    exe_dir
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|candidate| candidate.is_file())
}

/// Resolve the effective configuration
pub fn resolve_config(env_value: Option<OsString>, exe_dir: Option<&Path>) -> Result<LaunchConfig> {
    match locate_config(env_value, exe_dir) {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            load_config(&path)
        }
        None => {
            log::debug!("No configuration file, using defaults");
            Ok(LaunchConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LaunchConfig::default();
        assert_eq!(config.flag, "--console");
        assert_eq!(config.max_command_line, DEFAULT_MAX_COMMAND_LINE);
        assert!(config.program.to_string_lossy().starts_with("Rained"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            program = "Editor"
            flag = "--terminal"
        "#;

        let config: LaunchConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.program, PathBuf::from("Editor"));
        assert_eq!(config.flag, "--terminal");
        // Unset keys keep their defaults
        assert_eq!(config.max_command_line, DEFAULT_MAX_COMMAND_LINE);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max_command_line = 512\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.max_command_line, 512);
        assert_eq!(config.flag, "--console");
    }

    #[test]
    fn test_load_config_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max_command_line = \"lots\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_config_rejects_empty_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "program = \"\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_locate_config() {
        let dir = tempfile::tempdir().unwrap();

        // Nothing beside the executable
        assert_eq!(locate_config(None, Some(dir.path())), None);

        fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            locate_config(None, Some(dir.path())),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );

        // Explicit path wins, empty value is ignored
        let explicit = OsString::from("/etc/launch.toml");
        assert_eq!(
            locate_config(Some(explicit), Some(dir.path())),
            Some(PathBuf::from("/etc/launch.toml"))
        );
        assert_eq!(
            locate_config(Some(OsString::new()), Some(dir.path())),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_resolve_config_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve_config(None, Some(dir.path())).unwrap();
        assert_eq!(config, LaunchConfig::default());
    }
}
