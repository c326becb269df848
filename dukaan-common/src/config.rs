//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_settings_file() {
        if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
            return Ok(PathBuf::from(root_folder));
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(get_default_root_folder())
}

/// Parse the TOML settings file, if one exists for the platform
pub fn load_settings_file() -> Result<toml::Value> {
    let config_path = find_config_file()?;
    let toml_content = std::fs::read_to_string(&config_path)?;
    toml::from_str::<toml::Value>(&toml_content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", config_path.display(), e)))
}

/// Get configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/dukaan/config.toml first, then /etc/dukaan/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("dukaan").join("config.toml"));
        let system_config = PathBuf::from("/etc/dukaan/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let config_path = dirs::config_dir()
            .map(|d| d.join("dukaan").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if config_path.exists() {
            Ok(config_path)
        } else {
            Err(Error::Config(format!(
                "Config file not found: {:?}",
                config_path
            )))
        }
    }
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/dukaan (or /var/lib/dukaan for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("dukaan"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dukaan"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/dukaan
        dirs::data_dir()
            .map(|d| d.join("dukaan"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dukaan"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\dukaan
        dirs::data_local_dir()
            .map(|d| d.join("dukaan"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dukaan"))
    } else {
        PathBuf::from("./dukaan_data")
    }
}

/// Ensure the root folder exists and return the database path inside it
pub fn ensure_root_folder(root_folder: &PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join("dukaan.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let resolved = resolve_root_folder(Some("/tmp/dukaan-test"), "DUKAAN_TEST_UNSET_VAR")
            .expect("Should resolve from CLI arg");
        assert_eq!(resolved, PathBuf::from("/tmp/dukaan-test"));
    }

    #[test]
    fn test_env_var_beats_default() {
        std::env::set_var("DUKAAN_TEST_ROOT_VAR", "/tmp/dukaan-env");
        let resolved = resolve_root_folder(None, "DUKAAN_TEST_ROOT_VAR")
            .expect("Should resolve from env var");
        assert_eq!(resolved, PathBuf::from("/tmp/dukaan-env"));
        std::env::remove_var("DUKAAN_TEST_ROOT_VAR");
    }

    #[test]
    fn test_default_is_nonempty() {
        let default = get_default_root_folder();
        assert!(!default.as_os_str().is_empty());
    }

    #[test]
    fn test_ensure_root_folder_creates_db_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("nested").join("root");
        let db_path = ensure_root_folder(&root).expect("Should create root folder");
        assert!(root.exists());
        assert_eq!(db_path, root.join("dukaan.db"));
    }
}
