//! Bridge configuration
//!
//! Resolved once at startup and handed to the pipeline; nothing re-reads
//! the environment afterwards.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Directory, relative to the install location, holding the converter
pub const DEPENDENCIES_DIR: &str = "dependencies";

/// Converter executable name for the current platform
#[cfg(windows)]
pub const CONVERTER_EXE: &str = "ultimate_tex_cli.exe";
#[cfg(not(windows))]
pub const CONVERTER_EXE: &str = "ultimate_tex_cli";

/// Configuration for the conversion pipeline
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Path to the ultimate_tex_cli executable
    pub converter_path: PathBuf,

    /// Leave intermediate PNGs on disk instead of deleting them
    pub keep_intermediates: bool,
}

impl BridgeConfig {
    /// Use an explicit converter path
    pub fn new(converter_path: impl Into<PathBuf>) -> Self {
        Self {
            converter_path: converter_path.into(),
            keep_intermediates: false,
        }
    }

    /// Fixed converter location under an install directory:
    /// `<install_dir>/dependencies/ultimate_tex_cli[.exe]`
    pub fn from_install_dir(install_dir: &Path) -> Self {
        Self::new(install_dir.join(DEPENDENCIES_DIR).join(CONVERTER_EXE))
    }

    /// Locate the converter next to the running executable, then on `PATH`
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            let config = Self::from_install_dir(&exe_dir);
            if config.converter_path.is_file() {
                debug!("Using bundled converter at {}", config.converter_path.display());
                return Ok(config);
            }
        }

        if let Ok(path) = which::which(CONVERTER_EXE) {
            debug!("Using converter from PATH at {}", path.display());
            return Ok(Self::new(path));
        }

        Err(ConfigError::ConverterNotFound(PathBuf::from(CONVERTER_EXE)))
    }

    pub fn with_keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.converter_path.is_file() {
            return Err(ConfigError::ConverterNotFound(self.converter_path.clone()));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ultimate_tex_cli not found: {0} (place it in the dependencies/ directory or on PATH)")]
    ConverterNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_install_dir() {
        let config = BridgeConfig::from_install_dir(Path::new("/opt/plugins/file-nutexb"));
        assert_eq!(
            config.converter_path,
            Path::new("/opt/plugins/file-nutexb/dependencies").join(CONVERTER_EXE)
        );
        assert!(!config.keep_intermediates);
    }

    #[test]
    fn test_validate_missing_converter() {
        let temp_dir = TempDir::new().unwrap();
        let config = BridgeConfig::from_install_dir(temp_dir.path());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConverterNotFound(path)) if path == config.converter_path
        ));
    }

    #[test]
    fn test_validate_present_converter() {
        let temp_dir = TempDir::new().unwrap();
        let deps = temp_dir.path().join(DEPENDENCIES_DIR);
        std::fs::create_dir_all(&deps).unwrap();
        std::fs::write(deps.join(CONVERTER_EXE), b"").unwrap();

        let config = BridgeConfig::from_install_dir(temp_dir.path()).with_keep_intermediates(true);
        assert!(config.validate().is_ok());
        assert!(config.keep_intermediates);
    }
}
