//! # Config Loader
//!
//! Recording profile loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON profile files
//! - Validate profile legality
//! - Produce a `RecordingProfile`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let profile = ConfigLoader::load_from_path(Path::new("ridecam.toml")).unwrap();
//! println!("Preset: {:?}", profile.preset);
//! ```

mod parser;
mod validator;

pub use contracts::RecordingProfile;
pub use parser::ConfigFormat;

use contracts::DashcamError;
use std::path::Path;

/// Profile loader
///
/// Provides static methods to load the profile from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a profile from a file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RecordingProfile, DashcamError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a profile from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecordingProfile, DashcamError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize a RecordingProfile to a TOML string
    pub fn to_toml(profile: &RecordingProfile) -> Result<String, DashcamError> {
        toml::to_string_pretty(profile)
            .map_err(|e| DashcamError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a RecordingProfile to a JSON string
    pub fn to_json(profile: &RecordingProfile) -> Result<String, DashcamError> {
        serde_json::to_string_pretty(profile)
            .map_err(|e| DashcamError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, DashcamError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            DashcamError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            DashcamError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read profile file content
    fn read_file(path: &Path) -> Result<String, DashcamError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate profile content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecordingProfile, DashcamError> {
        let profile = parser::parse(content, format)?;
        validator::validate(&profile)?;
        Ok(profile)
    }
}
