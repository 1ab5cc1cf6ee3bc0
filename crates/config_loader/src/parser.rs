//! Profile parsing
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{DashcamError, RecordingProfile};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML profile
pub fn parse_toml(content: &str) -> Result<RecordingProfile, DashcamError> {
    toml::from_str(content).map_err(|e| DashcamError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON profile
pub fn parse_json(content: &str) -> Result<RecordingProfile, DashcamError> {
    serde_json::from_str(content).map_err(|e| DashcamError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a profile in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RecordingProfile, DashcamError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BitratePreset, Codec};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
preset = "standard"
codec = "h264"
skip_frames = 4
capture_fps = 60.0
output_dir = "/tmp/rides"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let profile = result.unwrap();
        assert_eq!(profile.preset, BitratePreset::Standard);
        assert_eq!(profile.codec, Codec::H264);
        assert_eq!(profile.skip_frames, 4);
        assert_eq!(profile.capture_fps, 60.0);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "preset": "power_saving",
            "hdr": false,
            "capture_width": 1920,
            "capture_height": 1080
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let profile = result.unwrap();
        assert_eq!(profile.preset, BitratePreset::PowerSaving);
        assert!(!profile.hdr);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, DashcamError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
