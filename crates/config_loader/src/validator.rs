//! Profile validation
//!
//! Validation rules:
//! - declarative field ranges (via `validator` derive on the profile)
//! - skip_frames leaves an effective output rate of at least 1 fps
//! - capture dimensions are even (codec requirement)
//! - output_dir is non-empty

use contracts::{DashcamError, RecordingProfile};
use validator::Validate;

/// Validate a RecordingProfile
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(profile: &RecordingProfile) -> Result<(), DashcamError> {
    validate_fields(profile)?;
    validate_decimation(profile)?;
    validate_geometry(profile)?;
    validate_output_dir(profile)?;
    Ok(())
}

/// Run the declarative field checks
fn validate_fields(profile: &RecordingProfile) -> Result<(), DashcamError> {
    profile.validate().map_err(|e| {
        match e.field_errors().into_iter().next() {
            Some((field, errors)) => DashcamError::config_validation(
                field.to_string(),
                errors
                    .first()
                    .map(|err| err.code.to_string())
                    .unwrap_or_else(|| "invalid value".to_string()),
            ),
            None => DashcamError::config_validation("profile", "invalid profile"),
        }
    })
}

/// Decimation must leave at least 1 fps of output
fn validate_decimation(profile: &RecordingProfile) -> Result<(), DashcamError> {
    let effective_fps = profile.capture_fps / (profile.skip_frames as f64 + 1.0);
    if effective_fps < 1.0 {
        return Err(DashcamError::config_validation(
            "skip_frames",
            format!(
                "skip_frames {} leaves {:.2} fps of output at capture_fps {}",
                profile.skip_frames, effective_fps, profile.capture_fps
            ),
        ));
    }
    Ok(())
}

/// Codecs require even dimensions
fn validate_geometry(profile: &RecordingProfile) -> Result<(), DashcamError> {
    if profile.capture_width % 2 != 0 {
        return Err(DashcamError::config_validation(
            "capture_width",
            format!("must be even, got {}", profile.capture_width),
        ));
    }
    if profile.capture_height % 2 != 0 {
        return Err(DashcamError::config_validation(
            "capture_height",
            format!("must be even, got {}", profile.capture_height),
        ));
    }
    Ok(())
}

/// Output directory must be set
fn validate_output_dir(profile: &RecordingProfile) -> Result<(), DashcamError> {
    if profile.output_dir.as_os_str().is_empty() {
        return Err(DashcamError::config_validation(
            "output_dir",
            "output directory cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(validate(&RecordingProfile::default()).is_ok());
    }

    #[test]
    fn test_excessive_decimation() {
        let profile = RecordingProfile {
            capture_fps: 30.0,
            skip_frames: 59,
            ..Default::default()
        };
        let result = validate(&profile);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("skip_frames"), "got: {err}");
    }

    #[test]
    fn test_odd_width() {
        let profile = RecordingProfile {
            capture_width: 1921,
            ..Default::default()
        };
        let result = validate(&profile);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("even"), "got: {err}");
    }

    #[test]
    fn test_empty_output_dir() {
        let profile = RecordingProfile {
            output_dir: PathBuf::new(),
            ..Default::default()
        };
        let result = validate(&profile);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("output"), "got: {err}");
    }

    #[test]
    fn test_field_range_violation() {
        let profile = RecordingProfile {
            capture_fps: 0.5,
            ..Default::default()
        };
        let result = validate(&profile);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            DashcamError::ConfigValidation { .. }
        ));
    }
}
