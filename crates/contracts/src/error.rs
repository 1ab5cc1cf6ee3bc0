//! Layered error definitions
//!
//! Categorized by source: config / capture / encoding / analysis / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum DashcamError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Capture Errors =====
    /// Stream access denied by the permission gate
    #[error("permission denied for stream '{stream}'")]
    PermissionDenied { stream: String },

    /// Capture device missing or busy
    #[error("device unavailable: {device}")]
    DeviceUnavailable { device: String },

    // ===== Encoding Errors =====
    /// Encoder session setup error
    #[error("session configuration error: {message}")]
    SessionConfiguration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation requires a configured session
    #[error("encoder not configured")]
    NotConfigured,

    /// Single encode failure
    #[error("encoding error: {message}")]
    Encoding { message: String },

    /// Consecutive encode failures exhausted the retry budget
    #[error("encoding retry limit exceeded after {attempts} attempts")]
    RetryLimitExceeded { attempts: u32 },

    // ===== Analysis Errors =====
    /// Highlight composition error
    #[error("composition error: {message}")]
    Composition { message: String },

    /// Highlight export error
    #[error("export error: {message}")]
    Export { message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink}' write error: {message}")]
    SinkWrite { sink: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl DashcamError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create permission denied error
    pub fn permission_denied(stream: impl Into<String>) -> Self {
        Self::PermissionDenied {
            stream: stream.into(),
        }
    }

    /// Create device unavailable error
    pub fn device_unavailable(device: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            device: device.into(),
        }
    }

    /// Create session configuration error
    pub fn session_configuration(message: impl Into<String>) -> Self {
        Self::SessionConfiguration {
            message: message.into(),
            source: None,
        }
    }

    /// Create single encode error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create composition error
    pub fn composition(message: impl Into<String>) -> Self {
        Self::Composition {
            message: message.into(),
        }
    }

    /// Create export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }
}
