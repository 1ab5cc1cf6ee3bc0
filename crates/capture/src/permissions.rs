//! Stream permission gates.
//!
//! A denied stream is terminal for that stream only; the rest of the rig
//! keeps working.

use contracts::DashcamError;
use serde::{Deserialize, Serialize};

/// Capture stream kinds gated by permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Camera,
    Motion,
    Location,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Camera => "camera",
            StreamKind::Motion => "motion",
            StreamKind::Location => "location",
        }
    }
}

/// Authorization state of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// The user has not been asked yet
    #[default]
    NotDetermined,
    /// Access granted
    Authorized,
    /// Access denied by the user
    Denied,
    /// Access blocked by policy
    Restricted,
}

impl AuthorizationStatus {
    /// Whether sources for this stream may be built
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized)
    }
}

/// Authorization state of every stream the rig needs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    pub camera: AuthorizationStatus,
    pub motion: AuthorizationStatus,
    pub location: AuthorizationStatus,
}

impl PermissionSet {
    /// All streams authorized (the simulated environment default)
    pub fn granted() -> Self {
        Self {
            camera: AuthorizationStatus::Authorized,
            motion: AuthorizationStatus::Authorized,
            location: AuthorizationStatus::Authorized,
        }
    }

    /// Status for one stream
    pub fn status(&self, stream: StreamKind) -> AuthorizationStatus {
        match stream {
            StreamKind::Camera => self.camera,
            StreamKind::Motion => self.motion,
            StreamKind::Location => self.location,
        }
    }

    /// Gate check used before constructing a source
    ///
    /// # Errors
    /// `PermissionDenied` unless the stream is authorized.
    pub fn check(&self, stream: StreamKind) -> Result<(), DashcamError> {
        if self.status(stream).is_authorized() {
            Ok(())
        } else {
            Err(DashcamError::permission_denied(stream.as_str()))
        }
    }
}
