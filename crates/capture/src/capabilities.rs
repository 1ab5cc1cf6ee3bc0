//! Device capability probing and graceful degradation.

use contracts::RecordingProfile;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What the capture hardware can actually do
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureCapabilities {
    /// HDR video supported
    pub hdr_supported: bool,

    /// Optical/digital stabilization supported
    pub stabilization_supported: bool,
}

impl Default for CaptureCapabilities {
    fn default() -> Self {
        Self {
            hdr_supported: true,
            stabilization_supported: true,
        }
    }
}

/// Settings after reconciling the profile against the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub hdr: bool,
    pub stabilization: bool,
}

impl EffectiveSettings {
    /// Reconcile requested settings against capabilities
    ///
    /// An unsupported feature degrades to disabled with a warning rather
    /// than failing the session.
    pub fn resolve(profile: &RecordingProfile, capabilities: &CaptureCapabilities) -> Self {
        let hdr = profile.hdr && capabilities.hdr_supported;
        if profile.hdr && !capabilities.hdr_supported {
            warn!("HDR requested but unsupported by capture hardware, recording without HDR");
        }

        let stabilization = profile.stabilization && capabilities.stabilization_supported;
        if profile.stabilization && !capabilities.stabilization_supported {
            warn!("stabilization requested but unsupported, recording without it");
        }

        Self { hdr, stabilization }
    }
}
