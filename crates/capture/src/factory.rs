//! Capture rig construction from the recording profile.

use contracts::{DashcamError, FrameSource, RecordingProfile, SensorSource};
use tracing::{info, instrument};

use crate::camera::{SimulatedCamera, SimulatedCameraConfig};
use crate::capabilities::{CaptureCapabilities, EffectiveSettings};
use crate::location::SimulatedGps;
use crate::motion::SimulatedImu;
use crate::permissions::{PermissionSet, StreamKind};

/// The assembled capture devices for one recording run
pub struct CaptureRig {
    /// Video source
    pub camera: Box<dyn FrameSource>,

    /// Inertial source (~100 Hz)
    pub inertial: Box<dyn SensorSource>,

    /// Positional source (~1 Hz, distance-filtered)
    pub positional: Box<dyn SensorSource>,

    /// Settings after capability reconciliation
    pub effective: EffectiveSettings,
}

impl std::fmt::Debug for CaptureRig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureRig")
            .field("camera", &self.camera.source_id())
            .field("inertial", &self.inertial.source_id())
            .field("positional", &self.positional.source_id())
            .field("effective", &self.effective)
            .finish()
    }
}

/// Capture factory
///
/// Checks every stream's permission gate, reconciles requested settings
/// against hardware capabilities, and builds the simulated devices.
pub struct CaptureFactory;

impl CaptureFactory {
    /// Build the full rig for a profile
    ///
    /// # Errors
    /// `PermissionDenied` for the first unauthorized stream.
    #[instrument(name = "capture_build_rig", skip_all, fields(fps = profile.capture_fps))]
    pub fn build_rig(
        profile: &RecordingProfile,
        permissions: &PermissionSet,
        capabilities: &CaptureCapabilities,
    ) -> Result<CaptureRig, DashcamError> {
        permissions.check(StreamKind::Camera)?;
        permissions.check(StreamKind::Motion)?;
        permissions.check(StreamKind::Location)?;

        let effective = EffectiveSettings::resolve(profile, capabilities);

        let camera = SimulatedCamera::new(
            "camera0".to_string(),
            SimulatedCameraConfig {
                fps: profile.capture_fps,
                width: profile.capture_width,
                height: profile.capture_height,
            },
        );
        let inertial = SimulatedImu::with_defaults("imu0".to_string());
        let positional = SimulatedGps::with_defaults("gps0".to_string());

        info!(
            hdr = effective.hdr,
            stabilization = effective.stabilization,
            "capture rig assembled"
        );

        Ok(CaptureRig {
            camera: Box::new(camera),
            inertial: Box::new(inertial),
            positional: Box::new(positional),
            effective,
        })
    }
}
