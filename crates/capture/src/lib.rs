//! # Capture
//!
//! Simulated capture devices behind the `FrameSource` / `SensorSource`
//! traits: a camera, an inertial unit and a positional receiver, each
//! producing data from a background thread the way platform capture APIs
//! deliver it through callbacks.
//!
//! Also owns the permission gates and device capability probing (HDR
//! degradation) that sit in front of source construction.

mod camera;
mod capabilities;
mod factory;
mod location;
mod motion;
mod permissions;

pub use camera::{SimulatedCamera, SimulatedCameraConfig};
pub use capabilities::{CaptureCapabilities, EffectiveSettings};
pub use factory::{CaptureFactory, CaptureRig};
pub use location::{SimulatedGps, SimulatedGpsConfig};
pub use motion::{SimulatedImu, SimulatedImuConfig};
pub use permissions::{AuthorizationStatus, PermissionSet, StreamKind};
