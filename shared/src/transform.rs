/*!
Conversion between the gamma screw translation and the gamma angle.

The screw pushes the detector arm at a fixed lever `radius` from the gamma
rotation centre, so the angle is `atan2(screw, radius)`. Both directions are
pure and unchecked; a degenerate radius is kept out by [`Radius`].
*/

use crate::error::{Result, SharedError};
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default radius of the gamma rotation (same units as the screw)
pub const DEFAULT_RADIUS: f64 = 10_000.0;

/// Return the angle (degrees) for a screw translation.
///
/// Result lies in (-90, 90) for `radius > 0`. `radius == 0` is undefined
/// for this geometry.
pub fn forward<T: Float>(screw: T, radius: T) -> T {
    screw.atan2(radius).to_degrees()
}

/// Return the screw translation for an angle (degrees).
///
/// Diverges as `angle` approaches ±90°. Such targets are left for the
/// screw's own limits to reject.
pub fn inverse<T: Float>(angle: T, radius: T) -> T {
    radius * angle.to_radians().tan()
}

/// Lever radius between the gamma axis and the screw, always finite and > 0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Radius(f64);

impl Radius {
    /// Validate a radius value
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(SharedError::InvalidRadius(value))
        }
    }

    /// Get the raw value
    pub fn get(self) -> f64 {
        self.0
    }

    /// Angle (degrees) for a screw translation at this radius
    pub fn forward(self, screw: f64) -> f64 {
        forward(screw, self.0)
    }

    /// Screw translation for an angle (degrees) at this radius
    pub fn inverse(self, angle: f64) -> f64 {
        inverse(angle, self.0)
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self(DEFAULT_RADIUS)
    }
}

impl TryFrom<f64> for Radius {
    type Error = SharedError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Radius> for f64 {
    fn from(radius: Radius) -> Self {
        radius.0
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
