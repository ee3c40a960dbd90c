/*!
In-memory positioner used by the simulated diffractometer.

Moves complete instantly. Soft limits are enforced on every move, which makes
this the layer that rejects the extreme screw targets a derived axis may
forward near its singular angles.
*/

use crate::axis::{Axis, MoveOptions};
use crate::error::{Result, SharedError};
use crate::limits::Limits;
use tracing::debug;

/// Simulated axis with soft limits
#[derive(Debug, Clone)]
pub struct SoftPositioner {
    name: String,
    position: Option<f64>,
    limits: Limits,
}

impl SoftPositioner {
    /// Create a positioner with no position yet (not ready until first move)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            limits: Limits::default(),
        }
    }

    /// Set the initial position
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the soft limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the soft limits
    pub fn set_limits(&mut self, limits: Limits) {
        debug!("{}: limits set to ({}, {})", self.name, limits.low, limits.high);
        self.limits = limits;
    }

    fn check_value(&self, target: f64) -> Result<()> {
        if !target.is_finite() || !self.limits.contains(target) {
            return Err(SharedError::LimitViolation {
                axis: self.name.clone(),
                target,
                low: self.limits.low,
                high: self.limits.high,
            });
        }
        Ok(())
    }
}

impl Axis for SoftPositioner {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Result<f64> {
        self.position.ok_or_else(|| SharedError::not_ready(&self.name))
    }

    fn move_to(&mut self, target: f64, options: &MoveOptions) -> Result<()> {
        self.check_value(target)?;
        debug!("{}: move to {} ({:?})", self.name, target, options);
        self.position = Some(target);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.position.is_some()
    }

    fn limits(&self) -> Result<Limits> {
        if self.is_ready() {
            Ok(self.limits)
        } else {
            Err(SharedError::not_ready(&self.name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_without_position() {
        let axis = SoftPositioner::new("gamscrew").with_limits(Limits::new(-10.0, 250.0));
        assert!(!axis.is_ready());
        assert!(axis.position().unwrap_err().is_not_ready());
        assert!(axis.limits().unwrap_err().is_not_ready());
    }

    #[test]
    fn test_move_within_limits() {
        let mut axis = SoftPositioner::new("gamscrew")
            .with_position(0.0)
            .with_limits(Limits::new(-10.0, 250.0));
        axis.move_to(100.0, &MoveOptions::default()).unwrap();
        assert_eq!(axis.position().unwrap(), 100.0);
    }

    #[test]
    fn test_move_outside_limits_rejected() {
        let mut axis = SoftPositioner::new("gamscrew")
            .with_position(0.0)
            .with_limits(Limits::new(-10.0, 250.0));
        let err = axis.move_to(300.0, &MoveOptions::default()).unwrap_err();
        assert!(matches!(err, SharedError::LimitViolation { target, .. } if target == 300.0));
        assert_eq!(axis.position().unwrap(), 0.0);
    }

    #[test]
    fn test_unbounded_accepts_any_finite() {
        let mut axis = SoftPositioner::new("mu");
        axis.move_to(1e9, &MoveOptions::default()).unwrap();
        assert!(axis.is_ready());
        assert!(axis.move_to(f64::INFINITY, &MoveOptions::default()).is_err());
    }
}
