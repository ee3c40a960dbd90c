/*!
Solver-facing description of the diffractometer.

The reciprocal-space kinematics live in the external solver library. This
module only carries what the assembly configures on it: which geometry is
used, the ordered real axes, per-axis constraint limits, and the selected
operating mode.
*/

use crate::error::{Result, SharedError};
use crate::limits::Limits;
use serde::{Deserialize, Serialize};

/// Default solver library
pub const DEFAULT_SOLVER: &str = "hkl_soleil";

/// Default geometry, an enhanced "PETRA3 P09 EH2"
pub const DEFAULT_GEOMETRY: &str = "APS POLAR";

/// Real axes of the geometry, in solver order
pub const DEFAULT_REALS: [&str; 6] = ["mu", "theta", "chi", "phi", "gamma", "delta"];

/// Operating modes of the default geometry
pub const DEFAULT_MODES: [&str; 14] = [
    "4-circles bissecting horizontal",
    "4-circles constant omega horizontal",
    "4-circles constant chi horizontal",
    "4-circles constant phi horizontal",
    "4-circles bissecting vertical",
    "4-circles constant omega vertical",
    "4-circles constant chi vertical",
    "4-circles constant phi vertical",
    "lifting detector mu",
    "lifting detector omega",
    "lifting detector chi",
    "lifting detector phi",
    "psi constant horizontal",
    "psi constant vertical",
];

/// Default constraint limits for every real axis (degrees)
pub const DEFAULT_CONSTRAINT: Limits = Limits {
    low: -180.0,
    high: 180.0,
};

/// Geometry selection passed to the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub solver: String,
    pub geometry: String,
    pub reals: Vec<String>,
    pub modes: Vec<String>,
}

impl Geometry {
    /// Check if the geometry offers `mode`
    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.iter().any(|m| m == mode)
    }

    /// Validate a mode name against this geometry
    pub fn check_mode(&self, mode: &str) -> Result<()> {
        if self.has_mode(mode) {
            Ok(())
        } else {
            Err(SharedError::UnknownMode {
                mode: mode.to_string(),
                geometry: self.geometry.clone(),
            })
        }
    }

    /// First mode of the geometry, the solver's default
    pub fn default_mode(&self) -> Option<&str> {
        self.modes.first().map(String::as_str)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            solver: DEFAULT_SOLVER.to_string(),
            geometry: DEFAULT_GEOMETRY.to_string(),
            reals: DEFAULT_REALS.iter().map(|s| s.to_string()).collect(),
            modes: DEFAULT_MODES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Per-axis limits the solver honours when choosing solutions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraints {
    axes: Vec<(String, Limits)>,
}

impl Constraints {
    /// Default constraints for each of `reals`
    pub fn for_reals<S: AsRef<str>>(reals: &[S]) -> Self {
        Self {
            axes: reals
                .iter()
                .map(|name| (name.as_ref().to_string(), DEFAULT_CONSTRAINT))
                .collect(),
        }
    }

    /// Constraint limits of one axis
    pub fn get(&self, axis: &str) -> Result<Limits> {
        self.axes
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, limits)| *limits)
            .ok_or_else(|| SharedError::unknown_axis(axis))
    }

    /// Replace the constraint limits of one axis
    pub fn set_limits(&mut self, axis: &str, limits: Limits) -> Result<()> {
        let entry = self
            .axes
            .iter_mut()
            .find(|(name, _)| name == axis)
            .ok_or_else(|| SharedError::unknown_axis(axis))?;
        entry.1 = limits.sorted();
        Ok(())
    }

    /// Iterate in solver order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Limits)> {
        self.axes.iter().map(|(name, limits)| (name.as_str(), *limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geometry = Geometry::default();
        assert_eq!(geometry.solver, "hkl_soleil");
        assert_eq!(geometry.reals, vec!["mu", "theta", "chi", "phi", "gamma", "delta"]);
        assert!(geometry.has_mode("psi constant vertical"));
        assert_eq!(geometry.default_mode(), Some("4-circles bissecting horizontal"));
    }

    #[test]
    fn test_unknown_mode() {
        let err = Geometry::default().check_mode("bissector").unwrap_err();
        assert!(matches!(err, SharedError::UnknownMode { ref mode, .. } if mode == "bissector"));
    }

    #[test]
    fn test_constraints() {
        let mut constraints = Constraints::for_reals(&DEFAULT_REALS);
        assert_eq!(constraints.get("chi").unwrap(), DEFAULT_CONSTRAINT);

        constraints.set_limits("gamma", Limits::new(26.5, -1.1)).unwrap();
        assert_eq!(constraints.get("gamma").unwrap(), Limits::new(-1.1, 26.5));

        assert!(constraints.set_limits("gamscrew", Limits::default()).is_err());
        assert_eq!(constraints.iter().count(), 6);
    }
}
