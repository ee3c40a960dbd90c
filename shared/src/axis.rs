/*!
Axis contract and the by-name axis registry of a diffractometer assembly.

Physical motors, simulated soft positioners and derived axes all implement
[`Axis`], so the assembly can treat them uniformly. Everything here is
single-threaded: handles are `Rc<RefCell<..>>` and operations run to
completion on the caller's thread.
*/

use crate::error::{Result, SharedError};
use crate::limits::Limits;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Caller options for a move, passed through untouched to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOptions {
    /// Block until the move has completed
    pub wait: bool,

    /// Give up waiting after this long
    pub timeout: Option<Duration>,

    /// Extra settle time after the move completes
    pub settle_time: Option<Duration>,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            wait: true,
            timeout: None,
            settle_time: None,
        }
    }
}

/// A single motion axis
pub trait Axis {
    /// Name of this axis within its assembly
    fn name(&self) -> &str;

    /// Current readback position
    fn position(&self) -> Result<f64>;

    /// Request a move to `target`
    fn move_to(&mut self, target: f64, options: &MoveOptions) -> Result<()>;

    /// Whether position and limits are obtainable
    fn is_ready(&self) -> bool;

    /// Current travel limits
    fn limits(&self) -> Result<Limits>;
}

/// Shared handle to an axis
pub type AxisHandle = Rc<RefCell<dyn Axis>>;

/// Non-owning handle to an axis
pub type WeakAxisHandle = Weak<RefCell<dyn Axis>>;

/// Wrap a concrete axis into a registry handle
pub fn handle<A: Axis + 'static>(axis: A) -> AxisHandle {
    Rc::new(RefCell::new(axis))
}

/// Ordered name → axis lookup
#[derive(Default)]
pub struct AxisRegistry {
    axes: Vec<(String, AxisHandle)>,
}

impl AxisRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { axes: Vec::new() }
    }

    /// Register an axis under `name`
    pub fn register(&mut self, name: impl Into<String>, axis: AxisHandle) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(SharedError::DuplicateAxis(name));
        }
        self.axes.push((name, axis));
        Ok(())
    }

    /// Look up an axis by name
    pub fn get(&self, name: &str) -> Result<AxisHandle> {
        self.axes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, axis)| Rc::clone(axis))
            .ok_or_else(|| SharedError::unknown_axis(name))
    }

    /// Check if an axis is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.axes.iter().any(|(n, _)| n == name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.axes.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate over registered axes in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AxisHandle)> {
        self.axes.iter().map(|(n, axis)| (n.as_str(), axis))
    }

    /// Get the number of registered axes
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft_positioner::SoftPositioner;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AxisRegistry::new();
        registry.register("mu", handle(SoftPositioner::new("mu"))).unwrap();
        registry.register("theta", handle(SoftPositioner::new("theta"))).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["mu", "theta"]);
        assert_eq!(registry.get("theta").unwrap().borrow().name(), "theta");
    }

    #[test]
    fn test_unknown_axis_fails_fast() {
        let registry = AxisRegistry::new();
        assert!(matches!(registry.get("gamscrew"), Err(SharedError::UnknownAxis(n)) if n == "gamscrew"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = AxisRegistry::new();
        registry.register("chi", handle(SoftPositioner::new("chi"))).unwrap();
        let err = registry.register("chi", handle(SoftPositioner::new("chi"))).unwrap_err();
        assert!(matches!(err, SharedError::DuplicateAxis(_)));
    }

    #[test]
    fn test_default_move_options() {
        let options = MoveOptions::default();
        assert!(options.wait);
        assert!(options.timeout.is_none());
    }
}
