/*!
Gamma axis derived from the gamma screw translation.

The gamma angle is never stored: every read goes through the screw position
and every move is turned into a screw move. The cached limits pair is the
only state: it is unavailable until the first [`VirtualGamma::recompute_limits`]
from a ready screw, and refreshed only by that call.
There is no subscription to screw limit changes, so after the screw limits
change the cached pair stays stale until the owner recomputes it.
*/

use crate::axis::{Axis, AxisHandle, AxisRegistry, MoveOptions, WeakAxisHandle};
use crate::error::{Result, SharedError};
use crate::limits::Limits;
use crate::transform::Radius;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Default name of the screw axis inside the assembly
pub const DEFAULT_SCREW_NAME: &str = "gamscrew";

/// Parameters of a screw-driven derived axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedAxisConfig {
    /// Lever radius, same engineering units as the screw
    pub radius: Radius,

    /// Name of the screw axis in the parent assembly
    pub screw: String,
}

impl Default for DerivedAxisConfig {
    fn default() -> Self {
        Self {
            radius: Radius::default(),
            screw: DEFAULT_SCREW_NAME.to_string(),
        }
    }
}

/// Wiring state of a derived axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DerivedAxisStatus {
    /// No screw reference yet
    Uninitialized,
    /// Screw reference held, limits possibly stale
    Wired,
    /// Limits freshly recomputed from a ready screw
    Synchronized,
}

/// Virtual gamma axis driven by a screw translation
pub struct VirtualGamma {
    name: String,
    config: DerivedAxisConfig,
    screw: Option<WeakAxisHandle>,
    status: DerivedAxisStatus,
    limits: Option<Limits>,
    // Position reported and updated while no screw is wired.
    local_position: f64,
}

impl VirtualGamma {
    /// Create an unwired derived axis
    pub fn new(name: impl Into<String>, config: DerivedAxisConfig) -> Self {
        Self {
            name: name.into(),
            config,
            screw: None,
            status: DerivedAxisStatus::Uninitialized,
            limits: None,
            local_position: 0.0,
        }
    }

    /// Resolve the screw axis by name and hold a non-owning reference to it.
    ///
    /// Limits are recomputed immediately when the screw is already ready;
    /// otherwise the owner must call [`recompute_limits`](Self::recompute_limits)
    /// once it is.
    pub fn wire(&mut self, registry: &AxisRegistry) -> Result<()> {
        if self.config.screw == self.name {
            return Err(SharedError::config(format!(
                "axis '{}' cannot be its own screw",
                self.name
            )));
        }

        let screw = registry.get(&self.config.screw)?;
        self.screw = Some(Rc::downgrade(&screw));
        self.status = DerivedAxisStatus::Wired;
        debug!("{}: wired to screw '{}'", self.name, self.config.screw);

        if screw.borrow().is_ready() {
            self.recompute_limits();
        }
        Ok(())
    }

    /// Current wiring state
    pub fn status(&self) -> DerivedAxisStatus {
        self.status
    }

    /// Derived-axis parameters
    pub fn config(&self) -> &DerivedAxisConfig {
        &self.config
    }

    /// Current lever radius
    pub fn radius(&self) -> Radius {
        self.config.radius
    }

    /// Replace the lever radius.
    ///
    /// Cached limits were derived from the old radius, so a synchronized
    /// axis drops back to `Wired` until limits are recomputed.
    pub fn set_radius(&mut self, radius: Radius) {
        info!("{}: radius {} -> {}", self.name, self.config.radius, radius);
        self.config.radius = radius;
        if self.status == DerivedAxisStatus::Synchronized {
            self.status = DerivedAxisStatus::Wired;
        }
    }

    /// Recompute limits from the screw limits.
    ///
    /// Silent no-op returning `false` while the screw is not ready or its
    /// limits are unavailable.
    pub fn recompute_limits(&mut self) -> bool {
        let Some(screw) = self.screw_handle() else {
            debug!("{}: no screw wired, limits unchanged", self.name);
            return false;
        };

        if !screw.borrow().is_ready() {
            debug!("{}: screw '{}' not ready, limits unchanged", self.name, self.config.screw);
            return false;
        }

        let screw_limits = match screw.borrow().limits() {
            Ok(limits) => limits,
            Err(e) => {
                debug!("{}: screw limits unavailable ({}), limits unchanged", self.name, e);
                return false;
            }
        };

        let radius = self.config.radius;
        let limits = screw_limits.map(|v| radius.forward(v));
        self.limits = Some(limits);
        self.status = DerivedAxisStatus::Synchronized;
        info!(
            "{}: limits ({:.4}, {:.4}) from screw limits ({}, {})",
            self.name, limits.low, limits.high, screw_limits.low, screw_limits.high
        );
        true
    }

    fn screw_handle(&self) -> Option<AxisHandle> {
        self.screw.as_ref().and_then(|weak| weak.upgrade())
    }

    fn read_position(&self) -> f64 {
        if self.status == DerivedAxisStatus::Uninitialized {
            return self.local_position;
        }

        let screw = self
            .screw_handle()
            .ok_or_else(|| SharedError::not_ready(&self.config.screw))
            .and_then(|screw| screw.borrow().position());

        match screw {
            Ok(screw) => self.config.radius.forward(screw),
            Err(e) => {
                debug!("{}: {}, reading screw as 0", self.name, e);
                self.config.radius.forward(0.0)
            }
        }
    }
}

impl Axis for VirtualGamma {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Result<f64> {
        Ok(self.read_position())
    }

    fn move_to(&mut self, target: f64, options: &MoveOptions) -> Result<()> {
        if self.status == DerivedAxisStatus::Uninitialized {
            debug!("{}: no screw wired, local position set to {}", self.name, target);
            self.local_position = target;
            return Ok(());
        }

        let Some(screw) = self.screw_handle() else {
            warn!("{}: screw '{}' no longer exists", self.name, self.config.screw);
            return Err(SharedError::not_ready(&self.config.screw));
        };

        let screw_target = self.config.radius.inverse(target);
        debug!("{}: move to {} -> {} {}", self.name, target, self.config.screw, screw_target);
        let result = screw.borrow_mut().move_to(screw_target, options);
        result
    }

    fn is_ready(&self) -> bool {
        self.status != DerivedAxisStatus::Uninitialized
            && self.screw_handle().is_some_and(|screw| screw.borrow().is_ready())
    }

    fn limits(&self) -> Result<Limits> {
        self.limits.ok_or_else(|| SharedError::not_ready(&self.name))
    }
}
