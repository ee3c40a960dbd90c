/*!
# Shared Types and Utilities

This crate contains the axis model of the six-circle diffractometer: the
screw-to-angle transform, the derived gamma positioner, and the assembly
that wires them to the physical motors and the solver configuration.

## Core Types

- [`Axis`] - Contract shared by physical, simulated and derived axes
- [`VirtualGamma`] - Gamma angle computed from the gamma screw
- [`Sixc`] - Six-circle assembly (simulated or EPICS-backed)
- [`Limits`] - Axis travel limits

## Modules

- [`transform`] - Screw translation / angle conversion
- [`axis`] - Axis contract and registry
- [`soft_positioner`] - In-memory axis for simulation
- [`virtual_gamma`] - Derived gamma axis
- [`solver`] - Geometry, constraints and modes handed to the solver
- [`diffractometer`] - Assembly construction
- [`error`] - Common error types
*/

pub mod axis;
pub mod diffractometer;
pub mod error;
pub mod limits;
pub mod soft_positioner;
pub mod solver;
pub mod transform;
pub mod virtual_gamma;

// Re-export commonly used types
pub use axis::{Axis, AxisHandle, AxisRegistry, MoveOptions};
pub use diffractometer::{AxisReading, HardwareConfig, MotorConnector, SimConfig, Sixc, SixcConfig};
pub use error::{Result, SharedError};
pub use limits::Limits;
pub use soft_positioner::SoftPositioner;
pub use solver::{Constraints, Geometry};
pub use transform::{forward, inverse, Radius};
pub use virtual_gamma::{DerivedAxisConfig, DerivedAxisStatus, VirtualGamma};

/// Version information for the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
