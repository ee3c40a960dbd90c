/*!
Six-circle diffractometer assembly with gamma driven by a screw translation.

The geometry is the IUCr 6-circle of Lohmeier & Vlieg. Five reals (`mu`,
`theta`, `chi`, `phi`, `delta`) are ordinary motors; `gamma` is a
[`VirtualGamma`] computed from the `gamscrew` translation.

Two backends build the same assembly from the same [`SixcConfig`]:

- [`Sixc::simulated`] uses [`SoftPositioner`]s for every physical axis.
- [`Sixc::connect`] names EPICS motor records from a [`HardwareConfig`] and
  asks a caller-supplied [`MotorConnector`] for their handles.
*/

use crate::axis::{handle, Axis, AxisHandle, AxisRegistry, MoveOptions};
use crate::error::{Result, SharedError};
use crate::limits::Limits;
use crate::soft_positioner::SoftPositioner;
use crate::solver::{Constraints, Geometry};
use crate::transform::Radius;
use crate::virtual_gamma::{DerivedAxisConfig, DerivedAxisStatus, VirtualGamma};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

/// Name of the derived axis
pub const GAMMA: &str = "gamma";

/// Travel of the simulated gamma screw
pub const DEFAULT_SCREW_LIMITS: Limits = Limits {
    low: -10.0,
    high: 250.0,
};

/// Characters allowed in an EPICS record name, plus `.` for a field suffix
const PV_PATTERN: &str = r"^[A-Za-z0-9_\-+:\[\]<>;.]+$";

/// Configuration shared by the simulated and hardware assemblies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SixcConfig {
    /// Assembly name
    pub name: String,

    /// Initial operating mode, geometry default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Solver geometry
    pub geometry: Geometry,

    /// Derived gamma parameters
    pub gamma: DerivedAxisConfig,
}

impl Default for SixcConfig {
    fn default() -> Self {
        Self {
            name: "sixc".to_string(),
            mode: None,
            geometry: Geometry::default(),
            gamma: DerivedAxisConfig::default(),
        }
    }
}

/// Simulated backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Soft limits of the gamma screw
    pub screw_limits: Limits,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            screw_limits: DEFAULT_SCREW_LIMITS,
        }
    }
}

/// EPICS motor records of the hardware backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// IOC prefix, e.g. `28idc:`
    pub prefix: String,
    pub m_mu: String,
    pub m_theta: String,
    pub m_chi: String,
    pub m_phi: String,
    pub m_delta: String,
    pub m_gamscrew: String,
}

impl HardwareConfig {
    /// Motor record for a physical axis, the screw included
    pub fn motor(&self, axis: &str, screw: &str) -> Option<&str> {
        let motor = match axis {
            _ if axis == screw => &self.m_gamscrew,
            "mu" => &self.m_mu,
            "theta" => &self.m_theta,
            "chi" => &self.m_chi,
            "phi" => &self.m_phi,
            "delta" => &self.m_delta,
            _ => return None,
        };
        Some(motor.as_str())
    }

    /// (axis, PV) pairs for every physical axis of `config`
    pub fn pv_names(&self, config: &SixcConfig) -> Result<Vec<(String, String)>> {
        let pattern = Regex::new(PV_PATTERN).map_err(|e| SharedError::config(e.to_string()))?;

        physical_axes(config)
            .into_iter()
            .map(|axis| -> Result<(String, String)> {
                let motor = self
                    .motor(&axis, &config.gamma.screw)
                    .filter(|m| !m.is_empty())
                    .ok_or_else(|| {
                        SharedError::config(format!("no motor record configured for axis '{}'", axis))
                    })?;
                let pv = format!("{}{}", self.prefix, motor);
                if !pattern.is_match(&pv) {
                    return Err(SharedError::InvalidPv(pv));
                }
                Ok((axis, pv))
            })
            .collect()
    }
}

/// Source of hardware axis handles, one per EPICS motor record
pub trait MotorConnector {
    /// Create the axis `axis` backed by the motor record `pv`
    fn connect(&self, axis: &str, pv: &str) -> Result<AxisHandle>;
}

/// Snapshot of one axis for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisReading {
    pub name: String,
    pub position: Option<f64>,
    pub limits: Option<Limits>,
}

/// Physical axes of an assembly: the reals except gamma, then the screw
fn physical_axes(config: &SixcConfig) -> Vec<String> {
    config
        .geometry
        .reals
        .iter()
        .filter(|name| name.as_str() != GAMMA)
        .cloned()
        .chain(std::iter::once(config.gamma.screw.clone()))
        .collect()
}

/// Six-circle diffractometer assembly
pub struct Sixc {
    name: String,
    geometry: Geometry,
    registry: AxisRegistry,
    gamma: Rc<RefCell<VirtualGamma>>,
    constraints: Constraints,
    mode: String,
}

impl Sixc {
    /// Build a simulated assembly, every physical axis starting at 0
    pub fn simulated(config: &SixcConfig, sim: &SimConfig) -> Result<Self> {
        let axes = physical_axes(config)
            .into_iter()
            .map(|name| {
                let mut axis = SoftPositioner::new(name.clone()).with_position(0.0);
                if name == config.gamma.screw {
                    axis = axis.with_limits(sim.screw_limits);
                }
                (name, handle(axis))
            })
            .collect();
        Self::build(config, axes)
    }

    /// Build a hardware assembly from EPICS motor records
    pub fn connect(
        config: &SixcConfig,
        hardware: &HardwareConfig,
        connector: &dyn MotorConnector,
    ) -> Result<Self> {
        let axes = hardware
            .pv_names(config)?
            .into_iter()
            .map(|(axis, pv)| {
                info!("{}: connecting {}", axis, pv);
                connector.connect(&axis, &pv).map(|motor| (axis, motor))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::build(config, axes)
    }

    fn build(config: &SixcConfig, physical: Vec<(String, AxisHandle)>) -> Result<Self> {
        let geometry = config.geometry.clone();
        if !geometry.reals.iter().any(|r| r == GAMMA) {
            return Err(SharedError::config(format!(
                "geometry '{}' has no '{}' axis",
                geometry.geometry, GAMMA
            )));
        }

        let mut registry = AxisRegistry::new();
        for (name, axis) in physical {
            registry.register(name, axis)?;
        }

        let gamma = Rc::new(RefCell::new(VirtualGamma::new(GAMMA, config.gamma.clone())));
        registry.register(GAMMA, gamma.clone())?;
        gamma.borrow_mut().wire(&registry)?;

        for real in &geometry.reals {
            registry.get(real)?;
        }

        let mode = match &config.mode {
            Some(mode) => mode.clone(),
            None => geometry
                .default_mode()
                .ok_or_else(|| {
                    SharedError::config(format!("geometry '{}' has no modes", geometry.geometry))
                })?
                .to_string(),
        };
        geometry.check_mode(&mode)?;

        let mut sixc = Self {
            name: config.name.clone(),
            constraints: Constraints::for_reals(&geometry.reals),
            geometry,
            registry,
            gamma,
            mode,
        };

        if sixc.gamma_status() == DerivedAxisStatus::Synchronized {
            sixc.push_gamma_constraint()?;
        } else {
            warn!(
                "{}: screw '{}' not ready, gamma limits pending",
                sixc.name,
                config.gamma.screw
            );
        }

        info!(
            "{}: {} / {} ready, mode '{}', radius {}",
            sixc.name,
            sixc.geometry.solver,
            sixc.geometry.geometry,
            sixc.mode,
            sixc.radius()
        );
        Ok(sixc)
    }

    /// Assembly name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Solver geometry
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Current position of one axis
    pub fn position(&self, name: &str) -> Result<f64> {
        self.registry.get(name)?.borrow().position()
    }

    /// Snapshot of the reals in solver order, then the screw
    pub fn positions(&self) -> Vec<AxisReading> {
        let screw = self.gamma.borrow().config().screw.clone();
        self.geometry
            .reals
            .iter()
            .chain(std::iter::once(&screw))
            .filter_map(|name| self.registry.get(name).ok().map(|axis| (name, axis)))
            .map(|(name, axis)| {
                let axis = axis.borrow();
                AxisReading {
                    name: name.clone(),
                    position: axis.position().ok(),
                    limits: axis.limits().ok(),
                }
            })
            .collect()
    }

    /// Move one axis, passing `options` through to its backend
    pub fn move_axis(&self, name: &str, target: f64, options: &MoveOptions) -> Result<()> {
        info!("{}: move {} to {}", self.name, name, target);
        self.registry.get(name)?.borrow_mut().move_to(target, options)
    }

    /// Whether every registered axis is ready
    pub fn is_ready(&self) -> bool {
        self.registry.iter().all(|(_, axis)| axis.borrow().is_ready())
    }

    /// Recompute gamma limits from the screw and hand them to the solver.
    ///
    /// Returns `false`, changing nothing, while the screw is not ready. The
    /// assembly does not watch the screw limits; call again after they change.
    pub fn synchronize(&mut self) -> Result<bool> {
        let synchronized = self.gamma.borrow_mut().recompute_limits();
        if synchronized {
            self.push_gamma_constraint()?;
        }
        Ok(synchronized)
    }

    fn push_gamma_constraint(&mut self) -> Result<()> {
        let limits = self.gamma.borrow().limits()?;
        self.constraints.set_limits(GAMMA, limits)
    }

    /// Wiring state of gamma
    pub fn gamma_status(&self) -> DerivedAxisStatus {
        self.gamma.borrow().status()
    }

    /// Current gamma lever radius
    pub fn radius(&self) -> Radius {
        self.gamma.borrow().radius()
    }

    /// Replace the gamma lever radius and resynchronize limits
    pub fn set_radius(&mut self, radius: Radius) -> Result<bool> {
        self.gamma.borrow_mut().set_radius(radius);
        self.synchronize()
    }

    /// Selected operating mode
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Select an operating mode offered by the geometry
    pub fn set_mode(&mut self, mode: &str) -> Result<()> {
        self.geometry.check_mode(mode)?;
        info!("{}: mode '{}' -> '{}'", self.name, self.mode, mode);
        self.mode = mode.to_string();
        Ok(())
    }

    /// Solver constraints
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::DEFAULT_CONSTRAINT;

    fn config(radius: f64) -> SixcConfig {
        SixcConfig {
            gamma: DerivedAxisConfig {
                radius: Radius::new(radius).unwrap(),
                ..DerivedAxisConfig::default()
            },
            ..SixcConfig::default()
        }
    }

    fn hardware() -> HardwareConfig {
        HardwareConfig {
            prefix: "28idc:".to_string(),
            m_delta: "m1".to_string(),
            m_theta: "m2".to_string(),
            m_chi: "m3".to_string(),
            m_phi: "m4".to_string(),
            m_mu: "m5".to_string(),
            m_gamscrew: "m6".to_string(),
        }
    }

    /// Hands out soft positioners; the screw has no position until moved
    #[derive(Default)]
    struct FakeConnector {
        connected: RefCell<Vec<String>>,
    }

    impl MotorConnector for FakeConnector {
        fn connect(&self, axis: &str, pv: &str) -> Result<AxisHandle> {
            self.connected.borrow_mut().push(pv.to_string());
            let positioner = if axis == "gamscrew" {
                SoftPositioner::new(axis).with_limits(DEFAULT_SCREW_LIMITS)
            } else {
                SoftPositioner::new(axis).with_position(0.0)
            };
            Ok(handle(positioner))
        }
    }

    #[test]
    fn test_simulated_is_synchronized() {
        let sixc = Sixc::simulated(&config(500.0), &SimConfig::default()).unwrap();
        assert_eq!(sixc.gamma_status(), DerivedAxisStatus::Synchronized);
        assert!(sixc.is_ready());
        assert_eq!(sixc.mode(), "4-circles bissecting horizontal");

        let gamma = sixc.constraints().get(GAMMA).unwrap();
        assert!((gamma.low + 1.145_762_838).abs() < 1e-6);
        assert!((gamma.high - 26.565_051_177).abs() < 1e-6);
        assert_eq!(sixc.constraints().get("mu").unwrap(), DEFAULT_CONSTRAINT);
    }

    #[test]
    fn test_positions_order() {
        let sixc = Sixc::simulated(&SixcConfig::default(), &SimConfig::default()).unwrap();
        let names: Vec<_> = sixc.positions().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["mu", "theta", "chi", "phi", "gamma", "delta", "gamscrew"]);
        assert!(sixc.positions().iter().all(|r| r.position == Some(0.0)));
    }

    #[test]
    fn test_gamma_move_drives_screw() {
        let sim = SimConfig {
            screw_limits: Limits::new(-10.0, 300.0),
        };
        let sixc = Sixc::simulated(&config(1500.0), &sim).unwrap();
        sixc.move_axis(GAMMA, 10.0, &MoveOptions::default()).unwrap();

        assert!((sixc.position("gamscrew").unwrap() - 264.490_471).abs() < 1e-3);
        assert!((sixc.position(GAMMA).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_gamma_move_beyond_screw_travel() {
        let sixc = Sixc::simulated(&config(500.0), &SimConfig::default()).unwrap();
        let err = sixc.move_axis(GAMMA, 45.0, &MoveOptions::default()).unwrap_err();
        assert!(matches!(err, SharedError::LimitViolation { ref axis, .. } if axis == "gamscrew"));
        assert_eq!(sixc.position(GAMMA).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_axis() {
        let sixc = Sixc::simulated(&SixcConfig::default(), &SimConfig::default()).unwrap();
        assert!(sixc.position("omega").is_err());
        assert!(sixc.move_axis("omega", 1.0, &MoveOptions::default()).is_err());
    }

    #[test]
    fn test_mode_selection() {
        let mut sixc = Sixc::simulated(&SixcConfig::default(), &SimConfig::default()).unwrap();
        sixc.set_mode("psi constant horizontal").unwrap();
        assert_eq!(sixc.mode(), "psi constant horizontal");
        assert!(sixc.set_mode("no such mode").is_err());
        assert_eq!(sixc.mode(), "psi constant horizontal");
    }

    #[test]
    fn test_invalid_initial_mode() {
        let config = SixcConfig {
            mode: Some("zaxis".to_string()),
            ..SixcConfig::default()
        };
        let err = Sixc::simulated(&config, &SimConfig::default()).err().unwrap();
        assert!(matches!(err, SharedError::UnknownMode { .. }));
    }

    #[test]
    fn test_geometry_without_gamma() {
        let mut config = SixcConfig::default();
        config.geometry.reals.retain(|r| r != GAMMA);
        assert!(matches!(
            Sixc::simulated(&config, &SimConfig::default()),
            Err(SharedError::Config(_))
        ));
    }

    #[test]
    fn test_set_radius_resynchronizes() {
        let mut sixc = Sixc::simulated(&config(500.0), &SimConfig::default()).unwrap();
        assert!(sixc.set_radius(Radius::new(250.0).unwrap()).unwrap());
        let gamma = sixc.constraints().get(GAMMA).unwrap();
        assert!((gamma.high - 45.0).abs() < 1e-9);
        assert_eq!(sixc.radius().get(), 250.0);
    }

    #[test]
    fn test_pv_names() {
        let pvs = hardware().pv_names(&SixcConfig::default()).unwrap();
        assert_eq!(
            pvs,
            vec![
                ("mu".to_string(), "28idc:m5".to_string()),
                ("theta".to_string(), "28idc:m2".to_string()),
                ("chi".to_string(), "28idc:m3".to_string()),
                ("phi".to_string(), "28idc:m4".to_string()),
                ("delta".to_string(), "28idc:m1".to_string()),
                ("gamscrew".to_string(), "28idc:m6".to_string()),
            ]
        );
    }

    #[test]
    fn test_pv_names_missing_motor() {
        let hardware = HardwareConfig {
            m_chi: String::new(),
            ..hardware()
        };
        assert!(matches!(
            hardware.pv_names(&SixcConfig::default()),
            Err(SharedError::Config(msg)) if msg.contains("chi")
        ));
    }

    #[test]
    fn test_pv_names_invalid_characters() {
        let hardware = HardwareConfig {
            prefix: "28id c:".to_string(),
            ..hardware()
        };
        assert!(matches!(
            hardware.pv_names(&SixcConfig::default()),
            Err(SharedError::InvalidPv(_))
        ));
    }

    #[test]
    fn test_connect_waits_for_screw() {
        let connector = FakeConnector::default();
        let mut sixc = Sixc::connect(&config(500.0), &hardware(), &connector).unwrap();

        assert_eq!(connector.connected.borrow().len(), 6);
        assert_eq!(sixc.gamma_status(), DerivedAxisStatus::Wired);
        assert_eq!(sixc.position(GAMMA).unwrap(), 0.0);
        assert!(!sixc.synchronize().unwrap());
        assert_eq!(sixc.constraints().get(GAMMA).unwrap(), DEFAULT_CONSTRAINT);

        sixc.move_axis("gamscrew", 0.0, &MoveOptions::default()).unwrap();
        assert!(sixc.synchronize().unwrap());
        assert_eq!(sixc.gamma_status(), DerivedAxisStatus::Synchronized);
        assert!((sixc.constraints().get(GAMMA).unwrap().high - 26.565_051_177).abs() < 1e-6);
    }
}
