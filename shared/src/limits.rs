/*!
Travel limits of a motion axis.
*/

use serde::{Deserialize, Serialize};

/// (low, high) bounds of permitted axis travel.
///
/// A pair with `low >= high` (the default `(0, 0)` included) means no limits
/// are configured and nothing is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Limits {
    pub low: f64,
    pub high: f64,
}

impl Limits {
    /// Create a limits pair as given
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Return the pair ordered ascending
    pub fn sorted(self) -> Self {
        if self.low <= self.high {
            self
        } else {
            Self::new(self.high, self.low)
        }
    }

    /// Map both bounds through `f` and sort the result.
    ///
    /// An unbounded pair maps to the unbounded default.
    pub fn map<F: Fn(f64) -> f64>(self, f: F) -> Self {
        if !self.is_bounded() {
            return Self::default();
        }
        Self::new(f(self.low), f(self.high)).sorted()
    }

    /// Whether the pair actually restricts travel
    pub fn is_bounded(&self) -> bool {
        self.low < self.high
    }

    /// Whether `value` is permitted; always true when unbounded
    pub fn contains(&self, value: f64) -> bool {
        !self.is_bounded() || (self.low..=self.high).contains(&value)
    }
}

impl From<(f64, f64)> for Limits {
    fn from((low, high): (f64, f64)) -> Self {
        Self::new(low, high)
    }
}
