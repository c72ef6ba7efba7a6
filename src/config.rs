//! Tuning knobs for the containers.
//!
//! Both configs deserialize with `#[serde(default)]`, so a host application
//! can embed them in its own config file and only spell out what it changes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_SIZE: usize = 100;
pub const DEFAULT_HEAP_CAPACITY: usize = 100;

/// Load-factor window and growth rate of a [`HashTable`](crate::HashTable).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub min_load_factor: f64,
    pub max_load_factor: f64,
    pub resize_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_load_factor: 0.0,
            max_load_factor: 0.5,
            resize_factor: 2.0,
        }
    }
}

impl TableConfig {
    pub fn with_min_load_factor(mut self, lf: f64) -> Self {
        self.min_load_factor = lf;
        self
    }

    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    pub fn with_resize_factor(mut self, factor: f64) -> Self {
        self.resize_factor = factor;
        self
    }

    /// Rejects bounds for which some element count has no prime table size
    /// inside `[min, max]`.
    ///
    /// The check is sufficient, not necessary: either `min == 0` or the
    /// window is at least a third wide with `min <= 1/2`. The smallest
    /// prime size is 2, so a single entry can never load a table past 1/2.
    /// The resize factor must map a full table (`max`) back into the window,
    /// i.e. `max * resize >= 1` and `max >= min * resize`.
    pub fn validate(&self) -> Result<()> {
        let (min, max, resize) = (
            self.min_load_factor,
            self.max_load_factor,
            self.resize_factor,
        );
        if !(min.is_finite() && max.is_finite() && resize.is_finite()) {
            return Err(Error::InvalidConfiguration("factors must be finite"));
        }
        if min < 0.0 || max > 1.0 || max <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "load factors must satisfy 0 <= min and 0 < max <= 1",
            ));
        }
        if min != 0.0 && max - min < 1.0 / 3.0 {
            return Err(Error::InvalidConfiguration(
                "load factor window must be at least 1/3 wide unless min is 0",
            ));
        }
        if min > 0.5 {
            return Err(Error::InvalidConfiguration(
                "min load factor above 1/2 cannot hold a single entry",
            ));
        }
        if resize <= 1.0 {
            return Err(Error::InvalidConfiguration("resize factor must exceed 1"));
        }
        if max * resize < 1.0 || max < min * resize {
            return Err(Error::InvalidConfiguration(
                "resize factor must keep max * resize >= 1 and max >= min * resize",
            ));
        }
        Ok(())
    }
}

/// Growth rate of a [`MaxHeap`](crate::MaxHeap)'s backing storage.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    pub resize_factor: f64,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self { resize_factor: 2.0 }
    }
}

impl HeapConfig {
    pub fn with_resize_factor(mut self, factor: f64) -> Self {
        self.resize_factor = factor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.resize_factor.is_finite() || self.resize_factor <= 1.0 {
            return Err(Error::InvalidConfiguration(
                "heap resize factor must be finite and exceed 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(min: f64, max: f64, resize: f64) -> TableConfig {
        TableConfig::default()
            .with_min_load_factor(min)
            .with_max_load_factor(max)
            .with_resize_factor(resize)
    }

    #[test]
    fn reference_configurations_validate() {
        assert!(TableConfig::default().validate().is_ok());
        assert!(table(0.0, 0.5, 2.0).validate().is_ok());
        assert!(table(0.0, 1.0, 1.2).validate().is_ok());
        assert!(table(0.33, 1.0, 1.5).validate().is_ok());
    }

    #[test]
    fn infeasible_load_factors_rejected() {
        for cfg in [
            table(0.3, 0.5, 1.5),  // window narrower than 1/3
            table(0.0, 1.5, 2.0),  // max above 1
            table(-0.1, 0.5, 2.0), // negative min
            table(0.0, 0.0, 2.0),  // max of zero
            table(0.6, 1.0, 1.5),  // one entry needs a 1-slot table
            table(f64::NAN, 0.5, 2.0),
        ] {
            assert!(
                matches!(cfg.validate(), Err(Error::InvalidConfiguration(_))),
                "{cfg:?} should be rejected"
            );
        }
    }

    #[test]
    fn infeasible_resize_factors_rejected() {
        // max * resize < 1
        assert!(table(0.0, 0.5, 1.5).validate().is_err());
        // max < min * resize
        assert!(table(0.3, 0.9, 3.5).validate().is_err());
        // resize must actually grow
        assert!(table(0.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn heap_config_requires_growth() {
        assert!(HeapConfig::default().validate().is_ok());
        assert!(HeapConfig::default().with_resize_factor(1.0).validate().is_err());
        assert!(HeapConfig::default()
            .with_resize_factor(f64::INFINITY)
            .validate()
            .is_err());
    }
}
