//! Runtime configuration for resolution.
//!
//! A [`MechanicsConfig`] is loaded from JSON and layered over a
//! [`SystemDescriptor`]. Every field is optional; missing fields keep the
//! descriptor's values, down to individual threshold fields.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};
use crate::resolution::{OutcomeDegree, ThresholdConfig};
use crate::system::{SystemDescriptor, preset};

/// Per-field threshold overrides. Unset fields keep the preset's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    /// Replacement critical success divisor.
    pub critical_success_divisor: Option<i32>,
    /// Replacement critical failure band.
    pub failure_band: Option<i32>,
    /// Replacement target floor.
    pub target_floor: Option<i32>,
    /// Cap on targets. A preset's ceiling cannot be removed, only moved.
    pub target_ceiling: Option<i32>,
}

impl ThresholdOverrides {
    /// Overrides that replace every field of `thresholds`.
    ///
    /// A `None` ceiling in `thresholds` leaves the preset's ceiling alone.
    pub fn all(thresholds: ThresholdConfig) -> Self {
        Self {
            critical_success_divisor: Some(thresholds.critical_success_divisor),
            failure_band: Some(thresholds.failure_band),
            target_floor: Some(thresholds.target_floor),
            target_ceiling: thresholds.target_ceiling,
        }
    }

    /// Returns true if nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer the set fields over `base`.
    pub fn merge(&self, base: ThresholdConfig) -> ThresholdConfig {
        ThresholdConfig {
            critical_success_divisor: self
                .critical_success_divisor
                .unwrap_or(base.critical_success_divisor),
            failure_band: self.failure_band.unwrap_or(base.failure_band),
            target_floor: self.target_floor.unwrap_or(base.target_floor),
            target_ceiling: self.target_ceiling.or(base.target_ceiling),
        }
    }
}

/// Overrides for thresholds, delivery and randomness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MechanicsConfig {
    /// Preset to start from (e.g., "legendary"). Defaults to core rules.
    pub system: Option<String>,
    /// Threshold fields to override.
    pub thresholds: ThresholdOverrides,
    /// Replacement set of delivering degrees.
    pub delivering: Option<Vec<OutcomeDegree>>,
    /// Seed for reproducible rolls.
    pub seed: Option<u64>,
}

impl MechanicsConfig {
    /// Start from a named preset.
    pub fn with_system(mut self, id: impl Into<String>) -> Self {
        self.system = Some(id.into());
        self
    }

    /// Override threshold fields.
    pub fn with_thresholds(mut self, thresholds: ThresholdOverrides) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Override delivering degrees.
    pub fn with_delivering(mut self, degrees: impl Into<Vec<OutcomeDegree>>) -> Self {
        self.delivering = Some(degrees.into());
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(text: &str) -> MechResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| MechError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: &Path) -> MechResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MechError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded mechanics config");
        Ok(config)
    }

    /// Check that the preset exists and the merged thresholds are usable.
    pub fn validate(&self) -> MechResult<()> {
        self.system().map(|_| ())
    }

    /// The descriptor selected by `system`, with overrides applied and
    /// the merged thresholds validated.
    pub fn system(&self) -> MechResult<SystemDescriptor> {
        let base = match &self.system {
            Some(id) => preset::by_id(id)
                .ok_or_else(|| MechError::InvalidConfig(format!("unknown system: {id}")))?,
            None => preset::sohl(),
        };
        let system = self.apply(base);
        system.thresholds.validate()?;
        Ok(system)
    }

    /// Layer the overrides over a descriptor.
    pub fn apply(&self, mut system: SystemDescriptor) -> SystemDescriptor {
        system.thresholds = self.thresholds.merge(system.thresholds);
        if let Some(delivering) = &self.delivering {
            system.delivering = delivering.clone();
        }
        system
    }

    /// A random source honoring the configured seed.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
