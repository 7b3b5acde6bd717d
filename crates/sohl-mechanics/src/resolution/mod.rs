//! Outcome classification for success tests.
//!
//! A roll is compared against a target value in tiers:
//! - at or under the target is a success, and a critical success when the
//!   roll is also at or under `max(1, target / critical_success_divisor)`
//! - over the target is a failure, and a critical failure when the roll is at
//!   or over `target + failure_band`
//!
//! A roll exactly on the target succeeds.

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// The degree of a success test outcome, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeDegree {
    /// A catastrophic failure.
    CriticalFailure,
    /// A plain failure.
    MarginalFailure,
    /// A plain success.
    MarginalSuccess,
    /// An exceptional success.
    CriticalSuccess,
}

impl OutcomeDegree {
    /// All degrees from worst to best.
    pub const ALL: [Self; 4] = [
        Self::CriticalFailure,
        Self::MarginalFailure,
        Self::MarginalSuccess,
        Self::CriticalSuccess,
    ];

    /// Returns true for marginal and critical successes.
    pub fn is_success(self) -> bool {
        matches!(self, Self::MarginalSuccess | Self::CriticalSuccess)
    }

    /// Returns true for critical successes and critical failures.
    pub fn is_critical(self) -> bool {
        matches!(self, Self::CriticalSuccess | Self::CriticalFailure)
    }

    /// Numeric success level: 0 (CF) through 3 (CS).
    pub fn success_level(self) -> u8 {
        match self {
            Self::CriticalFailure => 0,
            Self::MarginalFailure => 1,
            Self::MarginalSuccess => 2,
            Self::CriticalSuccess => 3,
        }
    }

    /// Two-letter abbreviation (CF, MF, MS, CS).
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::CriticalFailure => "CF",
            Self::MarginalFailure => "MF",
            Self::MarginalSuccess => "MS",
            Self::CriticalSuccess => "CS",
        }
    }

    /// Parse a degree from its abbreviation or snake_case name.
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cf" | "critical_failure" => Some(Self::CriticalFailure),
            "mf" | "marginal_failure" => Some(Self::MarginalFailure),
            "ms" | "marginal_success" => Some(Self::MarginalSuccess),
            "cs" | "critical_success" => Some(Self::CriticalSuccess),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutcomeDegree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalFailure => write!(f, "Critical Failure"),
            Self::MarginalFailure => write!(f, "Marginal Failure"),
            Self::MarginalSuccess => write!(f, "Marginal Success"),
            Self::CriticalSuccess => write!(f, "Critical Success"),
        }
    }
}

/// Thresholds that tune classification for a rule variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Target is divided by this to get the critical success threshold.
    pub critical_success_divisor: i32,
    /// A failed roll this far over the target is a critical failure.
    pub failure_band: i32,
    /// The lowest target value a test can have.
    pub target_floor: i32,
    /// The highest target value a test can have, if capped.
    pub target_ceiling: Option<i32>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            critical_success_divisor: 5,
            failure_band: 20,
            target_floor: 1,
            target_ceiling: None,
        }
    }
}

impl ThresholdConfig {
    /// Set the critical success divisor.
    pub fn with_divisor(mut self, divisor: i32) -> Self {
        self.critical_success_divisor = divisor;
        self
    }

    /// Set the critical failure band.
    pub fn with_failure_band(mut self, band: i32) -> Self {
        self.failure_band = band;
        self
    }

    /// Set the target floor.
    pub fn with_floor(mut self, floor: i32) -> Self {
        self.target_floor = floor;
        self
    }

    /// Cap targets at `ceiling`.
    pub fn with_ceiling(mut self, ceiling: i32) -> Self {
        self.target_ceiling = Some(ceiling);
        self
    }

    /// Check that the thresholds can classify every roll.
    pub fn validate(&self) -> MechResult<()> {
        if self.critical_success_divisor < 1 {
            return Err(MechError::InvalidConfig(format!(
                "critical_success_divisor must be at least 1, got {}",
                self.critical_success_divisor
            )));
        }
        if self.failure_band < 0 {
            return Err(MechError::InvalidConfig(format!(
                "failure_band must not be negative, got {}",
                self.failure_band
            )));
        }
        match self.target_ceiling {
            Some(ceiling) if ceiling < self.target_floor => Err(MechError::InvalidConfig(format!(
                "target_ceiling {ceiling} is below target_floor {}",
                self.target_floor
            ))),
            _ => Ok(()),
        }
    }

    /// Apply the floor and optional ceiling to a raw target.
    pub fn clamp_target(&self, raw: i32) -> i32 {
        let floored = raw.max(self.target_floor);
        match self.target_ceiling {
            Some(ceiling) => floored.min(ceiling.max(self.target_floor)),
            None => floored,
        }
    }

    /// The highest roll that counts as a critical success against `target`.
    pub fn critical_success_threshold(&self, target: i32) -> i32 {
        target
            .div_euclid(self.critical_success_divisor.max(1))
            .max(1)
    }

    /// The lowest roll that counts as a critical failure against `target`.
    pub fn critical_failure_threshold(&self, target: i32) -> i32 {
        target.saturating_add(self.failure_band)
    }
}

/// Classify a roll total against a target value.
pub fn classify(total: i32, target: i32, thresholds: &ThresholdConfig) -> OutcomeDegree {
    if total <= target {
        if total <= thresholds.critical_success_threshold(target) {
            OutcomeDegree::CriticalSuccess
        } else {
            OutcomeDegree::MarginalSuccess
        }
    } else if total >= thresholds.critical_failure_threshold(target) {
        OutcomeDegree::CriticalFailure
    } else {
        OutcomeDegree::MarginalFailure
    }
}
