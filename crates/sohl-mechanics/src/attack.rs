//! Attack chains: a success test followed by the impact it may deliver.

use serde::{Deserialize, Serialize};

use crate::dice::RandomSource;
use crate::error::MechResult;
use crate::impact::ImpactResult;
use crate::modifier::{ImpactModifier, ModifierStack};
use crate::registry::ResultRegistry;
use crate::resolution::OutcomeDegree;
use crate::success::{ResultId, SuccessTestResult};
use crate::system::SohlSystem;

/// What to roll for one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    /// Attack skill before modifiers.
    pub base_value: i32,
    /// Situational attack modifiers.
    pub modifiers: ModifierStack,
    /// Impact dice formula (e.g., "2d6+1").
    pub impact_formula: String,
    /// Impact aspect and adjustments.
    pub impact_modifier: ImpactModifier,
}

impl AttackRequest {
    /// An attack with no modifiers and a blunt impact.
    pub fn new(base_value: i32, impact_formula: impl Into<String>) -> Self {
        Self {
            base_value,
            modifiers: ModifierStack::new(),
            impact_formula: impact_formula.into(),
            impact_modifier: ImpactModifier::default(),
        }
    }

    /// Replace the attack modifiers.
    pub fn with_modifiers(mut self, modifiers: ModifierStack) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the impact modifier.
    pub fn with_impact_modifier(mut self, impact_modifier: ImpactModifier) -> Self {
        self.impact_modifier = impact_modifier;
        self
    }
}

/// A resolved attack and its impact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResolution {
    /// The attack test, rolled and classified.
    pub attack: SuccessTestResult,
    /// The impact, resolved against the attack.
    pub impact: ImpactResult,
}

impl AttackResolution {
    /// The attack's degree.
    pub fn degree(&self) -> MechResult<OutcomeDegree> {
        self.attack.classify()
    }

    /// Delivered impact magnitude (0 on a miss).
    pub fn effective_impact(&self) -> MechResult<i32> {
        self.impact.effective_impact()
    }

    /// Store both results, returning the impact's id.
    pub fn record(self, registry: &mut ResultRegistry) -> ResultId {
        registry.insert(self.attack);
        registry.insert(self.impact)
    }
}

impl std::fmt::Display for AttackResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}; {}", self.attack.description(), self.impact)
    }
}

/// Roll an attack, then resolve and roll its impact.
///
/// The attack is classified before the impact is resolved. The impact dice
/// are always drawn so a negated roll can still be shown; only
/// `delivers_impact` decides whether it counts.
pub fn resolve_attack<R: RandomSource + ?Sized>(
    system: &dyn SohlSystem,
    request: &AttackRequest,
    rng: &mut R,
) -> MechResult<AttackResolution> {
    let mut attack = system
        .success_test(request.base_value, request.modifiers.clone())?
        .with_title("Attack");
    let degree = attack.evaluate(rng);

    let mut impact = system
        .impact_result(&request.impact_formula, request.impact_modifier.clone())?;
    impact.resolve(&attack)?;
    impact.evaluate(rng);
    tracing::debug!(system = system.id(), degree = %degree, delivers = impact.delivers_impact(), "attack resolved");
    Ok(AttackResolution { attack, impact })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedSource;
    use crate::modifier::{ImpactAspect, Modifier};
    use crate::system::preset;

    fn sword() -> AttackRequest {
        AttackRequest::new(55, "2d6")
            .with_modifiers(ModifierStack::new().with(Modifier::new("Flank", 5)))
            .with_impact_modifier(
                ImpactModifier::new(ImpactAspect::Edged).with(Modifier::new("Broadsword", 2)),
            )
    }

    #[test]
    fn hit_rolls_and_delivers_impact() {
        let system = preset::sohl();
        let mut rng = ScriptedSource::new([40, 3, 4]);
        let result = resolve_attack(&system, &sword(), &mut rng).unwrap();
        assert_eq!(result.attack.target_value(), 60);
        assert_eq!(result.degree().unwrap(), OutcomeDegree::MarginalSuccess);
        assert!(result.impact.delivers_impact());
        assert_eq!(result.effective_impact().unwrap(), 9);
        assert_eq!(result.impact.prior_test_result(), Some(result.attack.id()));
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn miss_still_rolls_impact_for_display() {
        let system = preset::sohl();
        let mut rng = ScriptedSource::new([70, 6, 6]);
        let result = resolve_attack(&system, &sword(), &mut rng).unwrap();
        assert_eq!(result.degree().unwrap(), OutcomeDegree::MarginalFailure);
        assert!(!result.impact.delivers_impact());
        assert!(result.impact.roll().is_evaluated());
        assert_eq!(result.impact.roll().total().unwrap(), 12);
        assert_eq!(result.effective_impact().unwrap(), 0);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn critical_failure_rolls_negated_impact() {
        let request = AttackRequest::new(50, "2d6");
        let mut rng = ScriptedSource::new([90, 6, 6]);
        let result = resolve_attack(&preset::sohl(), &request, &mut rng).unwrap();
        assert_eq!(result.degree().unwrap(), OutcomeDegree::CriticalFailure);
        assert!(result.impact.roll().is_evaluated());
        assert_eq!(result.effective_impact().unwrap(), 0);
        insta::assert_snapshot!(result.impact.to_string(), @"Impact: no impact (2d6 [6, 6] = 12)");
    }

    #[test]
    fn variant_delivering_set_is_honored() {
        let system = preset::sohl().with_delivering([OutcomeDegree::CriticalSuccess]);
        let result = resolve_attack(&system, &sword(), &mut ScriptedSource::new([40, 6, 6])).unwrap();
        assert!(!result.impact.delivers_impact());
        assert_eq!(result.effective_impact().unwrap(), 0);
    }

    #[test]
    fn bad_impact_formula_is_reported() {
        let request = AttackRequest::new(50, "2x6");
        let err = resolve_attack(&preset::sohl(), &request, &mut ScriptedSource::new([10])).unwrap_err();
        assert!(matches!(err, crate::error::MechError::InvalidRollSpec(_)));
    }

    #[test]
    fn record_links_chain() {
        let system = preset::sohl();
        let result = resolve_attack(&system, &sword(), &mut ScriptedSource::new([5, 6, 6])).unwrap();
        assert_eq!(result.degree().unwrap(), OutcomeDegree::CriticalSuccess);
        let mut registry = ResultRegistry::new();
        let impact_id = result.record(&mut registry);
        let chain = registry.chain(impact_id);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].as_success_test().title(), "Attack");
    }
}
