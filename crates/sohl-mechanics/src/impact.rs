//! Impact results: the physical effect of a successful test.
//!
//! An impact roll may exist without delivering anything. Whether the effect
//! lands is decided by [`ImpactResult::resolve`] against the originating test,
//! and [`ImpactResult::effective_impact`] is 0 unless it does.

use serde::{Deserialize, Serialize};

use crate::dice::{RandomSource, Roll};
use crate::error::MechResult;
use crate::modifier::{ImpactAspect, ImpactModifier};
use crate::resolution::OutcomeDegree;
use crate::success::{ResultId, SuccessTestResult};

/// Degrees of the originating test that deliver impact by default.
pub const DEFAULT_DELIVERING: [OutcomeDegree; 2] = [
    OutcomeDegree::MarginalSuccess,
    OutcomeDegree::CriticalSuccess,
];

/// A success test extended with an impact modifier and a delivery flag.
///
/// The embedded test carries the impact roll, identity and prior link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactResult {
    test: SuccessTestResult,
    impact_modifier: ImpactModifier,
    delivering: Vec<OutcomeDegree>,
    delivers_impact: bool,
    source_degree: Option<OutcomeDegree>,
}

impl ImpactResult {
    /// Create an unresolved impact with the given roll and modifier.
    pub fn new(roll: Roll, impact_modifier: ImpactModifier) -> Self {
        Self {
            test: SuccessTestResult::new(0, roll).with_title("Impact"),
            impact_modifier,
            delivering: DEFAULT_DELIVERING.to_vec(),
            delivers_impact: false,
            source_degree: None,
        }
    }

    /// Replace the set of source degrees that deliver impact.
    pub fn with_delivering(mut self, degrees: impl Into<Vec<OutcomeDegree>>) -> Self {
        self.delivering = degrees.into();
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.test = self.test.with_title(title);
        self
    }

    /// Set the chat card template the host renders this result with.
    pub fn with_chat_template(mut self, template: impl Into<String>) -> Self {
        self.test = self.test.with_chat_template(template);
        self
    }

    /// Decide delivery from the originating test and link back to it.
    ///
    /// Fails with `NotEvaluated` if the source has not been rolled yet.
    pub fn resolve(&mut self, source: &SuccessTestResult) -> MechResult<bool> {
        let degree = source.classify()?;
        self.delivers_impact = self.delivering.contains(&degree);
        self.source_degree = Some(degree);
        self.test.set_prior_result(source.id());
        tracing::debug!(
            id = %self.id(),
            source = %source.id(),
            degree = %degree,
            delivers = self.delivers_impact,
            "impact resolved"
        );
        Ok(self.delivers_impact)
    }

    /// Evaluate the impact roll (if not already) and return its total.
    ///
    /// The embedded test's target is not consulted; an impact roll has no
    /// degree of its own.
    pub fn evaluate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> i32 {
        let total = self.test.roll_mut().evaluate(rng);
        tracing::debug!(id = %self.id(), total, delivers = self.delivers_impact, "impact rolled");
        total
    }

    /// Effect magnitude actually delivered.
    ///
    /// Exactly 0 when impact is not delivered, whatever was rolled. Otherwise
    /// `roll total + effective(impact modifier)`, never below 0.
    pub fn effective_impact(&self) -> MechResult<i32> {
        if !self.delivers_impact {
            return Ok(0);
        }
        let total = self.test.roll().total()?;
        Ok(total.saturating_add(self.impact_modifier.effective()).max(0))
    }

    /// Whether the effect lands.
    pub fn delivers_impact(&self) -> bool {
        self.delivers_impact
    }

    /// The originating test's degree, once resolved.
    pub fn source_degree(&self) -> Option<OutcomeDegree> {
        self.source_degree
    }

    /// The degrees that deliver impact.
    pub fn delivering(&self) -> &[OutcomeDegree] {
        &self.delivering
    }

    /// The impact modifier.
    pub fn impact_modifier(&self) -> &ImpactModifier {
        &self.impact_modifier
    }

    /// The aspect of the impact.
    pub fn aspect(&self) -> &ImpactAspect {
        &self.impact_modifier.aspect
    }

    /// The impact roll.
    pub fn roll(&self) -> &Roll {
        self.test.roll()
    }

    /// This result's identifier.
    pub fn id(&self) -> ResultId {
        self.test.id()
    }

    /// Display title.
    pub fn title(&self) -> &str {
        self.test.title()
    }

    /// The test this impact was resolved against.
    pub fn prior_test_result(&self) -> Option<ResultId> {
        self.test.prior_test_result()
    }

    /// Chat card template, when built by a rule variant.
    pub fn chat_template(&self) -> Option<&str> {
        self.test.chat_template()
    }

    /// The success test contract this impact extends.
    pub fn as_success_test(&self) -> &SuccessTestResult {
        &self.test
    }

    /// A serializable view including the derived fields.
    pub fn snapshot(&self) -> ImpactSnapshot {
        ImpactSnapshot {
            id: self.id(),
            title: self.title().to_string(),
            aspect: self.aspect().clone(),
            impact_modifier: self.impact_modifier.clone(),
            roll: self.roll().clone(),
            delivers_impact: self.delivers_impact,
            source_degree: self.source_degree,
            effective_impact: self.effective_impact().ok(),
            prior_test_result: self.prior_test_result(),
            chat_template: self.chat_template().map(str::to_string),
        }
    }
}

impl std::fmt::Display for ImpactResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.effective_impact() {
            Ok(_) if !self.delivers_impact => {
                write!(f, "{}: no impact ({})", self.title(), self.roll())
            }
            Ok(value) => write!(f, "{}: {value} {}", self.title(), self.aspect()),
            Err(_) => write!(f, "{}: {} (unrolled)", self.title(), self.aspect()),
        }
    }
}

/// Persistence and UI view of an [`ImpactResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSnapshot {
    /// Result identifier.
    pub id: ResultId,
    /// Display title.
    pub title: String,
    /// Aspect of the impact.
    pub aspect: ImpactAspect,
    /// Impact adjustments.
    pub impact_modifier: ImpactModifier,
    /// The impact roll.
    pub roll: Roll,
    /// Whether the effect lands.
    pub delivers_impact: bool,
    /// The originating test's degree.
    pub source_degree: Option<OutcomeDegree>,
    /// Delivered magnitude, absent while a delivering roll is unrolled.
    pub effective_impact: Option<i32>,
    /// The originating test.
    pub prior_test_result: Option<ResultId>,
    /// Chat card template for the host.
    pub chat_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedSource;
    use crate::error::MechError;
    use crate::modifier::Modifier;
    use proptest::prelude::*;

    fn attack(face: u32) -> SuccessTestResult {
        let roll = Roll::from_faces(100, 0, vec![face]).unwrap();
        SuccessTestResult::new(50, roll).with_title("Attack")
    }

    fn edged(bonus: i32) -> ImpactModifier {
        ImpactModifier::new(ImpactAspect::Edged).with(Modifier::new("Broadsword", bonus))
    }

    #[test]
    fn hit_delivers_impact() {
        let source = attack(30);
        let mut impact = ImpactResult::new(Roll::new(2, 6, 0).unwrap(), edged(3));
        assert!(impact.resolve(&source).unwrap());
        impact.evaluate(&mut ScriptedSource::new([4, 5]));
        assert_eq!(impact.effective_impact().unwrap(), 12);
        assert_eq!(impact.prior_test_result(), Some(source.id()));
        assert_eq!(impact.source_degree(), Some(OutcomeDegree::MarginalSuccess));
    }

    #[test]
    fn miss_delivers_nothing_even_with_big_roll() {
        let source = attack(60);
        assert_eq!(source.classify().unwrap(), OutcomeDegree::MarginalFailure);
        let roll = Roll::from_faces(20, 0, vec![15]).unwrap();
        let mut impact = ImpactResult::new(roll, edged(0));
        assert!(!impact.resolve(&source).unwrap());
        assert!(!impact.delivers_impact());
        assert_eq!(impact.roll().total().unwrap(), 15);
        assert_eq!(impact.effective_impact().unwrap(), 0);
    }

    #[test]
    fn evaluate_returns_frozen_roll_total() {
        let mut impact = ImpactResult::new(Roll::new(3, 6, 1).unwrap(), edged(0));
        let mut rng = ScriptedSource::new([2, 5, 6, 1]);
        assert_eq!(impact.evaluate(&mut rng), 14);
        assert_eq!(impact.evaluate(&mut rng), 14);
        assert_eq!(rng.draws(), 3);
        assert_eq!(impact.roll().total().unwrap(), 14);
    }

    #[test]
    fn unresolved_impact_delivers_nothing() {
        let mut impact = ImpactResult::new(Roll::new(1, 6, 0).unwrap(), edged(2));
        impact.evaluate(&mut ScriptedSource::new([6]));
        assert_eq!(impact.effective_impact().unwrap(), 0);
    }

    #[test]
    fn resolve_requires_classified_source() {
        let source = SuccessTestResult::new(50, Roll::new(1, 100, 0).unwrap());
        let mut impact = ImpactResult::new(Roll::new(1, 6, 0).unwrap(), edged(0));
        assert!(matches!(
            impact.resolve(&source),
            Err(MechError::NotEvaluated(_))
        ));
    }

    #[test]
    fn delivering_unrolled_impact_is_not_evaluated() {
        let source = attack(5);
        let mut impact = ImpactResult::new(Roll::new(1, 6, 0).unwrap(), edged(0));
        impact.resolve(&source).unwrap();
        assert!(matches!(
            impact.effective_impact(),
            Err(MechError::NotEvaluated(_))
        ));
    }

    #[test]
    fn impact_clamped_at_zero() {
        let source = attack(30);
        let modifier = ImpactModifier::new(ImpactAspect::Blunt).with(Modifier::new("Padding", -10));
        let mut impact = ImpactResult::new(Roll::from_faces(6, 0, vec![2]).unwrap(), modifier);
        impact.resolve(&source).unwrap();
        assert_eq!(impact.effective_impact().unwrap(), 0);
    }

    #[test]
    fn custom_delivering_set() {
        let source = attack(30);
        let mut impact = ImpactResult::new(Roll::from_faces(6, 0, vec![4]).unwrap(), edged(0))
            .with_delivering([OutcomeDegree::CriticalSuccess]);
        assert!(!impact.resolve(&source).unwrap());
        assert!(impact.resolve(&attack(5)).unwrap());
        assert_eq!(impact.effective_impact().unwrap(), 4);
    }

    #[test]
    fn display_and_snapshot() {
        let mut impact = ImpactResult::new(Roll::new(2, 6, 0).unwrap(), edged(3));
        insta::assert_snapshot!(impact.to_string(), @"Impact: no impact (2d6 (unrolled))");
        impact.resolve(&attack(30)).unwrap();
        insta::assert_snapshot!(impact.to_string(), @"Impact: edged (unrolled)");
        impact.evaluate(&mut ScriptedSource::new([4, 5]));
        insta::assert_snapshot!(impact.to_string(), @"Impact: 12 edged");

        let snap = impact.snapshot();
        assert!(snap.delivers_impact);
        assert_eq!(snap.effective_impact, Some(12));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["aspect"], "edged");
        assert_eq!(json["source_degree"], "marginal_success");
    }

    proptest! {
        #[test]
        fn no_delivery_means_zero(face in 51u32..=100, impact_face in 1u32..=20, bonus in -10i32..30) {
            let source = attack(face);
            let mut impact = ImpactResult::new(Roll::from_faces(20, 0, vec![impact_face]).unwrap(), edged(bonus));
            impact.resolve(&source).unwrap();
            prop_assert!(!impact.delivers_impact());
            prop_assert_eq!(impact.effective_impact().unwrap(), 0);
        }
    }
}
