//! Success tests: a capability value, a modifier stack and a roll.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dice::{RandomSource, Roll};
use crate::error::{MechError, MechResult};
use crate::modifier::{Modifier, ModifierStack};
use crate::resolution::{self, OutcomeDegree, ThresholdConfig};

/// Unique identifier for a test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultId(pub Uuid);

impl ResultId {
    /// Generate a new random result ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A roll against a target derived from a base value and modifiers.
///
/// The outcome degree is never stored: it is recomputed from the frozen roll
/// total and the target every time it is asked for. Modifiers can only change
/// until the roll is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessTestResult {
    id: ResultId,
    title: String,
    base_value: i32,
    modifiers: ModifierStack,
    thresholds: ThresholdConfig,
    roll: Roll,
    prior_test_result: Option<ResultId>,
    #[serde(default)]
    chat_template: Option<String>,
}

impl SuccessTestResult {
    /// Create a test of `base_value` with an empty modifier stack.
    pub fn new(base_value: i32, roll: Roll) -> Self {
        Self {
            id: ResultId::new(),
            title: "Success Test".to_string(),
            base_value,
            modifiers: ModifierStack::new(),
            thresholds: ThresholdConfig::default(),
            roll,
            prior_test_result: None,
            chat_template: None,
        }
    }

    /// Replace the modifier stack.
    pub fn with_modifiers(mut self, modifiers: ModifierStack) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the classification thresholds.
    pub fn with_thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the chat card template the host renders this result with.
    pub fn with_chat_template(mut self, template: impl Into<String>) -> Self {
        self.chat_template = Some(template.into());
        self
    }

    /// Link this test to the test that spawned it.
    ///
    /// Neither test's roll nor classification changes.
    pub fn with_prior_result(mut self, prior: &SuccessTestResult) -> Self {
        self.prior_test_result = Some(prior.id);
        self
    }

    pub(crate) fn set_prior_result(&mut self, prior: ResultId) {
        self.prior_test_result = Some(prior);
    }

    pub(crate) fn roll_mut(&mut self) -> &mut Roll {
        &mut self.roll
    }

    /// This result's identifier.
    pub fn id(&self) -> ResultId {
        self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The unmodified capability value.
    pub fn base_value(&self) -> i32 {
        self.base_value
    }

    /// The modifier stack.
    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }

    /// The classification thresholds.
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// The test roll.
    pub fn roll(&self) -> &Roll {
        &self.roll
    }

    /// The test that spawned this one, if any.
    pub fn prior_test_result(&self) -> Option<ResultId> {
        self.prior_test_result
    }

    /// Chat card template, when built by a rule variant.
    pub fn chat_template(&self) -> Option<&str> {
        self.chat_template.as_deref()
    }

    /// Mutable access to the modifier stack, refused once rolled.
    pub fn modifiers_mut(&mut self) -> MechResult<&mut ModifierStack> {
        if self.roll.is_evaluated() {
            return Err(MechError::ResolutionFrozen(format!(
                "{} has already been rolled",
                self.title
            )));
        }
        Ok(&mut self.modifiers)
    }

    /// Append a modifier, refused once rolled.
    pub fn add_modifier(&mut self, modifier: Modifier) -> MechResult<()> {
        self.modifiers_mut()?.push(modifier);
        Ok(())
    }

    /// `base_value + effective(modifiers)`, clamped by the thresholds.
    pub fn target_value(&self) -> i32 {
        let raw = self.base_value.saturating_add(self.modifiers.effective());
        self.thresholds.clamp_target(raw)
    }

    /// Evaluate the roll (if not already) and classify it.
    pub fn evaluate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> OutcomeDegree {
        let total = self.roll.evaluate(rng);
        let degree = self.classify_total(total);
        tracing::debug!(
            id = %self.id,
            title = %self.title,
            total,
            target = self.target_value(),
            degree = %degree,
            "success test classified"
        );
        degree
    }

    /// Classify the evaluated roll against the target.
    pub fn classify(&self) -> MechResult<OutcomeDegree> {
        let total = self.roll.total()?;
        Ok(self.classify_total(total))
    }

    /// Classify an arbitrary roll total against this test's target.
    pub fn classify_total(&self, total: i32) -> OutcomeDegree {
        resolution::classify(total, self.target_value(), &self.thresholds)
    }

    /// Returns true if the evaluated roll is a success.
    pub fn is_success(&self) -> MechResult<bool> {
        Ok(self.classify()?.is_success())
    }

    /// Numeric success level of the evaluated roll, 0 (CF) through 3 (CS).
    pub fn success_level(&self) -> MechResult<u8> {
        Ok(self.classify()?.success_level())
    }

    /// A one-line summary such as `Sword: Marginal Success (6 vs 12)`.
    pub fn description(&self) -> String {
        match self.roll.total() {
            Ok(total) => format!(
                "{}: {} ({total} vs {})",
                self.title,
                self.classify_total(total),
                self.target_value()
            ),
            Err(_) => format!("{}: unrolled (target {})", self.title, self.target_value()),
        }
    }

    /// A serializable view including the derived fields.
    pub fn snapshot(&self) -> SuccessTestSnapshot {
        SuccessTestSnapshot {
            id: self.id,
            title: self.title.clone(),
            base_value: self.base_value,
            modifiers: self.modifiers.clone(),
            effective_modifier: self.modifiers.effective(),
            target_value: self.target_value(),
            roll: self.roll.clone(),
            outcome_degree: self.classify().ok(),
            success_level: self.success_level().ok(),
            prior_test_result: self.prior_test_result,
            chat_template: self.chat_template.clone(),
        }
    }
}

impl std::fmt::Display for SuccessTestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Persistence and UI view of a [`SuccessTestResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessTestSnapshot {
    /// Result identifier.
    pub id: ResultId,
    /// Display title.
    pub title: String,
    /// Unmodified capability value.
    pub base_value: i32,
    /// All modifiers, enabled or not.
    pub modifiers: ModifierStack,
    /// Sum of the enabled modifiers.
    pub effective_modifier: i32,
    /// Derived, clamped target.
    pub target_value: i32,
    /// The test roll.
    pub roll: Roll,
    /// Classification, absent until rolled.
    pub outcome_degree: Option<OutcomeDegree>,
    /// Success level 0 (CF) through 3 (CS), absent until rolled.
    pub success_level: Option<u8>,
    /// The test that spawned this one.
    pub prior_test_result: Option<ResultId>,
    /// Chat card template for the host.
    pub chat_template: Option<String>,
}
