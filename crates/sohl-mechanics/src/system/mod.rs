//! Rule variant descriptors.
//!
//! A [`SohlSystem`] is the seam through which a variant customizes
//! resolution: it supplies its identity, thresholds and delivering degrees,
//! and builds speaker contexts and result objects with its own defaults. The
//! resolution algorithm itself is shared. Descriptors are passed around as
//! strategy objects; there is no global registry of systems.

pub mod preset;

use serde::{Deserialize, Serialize};

use crate::dice::formula;
use crate::error::MechResult;
use crate::impact::{DEFAULT_DELIVERING, ImpactResult};
use crate::modifier::{ImpactModifier, ModifierStack};
use crate::resolution::{OutcomeDegree, ThresholdConfig};
use crate::success::SuccessTestResult;

/// Who may see a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    /// Everyone sees the roll.
    #[default]
    Public,
    /// Only the roller and the GM see the roll.
    GmOnly,
    /// Only the GM sees the roll; the roller does not.
    Blind,
    /// Only the roller sees the roll.
    SelfOnly,
}

impl RollMode {
    /// Parse a roll mode name.
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" | "publicroll" => Some(Self::Public),
            "gm" | "gm_only" | "gmroll" => Some(Self::GmOnly),
            "blind" | "blindroll" => Some(Self::Blind),
            "self" | "self_only" | "selfroll" => Some(Self::SelfOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for RollMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::GmOnly => write!(f, "gm_only"),
            Self::Blind => write!(f, "blind"),
            Self::SelfOnly => write!(f, "self_only"),
        }
    }
}

/// The host object a roll is made on behalf of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerParent {
    /// Display name of the actor or item.
    pub name: String,
    /// Host identifier of the actor, if any.
    pub actor_id: Option<String>,
    /// Host identifier of the token, if any.
    pub token_id: Option<String>,
}

impl SpeakerParent {
    /// A parent with only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Who is speaking a result and who may see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerContext {
    /// Name shown as the speaker.
    pub alias: String,
    /// Host identifier of the actor.
    pub actor_id: Option<String>,
    /// Host identifier of the token.
    pub token_id: Option<String>,
    /// Visibility of the roll.
    pub roll_mode: RollMode,
    /// Whether the result is whispered to the GM.
    pub whisper_gm: bool,
    /// Whether the roller is kept from seeing the result.
    pub blind: bool,
    /// The variant that produced this context.
    pub system_id: String,
}

/// Capability interface implemented per rule variant.
pub trait SohlSystem: Send + Sync {
    /// Stable identifier (e.g., "sohl", "legendary").
    fn id(&self) -> &str;

    /// Human-readable title.
    fn title(&self) -> &str;

    /// Classification thresholds for success tests.
    fn thresholds(&self) -> ThresholdConfig;

    /// Source degrees that deliver impact.
    fn delivering_degrees(&self) -> &[OutcomeDegree];

    /// Dice formula for success tests (e.g., "1d100").
    fn test_formula(&self) -> &str;

    /// Title given to success tests that are not named explicitly.
    fn default_test_title(&self) -> &str {
        "Success Test"
    }

    /// Chat card template identifier passed through to the host.
    fn chat_template(&self) -> &str;

    /// Build a speaker context for a parent and roll mode.
    fn speaker(&self, parent: &SpeakerParent, roll_mode: RollMode) -> SpeakerContext {
        SpeakerContext {
            alias: parent.name.clone(),
            actor_id: parent.actor_id.clone(),
            token_id: parent.token_id.clone(),
            roll_mode,
            whisper_gm: matches!(roll_mode, RollMode::GmOnly | RollMode::Blind),
            blind: roll_mode == RollMode::Blind,
            system_id: self.id().to_string(),
        }
    }

    /// Build an unrolled success test with this variant's defaults.
    fn success_test(&self, base_value: i32, modifiers: ModifierStack) -> MechResult<SuccessTestResult> {
        let roll = formula::parse(self.test_formula())?;
        Ok(SuccessTestResult::new(base_value, roll)
            .with_modifiers(modifiers)
            .with_thresholds(self.thresholds())
            .with_title(self.default_test_title())
            .with_chat_template(self.chat_template()))
    }

    /// Build an unresolved impact with this variant's delivering degrees.
    fn impact_result(
        &self,
        impact_formula: &str,
        impact_modifier: ImpactModifier,
    ) -> MechResult<ImpactResult> {
        let roll = formula::parse(impact_formula)?;
        Ok(ImpactResult::new(roll, impact_modifier)
            .with_delivering(self.delivering_degrees())
            .with_chat_template(self.chat_template()))
    }
}

/// A data-driven [`SohlSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDescriptor {
    /// Stable identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Classification thresholds.
    pub thresholds: ThresholdConfig,
    /// Source degrees that deliver impact.
    pub delivering: Vec<OutcomeDegree>,
    /// Dice formula for success tests.
    pub test_formula: String,
    /// Default success test title.
    pub default_test_title: String,
    /// Chat card template identifier.
    pub chat_template: String,
}

impl SystemDescriptor {
    /// A descriptor with the core defaults under a new id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thresholds: ThresholdConfig::default(),
            delivering: DEFAULT_DELIVERING.to_vec(),
            test_formula: "1d100".to_string(),
            default_test_title: "Success Test".to_string(),
            chat_template: "standard-test-card".to_string(),
        }
    }

    /// Replace the thresholds.
    pub fn with_thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replace the delivering degrees.
    pub fn with_delivering(mut self, degrees: impl Into<Vec<OutcomeDegree>>) -> Self {
        self.delivering = degrees.into();
        self
    }

    /// Replace the success test formula.
    pub fn with_test_formula(mut self, formula: impl Into<String>) -> Self {
        self.test_formula = formula.into();
        self
    }

    /// Replace the chat template.
    pub fn with_chat_template(mut self, template: impl Into<String>) -> Self {
        self.chat_template = template.into();
        self
    }
}

impl SohlSystem for SystemDescriptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn thresholds(&self) -> ThresholdConfig {
        self.thresholds
    }

    fn delivering_degrees(&self) -> &[OutcomeDegree] {
        &self.delivering
    }

    fn test_formula(&self) -> &str {
        &self.test_formula
    }

    fn default_test_title(&self) -> &str {
        &self.default_test_title
    }

    fn chat_template(&self) -> &str {
        &self.chat_template
    }
}
