//! Resolution engine for the Song of Heroic Lands rules family.
//!
//! Provides dice rolls with frozen totals, modifier stacks, d100 roll-under
//! success tests with four outcome degrees, impact results that deliver only
//! on success, an id-keyed result registry and an approval state machine for
//! AI-proposed plans. Rule variants plug in through [`SohlSystem`].

pub mod attack;
pub mod config;
pub mod dice;
pub mod error;
pub mod impact;
pub mod modifier;
pub mod plan;
pub mod registry;
pub mod resolution;
pub mod success;
pub mod system;

pub use attack::{AttackRequest, AttackResolution, resolve_attack};
pub use config::{MechanicsConfig, ThresholdOverrides};
pub use dice::{RandomSource, Roll, ScriptedSource};
pub use error::{MechError, MechResult};
pub use impact::{ImpactResult, ImpactSnapshot};
pub use modifier::{ImpactAspect, ImpactModifier, Modifier, ModifierStack};
pub use plan::{AiPlanProposal, AiPlannedAction, PlanId, PlanStatus};
pub use registry::{AnyResult, ResultKind, ResultRegistry};
pub use resolution::{OutcomeDegree, ThresholdConfig, classify};
pub use success::{ResultId, SuccessTestResult, SuccessTestSnapshot};
pub use system::{RollMode, SohlSystem, SpeakerContext, SpeakerParent, SystemDescriptor};
