//! AI plan proposals and their approval state machine.
//!
//! An automated agent proposes an ordered list of actions. A human approver
//! then approves, rejects or asks for a revision of the whole list:
//!
//! ```text
//! pending ──approve──▶ approved
//!    │    ──reject───▶ rejected
//!    └────revise─────▶ revised ──(new proposal)──▶ pending
//! ```
//!
//! Every state but `pending` is terminal for the proposal object. A revision
//! continues as a new proposal with a new id; the action list of an existing
//! proposal never changes.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MechError, MechResult};

/// Unique identifier for a plan proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub String);

impl PlanId {
    /// Generate a new random plan ID.
    pub fn new() -> Self {
        Self(format!("plan-{}", Uuid::new_v4()))
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Approval status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Cleared for execution.
    Approved,
    /// Turned down (or cancelled).
    Rejected,
    /// Sent back for a new proposal.
    Revised,
}

impl PlanStatus {
    /// Returns true if no further transition is allowed.
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Revised => write!(f, "revised"),
        }
    }
}

/// One step of a proposed plan. Opaque to the approval machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlannedAction {
    /// Action type understood by the executor (e.g., "move_token").
    pub kind: String,
    /// Human-readable description for the approver.
    pub description: String,
    /// Executor-specific parameters.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl AiPlannedAction {
    /// Create an action with an empty payload.
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Attach executor parameters.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A proposed ordered sequence of actions awaiting approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlanProposal {
    plan_id: PlanId,
    summary: String,
    actions: Vec<AiPlannedAction>,
    #[serde(default)]
    assumptions: BTreeSet<String>,
    status: PlanStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    reviewer_note: Option<String>,
    #[serde(default)]
    supersedes: Option<PlanId>,
}

impl AiPlanProposal {
    /// Create a pending proposal.
    pub fn new(summary: impl Into<String>, actions: Vec<AiPlannedAction>) -> Self {
        Self {
            plan_id: PlanId::new(),
            summary: summary.into(),
            actions,
            assumptions: BTreeSet::new(),
            status: PlanStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
            reviewer_note: None,
            supersedes: None,
        }
    }

    /// Record an assumption the agent made while planning.
    pub fn with_assumption(mut self, assumption: impl Into<String>) -> Self {
        self.assumptions.insert(assumption.into());
        self
    }

    /// Read a proposal from a JSON file.
    pub fn load(path: &Path) -> MechResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MechError::Storage(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| {
            MechError::Storage(format!("malformed proposal {}: {e}", path.display()))
        })
    }

    /// Write the proposal to a JSON file.
    pub fn save(&self, path: &Path) -> MechResult<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| MechError::Storage(format!("cannot encode proposal: {e}")))?;
        std::fs::write(path, text)
            .map_err(|e| MechError::Storage(format!("cannot write {}: {e}", path.display())))
    }

    /// Approve the whole action list.
    pub fn approve(&mut self, note: Option<String>) -> MechResult<()> {
        self.transition(PlanStatus::Approved, note)
    }

    /// Reject the proposal.
    pub fn reject(&mut self, reason: Option<String>) -> MechResult<()> {
        self.transition(PlanStatus::Rejected, reason)
    }

    /// Ask for a revision. The proposal itself becomes terminal.
    pub fn request_revision(&mut self, note: Option<String>) -> MechResult<()> {
        self.transition(PlanStatus::Revised, note)
    }

    /// Cancel a pending proposal (recorded as rejected).
    pub fn cancel(&mut self) -> MechResult<()> {
        self.transition(PlanStatus::Rejected, Some("cancelled".to_string()))
    }

    /// Create the follow-up proposal for a revised one.
    ///
    /// Only a `revised` proposal can be superseded. Assumptions carry over.
    pub fn revise(
        &self,
        summary: impl Into<String>,
        actions: Vec<AiPlannedAction>,
    ) -> MechResult<Self> {
        if self.status != PlanStatus::Revised {
            return Err(MechError::InvalidTransition {
                from: self.status,
                to: PlanStatus::Pending,
            });
        }
        let mut next = Self::new(summary, actions);
        next.assumptions = self.assumptions.clone();
        next.supersedes = Some(self.plan_id.clone());
        tracing::info!(plan = %next.plan_id, supersedes = %self.plan_id, "plan revised");
        Ok(next)
    }

    fn transition(&mut self, to: PlanStatus, note: Option<String>) -> MechResult<()> {
        if self.status.is_terminal() {
            tracing::warn!(plan = %self.plan_id, from = %self.status, to = %to, "transition refused");
            return Err(MechError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.decided_at = Some(Utc::now());
        self.reviewer_note = note;
        tracing::info!(plan = %self.plan_id, status = %to, "plan decided");
        Ok(())
    }

    /// Proposal identifier.
    pub fn plan_id(&self) -> &PlanId {
        &self.plan_id
    }

    /// Agent's summary of the plan.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The proposed actions, in order.
    pub fn actions(&self) -> &[AiPlannedAction] {
        &self.actions
    }

    /// Assumptions the agent made.
    pub fn assumptions(&self) -> &BTreeSet<String> {
        &self.assumptions
    }

    /// Current status.
    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// Returns true if the actions may proceed to execution.
    pub fn is_executable(&self) -> bool {
        self.status == PlanStatus::Approved
    }

    /// When the proposal was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the decision was made.
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Approver's note or rejection reason.
    pub fn reviewer_note(&self) -> Option<&str> {
        self.reviewer_note.as_deref()
    }

    /// The proposal this one replaces.
    pub fn supersedes(&self) -> Option<&PlanId> {
        self.supersedes.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn proposal() -> AiPlanProposal {
        AiPlanProposal::new(
            "Ambush the caravan",
            vec![
                AiPlannedAction::new("move_token", "Move bandits behind the ridge"),
                AiPlannedAction::new("attack", "Archers loose on the lead wagon")
                    .with_payload(serde_json::json!({ "targets": ["wagon-1"] })),
            ],
        )
        .with_assumption("Caravan guards are unaware")
    }

    #[derive(Debug, Clone, Copy)]
    enum Decision {
        Approve,
        Reject,
        Revise,
        Cancel,
    }

    fn apply(plan: &mut AiPlanProposal, d: Decision) -> MechResult<()> {
        match d {
            Decision::Approve => plan.approve(None),
            Decision::Reject => plan.reject(None),
            Decision::Revise => plan.request_revision(None),
            Decision::Cancel => plan.cancel(),
        }
    }

    #[test]
    fn created_pending() {
        let plan = proposal();
        assert_eq!(plan.status(), PlanStatus::Pending);
        assert_eq!(plan.actions().len(), 2);
        assert!(plan.plan_id().0.starts_with("plan-"));
        assert!(!plan.is_executable());
        assert!(plan.decided_at().is_none());
    }

    #[test]
    fn approve_makes_executable() {
        let mut plan = proposal();
        plan.approve(Some("go".to_string())).unwrap();
        assert!(plan.is_executable());
        assert_eq!(plan.reviewer_note(), Some("go"));
        assert!(plan.decided_at().is_some());
    }

    #[test]
    fn revised_then_approve_fails() {
        let mut plan = proposal();
        plan.request_revision(Some("too risky".to_string())).unwrap();
        assert_eq!(plan.status(), PlanStatus::Revised);
        let err = plan.approve(None).unwrap_err();
        assert!(matches!(
            err,
            MechError::InvalidTransition {
                from: PlanStatus::Revised,
                to: PlanStatus::Approved
            }
        ));
        assert_eq!(err.to_string(), "invalid transition: revised -> approved");
    }

    #[test]
    fn cancel_is_rejection() {
        let mut plan = proposal();
        plan.cancel().unwrap();
        assert_eq!(plan.status(), PlanStatus::Rejected);
        assert_eq!(plan.reviewer_note(), Some("cancelled"));
        assert!(plan.cancel().is_err());
    }

    #[test]
    fn revise_creates_new_pending_proposal() {
        let mut plan = proposal();
        plan.request_revision(None).unwrap();
        let trimmed = plan.actions()[..1].to_vec();
        let next = plan.revise("Ambush, no archers", trimmed).unwrap();
        assert_eq!(next.status(), PlanStatus::Pending);
        assert_ne!(next.plan_id(), plan.plan_id());
        assert_eq!(next.supersedes(), Some(plan.plan_id()));
        assert_eq!(next.actions().len(), 1);
        assert_eq!(next.assumptions(), plan.assumptions());
        assert_eq!(plan.actions().len(), 2);
    }

    #[test]
    fn revise_requires_revised_status() {
        let plan = proposal();
        assert!(matches!(
            plan.revise("x", Vec::new()),
            Err(MechError::InvalidTransition { .. })
        ));
        let mut approved = proposal();
        approved.approve(None).unwrap();
        assert!(approved.revise("x", Vec::new()).is_err());
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        let mut plan = proposal();
        plan.reject(Some("not tonight".to_string())).unwrap();
        plan.save(&path).unwrap();
        let loaded = AiPlanProposal::load(&path).unwrap();
        assert_eq!(loaded, plan);
    }

    #[test]
    fn load_reports_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AiPlanProposal::load(&path),
            Err(MechError::Storage(_))
        ));
    }

    fn decision() -> impl Strategy<Value = Decision> {
        prop_oneof![
            Just(Decision::Approve),
            Just(Decision::Reject),
            Just(Decision::Revise),
            Just(Decision::Cancel),
        ]
    }

    proptest! {
        #[test]
        fn only_first_transition_succeeds(first in decision(), rest in proptest::collection::vec(decision(), 1..5)) {
            let mut plan = proposal();
            prop_assert!(apply(&mut plan, first).is_ok());
            let settled = plan.status();
            prop_assert!(settled.is_terminal());
            for d in rest {
                let is_invalid_transition =
                    matches!(apply(&mut plan, d), Err(MechError::InvalidTransition { .. }));
                prop_assert!(is_invalid_transition);
                prop_assert_eq!(plan.status(), settled);
            }
        }
    }
}
