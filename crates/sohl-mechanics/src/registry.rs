//! Id-keyed store of results.
//!
//! Results refer to the test that spawned them by [`ResultId`] only. The
//! registry resolves those links and walks chains back to their origin
//! without any result owning another.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::impact::ImpactResult;
use crate::success::{ResultId, SuccessTestResult};

/// Discriminant of a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// A [`SuccessTestResult`].
    SuccessTest,
    /// An [`ImpactResult`].
    Impact,
}

/// Any result the registry can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnyResult {
    /// A success test.
    SuccessTest(SuccessTestResult),
    /// An impact result.
    Impact(ImpactResult),
}

impl AnyResult {
    /// The result's identifier.
    pub fn id(&self) -> ResultId {
        match self {
            Self::SuccessTest(t) => t.id(),
            Self::Impact(i) => i.id(),
        }
    }

    /// The result's discriminant.
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::SuccessTest(_) => ResultKind::SuccessTest,
            Self::Impact(_) => ResultKind::Impact,
        }
    }

    /// The result this one was spawned by.
    pub fn prior_test_result(&self) -> Option<ResultId> {
        match self {
            Self::SuccessTest(t) => t.prior_test_result(),
            Self::Impact(i) => i.prior_test_result(),
        }
    }

    /// The success test view of this result.
    pub fn as_success_test(&self) -> &SuccessTestResult {
        match self {
            Self::SuccessTest(t) => t,
            Self::Impact(i) => i.as_success_test(),
        }
    }
}

impl From<SuccessTestResult> for AnyResult {
    fn from(test: SuccessTestResult) -> Self {
        Self::SuccessTest(test)
    }
}

impl From<ImpactResult> for AnyResult {
    fn from(impact: ImpactResult) -> Self {
        Self::Impact(impact)
    }
}

/// Results indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ResultRegistry {
    results: HashMap<ResultId, AnyResult>,
}

impl ResultRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing any previous one with the same id.
    pub fn insert(&mut self, result: impl Into<AnyResult>) -> ResultId {
        let result = result.into();
        let id = result.id();
        self.results.insert(id, result);
        id
    }

    /// Look up a result.
    pub fn get(&self, id: ResultId) -> Option<&AnyResult> {
        self.results.get(&id)
    }

    /// The result that spawned `id`, if both are stored.
    pub fn prior_of(&self, id: ResultId) -> Option<&AnyResult> {
        let prior = self.get(id)?.prior_test_result()?;
        self.get(prior)
    }

    /// The chain ending at `id`, origin first.
    ///
    /// Stops at a link to a result that is not stored, or at a repeated id.
    pub fn chain(&self, id: ResultId) -> Vec<&AnyResult> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                tracing::warn!(id = %current, "cycle in result chain");
                break;
            }
            let Some(result) = self.get(current) else {
                break;
            };
            chain.push(result);
            cursor = result.prior_test_result();
        }
        chain.reverse();
        chain
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
