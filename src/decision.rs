//! Reviewer-adjustable decisions over reconciliation results.
//!
//! Each `MatchResult` seeds one `EntityDecision` with safe defaults; a
//! `review` suggestion starts as `skip` so nothing is written unless a
//! human acts. The review UI patches decisions by index; updates are
//! copy-on-write per slot so other decisions are never aliased.

use serde::{Deserialize, Serialize};

use crate::types::{MatchKind, MatchResult, SuggestedAction};

/// The action the reviewer has selected for one mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Link,
    Create,
    Skip,
}

/// One mention's reviewer-controlled state, wrapping its match result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDecision {
    pub match_result: MatchResult,
    pub action: DecisionAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<String>,
    /// Name to use when creating; reviewers may correct the extracted form.
    pub new_name: String,
    pub update_title: bool,
    pub create_affiliation: bool,
}

impl EntityDecision {
    /// Seed a decision from a reconciliation result.
    pub fn from_result(match_result: MatchResult) -> Self {
        let action = match match_result.suggested_action {
            SuggestedAction::Link => DecisionAction::Link,
            SuggestedAction::Create => DecisionAction::Create,
            // Review needs a human; default to the non-destructive action.
            SuggestedAction::Review => DecisionAction::Skip,
        };
        EntityDecision {
            action,
            linked_id: match_result.verdict.existing_id.clone(),
            new_name: match_result.extracted_name.clone(),
            update_title: match_result.verdict.kind != MatchKind::New
                && match_result.title.is_some(),
            create_affiliation: match_result.organization.is_some(),
            match_result,
        }
    }
}

/// A partial update to one decision. Unset fields leave the current
/// value in place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPatch {
    pub action: Option<DecisionAction>,
    pub linked_id: Option<String>,
    pub new_name: Option<String>,
    pub update_title: Option<bool>,
    pub create_affiliation: Option<bool>,
}

/// The ordered decision list for one capture session.
///
/// Indexes line up with the reconciler's output order. There is no
/// cross-field validation here — a `link` without a `linked_id` or a
/// `create` with an empty name is representable, and the commit applier
/// degrades gracefully on both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecisionSet {
    decisions: Vec<EntityDecision>,
}

impl DecisionSet {
    pub fn from_results(results: Vec<MatchResult>) -> Self {
        DecisionSet {
            decisions: results.into_iter().map(EntityDecision::from_result).collect(),
        }
    }

    pub fn decisions(&self) -> &[EntityDecision] {
        &self.decisions
    }

    pub fn get(&self, index: usize) -> Option<&EntityDecision> {
        self.decisions.get(index)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Apply a partial update to the decision at `index`.
    ///
    /// The slot is replaced with an updated copy; every other decision
    /// is untouched. Returns false for an out-of-range index.
    pub fn apply(&mut self, index: usize, patch: DecisionPatch) -> bool {
        let Some(current) = self.decisions.get(index) else {
            return false;
        };
        let mut updated = current.clone();
        if let Some(action) = patch.action {
            updated.action = action;
        }
        if let Some(linked_id) = patch.linked_id {
            updated.linked_id = Some(linked_id);
        }
        if let Some(new_name) = patch.new_name {
            updated.new_name = new_name;
        }
        if let Some(update_title) = patch.update_title {
            updated.update_title = update_title;
        }
        if let Some(create_affiliation) = patch.create_affiliation {
            updated.create_affiliation = create_affiliation;
        }
        self.decisions[index] = updated;
        true
    }

    /// Consume the set for the commit applier.
    pub fn into_decisions(self) -> Vec<EntityDecision> {
        self.decisions
    }
}
