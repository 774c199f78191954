//! Shared domain types for extraction, matching, and review.
//!
//! Everything here crosses the boundary to the review UI, so the serde
//! representation mirrors the JSON the frontend consumes (camelCase,
//! lowercase tag strings).

use serde::{Deserialize, Serialize};

/// Kind of entity surfaced by text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Organization,
    Topic,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Organization => "organization",
            EntityKind::Topic => "topic",
        }
    }
}

/// A single entity mention extracted from free text.
///
/// Produced by the extraction collaborator and immutable from there on.
/// Partial names (e.g. just "John") arrive with lower confidence and a
/// list of possible full-name expansions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub context: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,
    /// Role or job title mentioned alongside the name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Organization the person was mentioned in association with, if any.
    /// Only meaningful for person mentions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Classification of how a mention relates to the existing roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// High-confidence match to an existing record.
    Exact,
    /// Plausible but uncertain match; needs human review.
    Partial,
    /// No existing record cleared the matching floor.
    New,
}

/// Default action the reconciler proposes for a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedAction {
    Link,
    Create,
    Review,
}

/// The reconciler's verdict for one mention.
///
/// `existing_id`/`existing_name` are present exactly when the kind is
/// `Exact` or `Partial`; `score` is 0.0 for `New`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchVerdict {
    #[serde(rename = "type")]
    pub kind: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_name: Option<String>,
    pub score: f64,
}

impl MatchVerdict {
    /// Verdict for a mention with no usable roster match.
    pub fn new_record() -> Self {
        MatchVerdict {
            kind: MatchKind::New,
            existing_id: None,
            existing_name: None,
            score: 0.0,
        }
    }

    pub(crate) fn linked(kind: MatchKind, id: String, name: String, score: f64) -> Self {
        MatchVerdict {
            kind,
            existing_id: Some(id),
            existing_name: Some(name),
            score,
        }
    }
}

/// One reconciled mention, ready for reviewer inspection.
///
/// Order in the output list mirrors the extraction input order (minus
/// filtered topics); the review UI indexes decisions by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub extracted_name: String,
    #[serde(default)]
    pub context: String,
    pub confidence: f64,
    /// Title carried over from extraction (drives the update-title option).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Associated organization name carried over from extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Existing organization id when `organization` names a known record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(rename = "match")]
    pub verdict: MatchVerdict,
    pub suggested_action: SuggestedAction,
}
