//! Batch reconciliation of extracted mentions against the workspace roster.
//!
//! For each non-topic mention the reconciler scans the matching roster
//! (people for person mentions, organizations for organization mentions)
//! and classifies the best candidate into confidence bands:
//!
//! - score >= 0.9 — exact match, suggest linking silently
//! - 0.6 <= score < 0.9 — partial match, surface for review
//! - below, or no candidate — new record; suggest creating only when the
//!   extraction itself was confident, otherwise ask for review
//!
//! The roster is an explicit read-only input, fetched fresh by the
//! caller per capture session. Output order mirrors input order (minus
//! filtered topics); the review UI indexes decisions by position.

use crate::matcher::{best_match, normalize, CandidateRecord};
use crate::types::{
    EntityKind, ExtractedEntity, MatchKind, MatchResult, MatchVerdict, SuggestedAction,
};

const SCORE_EXACT: f64 = 0.9;
const SCORE_PARTIAL: f64 = 0.6;

/// Extraction confidence required to suggest creating a record outright.
const CREATE_CONFIDENCE: f64 = 0.7;

/// Reconcile a batch of extracted mentions against the roster.
///
/// Topic mentions are dropped entirely — they carry no record to link
/// or create. Pure function; empty inputs yield empty output.
pub fn reconcile(
    entities: &[ExtractedEntity],
    people: &[CandidateRecord],
    organizations: &[CandidateRecord],
) -> Vec<MatchResult> {
    let mut results = Vec::with_capacity(entities.len());

    for entity in entities {
        let candidates = match entity.kind {
            EntityKind::Person => people,
            EntityKind::Organization => organizations,
            EntityKind::Topic => continue,
        };

        let (verdict, suggested_action) = match best_match(&entity.name, candidates) {
            Some(m) if m.score >= SCORE_EXACT => (
                MatchVerdict::linked(MatchKind::Exact, m.id, m.name, m.score),
                SuggestedAction::Link,
            ),
            Some(m) if m.score >= SCORE_PARTIAL => (
                MatchVerdict::linked(MatchKind::Partial, m.id, m.name, m.score),
                SuggestedAction::Review,
            ),
            _ => {
                let action = if entity.confidence >= CREATE_CONFIDENCE {
                    SuggestedAction::Create
                } else {
                    SuggestedAction::Review
                };
                (MatchVerdict::new_record(), action)
            }
        };

        // A person mentioned "at Acme Corp" links straight to the existing
        // organization when the name matches a roster record exactly.
        let organization_id = match entity.kind {
            EntityKind::Person => entity
                .organization
                .as_deref()
                .and_then(|name| find_organization_id(name, organizations)),
            _ => None,
        };

        results.push(MatchResult {
            kind: entity.kind,
            extracted_name: entity.name.clone(),
            context: entity.context.clone(),
            confidence: entity.confidence,
            title: entity.title.clone(),
            organization: entity.organization.clone(),
            organization_id,
            verdict,
            suggested_action,
        });
    }

    results
}

/// Exact normalized lookup of an organization name in the roster.
fn find_organization_id(name: &str, organizations: &[CandidateRecord]) -> Option<String> {
    let key = normalize(name);
    if key.is_empty() {
        return None;
    }
    organizations
        .iter()
        .find(|org| normalize(&org.name) == key)
        .map(|org| org.id.clone())
}
