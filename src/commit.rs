//! Two-pass application of accepted decisions.
//!
//! Pass 1 creates the organizations the reviewer accepted, recording a
//! name -> id map. Pass 2 processes people — linking or creating, with
//! optional title updates and affiliation creation — and can therefore
//! resolve affiliations against organizations pass 1 just created. The
//! passes must stay in this order and are issued sequentially.
//!
//! The commit is deliberately not one transaction: each record's writes
//! stand alone, failures are collected per decision and surfaced to the
//! reviewer, and retrying the commit is the recovery path. Affiliation
//! creation is guarded by an existence check and stays idempotent across
//! retries; person and organization creation is not.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{DbAffiliation, DbError, DbInteraction, DbOrganization, DbPerson, WorkspaceDb};
use crate::decision::{DecisionAction, EntityDecision};
use crate::types::{EntityKind, MatchResult};

/// Fallback interaction title when the extractor produced no summary.
const DEFAULT_TITLE: &str = "Captured note";

/// Interaction titles are clipped to this many chars.
const TITLE_MAX_CHARS: usize = 100;

/// The interaction the commit records alongside the entity writes.
#[derive(Debug, Clone)]
pub struct InteractionDraft {
    pub workspace_id: String,
    pub raw_text: String,
    pub summary: String,
    /// Defaults to now when unset.
    pub occurred_at: Option<String>,
    /// "meeting" | "call" | "email" | "conference" | "note"
    pub interaction_type: String,
    pub created_by: Option<String>,
}

impl InteractionDraft {
    /// Draft for a manually captured note.
    pub fn note(workspace_id: &str, raw_text: &str, summary: &str) -> Self {
        InteractionDraft {
            workspace_id: workspace_id.to_string(),
            raw_text: raw_text.to_string(),
            summary: summary.to_string(),
            occurred_at: None,
            interaction_type: "note".to_string(),
            created_by: None,
        }
    }
}

/// A per-decision failure captured during commit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitFailure {
    /// Index into the decision list.
    pub index: usize,
    pub extracted_name: String,
    pub reason: String,
}

/// What the commit produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub interaction_id: String,
    /// Person ids linked to the interaction, in decision order.
    pub participant_ids: Vec<String>,
    /// Per-decision failures; empty on a clean commit.
    pub failures: Vec<CommitFailure>,
}

/// Apply the reviewer's decisions and record the interaction.
///
/// Skipped decisions are ignored entirely. Per-record persistence
/// failures abort only that record's sub-steps and are collected into
/// the outcome; only the final interaction insert is a hard error.
pub fn apply_decisions(
    db: &WorkspaceDb,
    draft: &InteractionDraft,
    decisions: &[EntityDecision],
) -> Result<CommitOutcome, DbError> {
    let mut failures: Vec<CommitFailure> = Vec::new();

    // Pass 1: create accepted organizations so pass 2 can link to them.
    let created_org_ids = create_organizations(db, draft, decisions, &mut failures);

    // Pass 2: people — link or create, title updates, affiliations.
    let participants = process_people(db, draft, decisions, &created_org_ids, &mut failures);

    // Finalization: one interaction, then participant links.
    let now = Utc::now().to_rfc3339();
    let interaction = DbInteraction {
        id: Uuid::new_v4().to_string(),
        workspace_id: draft.workspace_id.clone(),
        occurred_at: draft.occurred_at.clone().unwrap_or_else(|| now.clone()),
        interaction_type: draft.interaction_type.clone(),
        title: Some(interaction_title(&draft.summary)),
        summary: non_empty(&draft.summary),
        raw_text: non_empty(&draft.raw_text),
        source: "manual".to_string(),
        created_by: draft.created_by.clone(),
        created_at: now.clone(),
        updated_at: now,
    };
    db.insert_interaction(&interaction)?;

    let mut participant_ids = Vec::with_capacity(participants.len());
    for (index, person_id, name) in participants {
        match db.add_interaction_participant(&interaction.id, &person_id) {
            Ok(()) => participant_ids.push(person_id),
            Err(e) => {
                log::warn!("Failed to link participant '{}': {}", name, e);
                failures.push(CommitFailure {
                    index,
                    extracted_name: name,
                    reason: format!("participant link failed: {}", e),
                });
            }
        }
    }

    log::info!(
        "Committed interaction {} with {} participants ({} failures)",
        interaction.id,
        participant_ids.len(),
        failures.len(),
    );

    Ok(CommitOutcome {
        interaction_id: interaction.id,
        participant_ids,
        failures,
    })
}

/// Pass 1: insert every accepted new organization.
///
/// Returns lower-cased extracted name -> new organization id, the map
/// pass 2 resolves affiliations through.
fn create_organizations(
    db: &WorkspaceDb,
    draft: &InteractionDraft,
    decisions: &[EntityDecision],
    failures: &mut Vec<CommitFailure>,
) -> HashMap<String, String> {
    let mut created: HashMap<String, String> = HashMap::new();

    for (index, decision) in decisions.iter().enumerate() {
        if decision.action != DecisionAction::Create
            || decision.match_result.kind != EntityKind::Organization
        {
            continue;
        }
        let result = &decision.match_result;
        let Some(name) = usable_name(decision) else {
            log::debug!(
                "Create decision for organization '{}' has no usable name; skipping",
                result.extracted_name
            );
            continue;
        };

        let now = Utc::now().to_rfc3339();
        let org = DbOrganization {
            id: Uuid::new_v4().to_string(),
            workspace_id: draft.workspace_id.clone(),
            name,
            domain: None,
            industry: None,
            notes: Some(auto_created_note(result)),
            created_at: now.clone(),
            updated_at: now,
        };
        match db.insert_organization(&org) {
            Ok(()) => {
                created.insert(result.extracted_name.to_lowercase(), org.id);
            }
            Err(e) => {
                log::warn!("Failed to create organization '{}': {}", org.name, e);
                failures.push(CommitFailure {
                    index,
                    extracted_name: result.extracted_name.clone(),
                    reason: format!("organization create failed: {}", e),
                });
            }
        }
    }

    created
}

/// Pass 2: link or create each accepted person, apply title updates,
/// and create missing affiliations.
///
/// Returns `(decision index, person id, extracted name)` triples for
/// participant linking.
fn process_people(
    db: &WorkspaceDb,
    draft: &InteractionDraft,
    decisions: &[EntityDecision],
    created_org_ids: &HashMap<String, String>,
    failures: &mut Vec<CommitFailure>,
) -> Vec<(usize, String, String)> {
    let mut participants: Vec<(usize, String, String)> = Vec::new();

    for (index, decision) in decisions.iter().enumerate() {
        if decision.action == DecisionAction::Skip
            || decision.match_result.kind != EntityKind::Person
        {
            continue;
        }
        let result = &decision.match_result;

        let person_id: Option<String> = match decision.action {
            DecisionAction::Link => match &decision.linked_id {
                Some(linked_id) => {
                    if decision.update_title {
                        if let Some(title) = &result.title {
                            if let Err(e) = db.update_person_title(linked_id, title) {
                                log::warn!(
                                    "Failed to update title for '{}': {}",
                                    result.extracted_name,
                                    e
                                );
                                failures.push(CommitFailure {
                                    index,
                                    extracted_name: result.extracted_name.clone(),
                                    reason: format!("title update failed: {}", e),
                                });
                            }
                        }
                    }
                    Some(linked_id.clone())
                }
                None => {
                    // Nothing usable to link against.
                    log::debug!(
                        "Link decision for '{}' has no linked id; skipping",
                        result.extracted_name
                    );
                    None
                }
            },
            DecisionAction::Create => match usable_name(decision) {
                Some(name) => {
                    let now = Utc::now().to_rfc3339();
                    let person = DbPerson {
                        id: Uuid::new_v4().to_string(),
                        workspace_id: draft.workspace_id.clone(),
                        full_name: name,
                        primary_email: None,
                        phone: None,
                        title: result.title.clone(),
                        headline: None,
                        notes: Some(auto_created_note(result)),
                        created_at: now.clone(),
                        updated_at: now,
                    };
                    match db.insert_person(&person) {
                        Ok(()) => Some(person.id),
                        Err(e) => {
                            log::warn!(
                                "Failed to create person '{}': {}",
                                person.full_name,
                                e
                            );
                            failures.push(CommitFailure {
                                index,
                                extracted_name: result.extracted_name.clone(),
                                reason: format!("person create failed: {}", e),
                            });
                            None
                        }
                    }
                }
                None => {
                    log::debug!(
                        "Create decision for person '{}' has no usable name; skipping",
                        result.extracted_name
                    );
                    None
                }
            },
            DecisionAction::Skip => None,
        };

        let Some(person_id) = person_id else {
            continue;
        };
        participants.push((index, person_id.clone(), result.extracted_name.clone()));

        if decision.create_affiliation {
            if let Err(e) = ensure_affiliation(db, draft, result, &person_id, created_org_ids) {
                log::warn!(
                    "Failed to create affiliation for '{}': {}",
                    result.extracted_name,
                    e
                );
                failures.push(CommitFailure {
                    index,
                    extracted_name: result.extracted_name.clone(),
                    reason: format!("affiliation create failed: {}", e),
                });
            }
        }
    }

    participants
}

/// Create the person's organization affiliation unless one already
/// exists for the pair.
///
/// The organization id resolves from the match itself when the mention
/// named a known organization, otherwise from the pass-1 map of newly
/// created organizations. Unresolvable associations are skipped, not
/// errors — the reviewer may have skipped the organization mention.
fn ensure_affiliation(
    db: &WorkspaceDb,
    draft: &InteractionDraft,
    result: &MatchResult,
    person_id: &str,
    created_org_ids: &HashMap<String, String>,
) -> Result<(), DbError> {
    let Some(org_name) = result.organization.as_deref() else {
        return Ok(());
    };

    let organization_id = result
        .organization_id
        .clone()
        .or_else(|| created_org_ids.get(&org_name.to_lowercase()).cloned());
    let Some(organization_id) = organization_id else {
        log::debug!(
            "No organization record for '{}'; affiliation skipped",
            org_name
        );
        return Ok(());
    };

    if db.affiliation_exists(person_id, &organization_id)? {
        return Ok(());
    }

    db.insert_affiliation(&DbAffiliation {
        id: Uuid::new_v4().to_string(),
        workspace_id: draft.workspace_id.clone(),
        person_id: person_id.to_string(),
        organization_id,
        role_title: result.title.clone(),
        start_date: None,
        end_date: None,
        is_primary: true,
        created_at: Utc::now().to_rfc3339(),
    })
}

/// The reviewer's name override, falling back to the extracted name.
/// `None` when both are blank.
fn usable_name(decision: &EntityDecision) -> Option<String> {
    let override_name = decision.new_name.trim();
    if !override_name.is_empty() {
        return Some(override_name.to_string());
    }
    let extracted = decision.match_result.extracted_name.trim();
    if !extracted.is_empty() {
        return Some(extracted.to_string());
    }
    None
}

fn auto_created_note(result: &MatchResult) -> String {
    format!(
        "Auto-created from interaction. Context: {}",
        result.context
    )
}

fn interaction_title(summary: &str) -> String {
    let trimmed = summary.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    trimmed.chars().take(TITLE_MAX_CHARS).collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::open_test_db;
    use crate::decision::DecisionSet;
    use crate::types::{MatchKind, MatchVerdict, SuggestedAction};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn result(kind: EntityKind, name: &str) -> MatchResult {
        MatchResult {
            kind,
            extracted_name: name.to_string(),
            context: "from the captured note".to_string(),
            confidence: 0.9,
            title: None,
            organization: None,
            organization_id: None,
            verdict: MatchVerdict::new_record(),
            suggested_action: SuggestedAction::Create,
        }
    }

    fn linked_result(kind: EntityKind, name: &str, existing_id: &str) -> MatchResult {
        let mut r = result(kind, name);
        r.verdict = MatchVerdict {
            kind: MatchKind::Exact,
            existing_id: Some(existing_id.to_string()),
            existing_name: Some(name.to_string()),
            score: 1.0,
        };
        r.suggested_action = SuggestedAction::Link;
        r
    }

    fn draft() -> InteractionDraft {
        InteractionDraft::note(
            "ws1",
            "Met Alice from Beta LLC about the rollout.",
            "Rollout sync with Alice.",
        )
    }

    fn seed_person(db: &WorkspaceDb, id: &str, name: &str, title: Option<&str>) {
        db.insert_person(&DbPerson {
            id: id.to_string(),
            workspace_id: "ws1".to_string(),
            full_name: name.to_string(),
            primary_email: None,
            phone: None,
            title: title.map(String::from),
            headline: None,
            notes: None,
            created_at: "2026-08-01T00:00:00Z".to_string(),
            updated_at: "2026-08-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    fn seed_org(db: &WorkspaceDb, id: &str, name: &str) {
        db.insert_organization(&DbOrganization {
            id: id.to_string(),
            workspace_id: "ws1".to_string(),
            name: name.to_string(),
            domain: None,
            industry: None,
            notes: None,
            created_at: "2026-08-01T00:00:00Z".to_string(),
            updated_at: "2026-08-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn test_new_org_then_affiliated_person() {
        init_logging();
        let (_dir, db) = open_test_db();

        // An organization decision and a person affiliated with it, with
        // no pre-existing organization record: the person's affiliation
        // must resolve to the organization created in pass 1.
        let mut person = result(EntityKind::Person, "Alice Chen");
        person.organization = Some("Beta LLC".to_string());
        person.title = Some("VP Engineering".to_string());

        let decisions = DecisionSet::from_results(vec![
            result(EntityKind::Organization, "Beta LLC"),
            person,
        ])
        .into_decisions();

        let outcome = apply_decisions(&db, &draft(), &decisions).unwrap();
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.participant_ids.len(), 1);

        let orgs = db.list_organizations("ws1").unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "Beta LLC");
        assert!(orgs[0].notes.as_deref().unwrap().starts_with("Auto-created"));

        let people = db.list_people("ws1").unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].full_name, "Alice Chen");
        assert_eq!(people[0].title.as_deref(), Some("VP Engineering"));

        let affiliations = db.list_affiliations_for_person(&people[0].id).unwrap();
        assert_eq!(affiliations.len(), 1);
        assert_eq!(affiliations[0].organization_id, orgs[0].id);
        assert_eq!(affiliations[0].role_title.as_deref(), Some("VP Engineering"));
        assert!(affiliations[0].is_primary);
    }

    #[test]
    fn test_affiliation_is_idempotent_across_commits() {
        init_logging();
        let (_dir, db) = open_test_db();
        seed_person(&db, "p1", "Alice Chen", None);
        seed_org(&db, "o1", "Acme Corp");

        let mut person = linked_result(EntityKind::Person, "Alice Chen", "p1");
        person.organization = Some("Acme Corp".to_string());
        person.organization_id = Some("o1".to_string());

        let decisions = DecisionSet::from_results(vec![person]).into_decisions();

        let first = apply_decisions(&db, &draft(), &decisions).unwrap();
        assert!(first.failures.is_empty());
        let second = apply_decisions(&db, &draft(), &decisions).unwrap();
        assert!(second.failures.is_empty());

        // Two interactions, one affiliation row.
        assert_ne!(first.interaction_id, second.interaction_id);
        assert_eq!(db.list_affiliations_for_person("p1").unwrap().len(), 1);
    }

    #[test]
    fn test_skip_decisions_write_nothing() {
        init_logging();
        let (_dir, db) = open_test_db();

        let mut decisions = DecisionSet::from_results(vec![
            result(EntityKind::Organization, "Beta LLC"),
            result(EntityKind::Person, "Alice Chen"),
        ]);
        decisions.apply(
            0,
            crate::decision::DecisionPatch {
                action: Some(DecisionAction::Skip),
                ..Default::default()
            },
        );
        decisions.apply(
            1,
            crate::decision::DecisionPatch {
                action: Some(DecisionAction::Skip),
                ..Default::default()
            },
        );

        let outcome = apply_decisions(&db, &draft(), &decisions.into_decisions()).unwrap();
        assert!(outcome.participant_ids.is_empty());
        assert!(db.list_organizations("ws1").unwrap().is_empty());
        assert!(db.list_people("ws1").unwrap().is_empty());
        // The interaction itself is still recorded.
        assert!(db.get_interaction(&outcome.interaction_id).unwrap().is_some());
    }

    #[test]
    fn test_link_updates_title_when_requested() {
        init_logging();
        let (_dir, db) = open_test_db();
        seed_person(&db, "p1", "Alice Chen", Some("Engineer"));

        let mut person = linked_result(EntityKind::Person, "Alice Chen", "p1");
        person.title = Some("VP Engineering".to_string());

        let decisions = DecisionSet::from_results(vec![person]).into_decisions();
        assert!(decisions[0].update_title);

        let outcome = apply_decisions(&db, &draft(), &decisions).unwrap();
        assert_eq!(outcome.participant_ids, vec!["p1".to_string()]);
        let alice = db.get_person("p1").unwrap().unwrap();
        assert_eq!(alice.title.as_deref(), Some("VP Engineering"));
    }

    #[test]
    fn test_link_leaves_title_when_not_requested() {
        init_logging();
        let (_dir, db) = open_test_db();
        seed_person(&db, "p1", "Alice Chen", Some("Engineer"));

        let mut person = linked_result(EntityKind::Person, "Alice Chen", "p1");
        person.title = Some("VP Engineering".to_string());

        let mut set = DecisionSet::from_results(vec![person]);
        set.apply(
            0,
            crate::decision::DecisionPatch {
                update_title: Some(false),
                ..Default::default()
            },
        );

        apply_decisions(&db, &draft(), &set.into_decisions()).unwrap();
        let alice = db.get_person("p1").unwrap().unwrap();
        assert_eq!(alice.title.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_link_without_id_is_gracefully_skipped() {
        init_logging();
        let (_dir, db) = open_test_db();

        let mut set = DecisionSet::from_results(vec![result(EntityKind::Person, "Alice Chen")]);
        // Reviewer switched to link without choosing a target.
        set.apply(
            0,
            crate::decision::DecisionPatch {
                action: Some(DecisionAction::Link),
                ..Default::default()
            },
        );

        let outcome = apply_decisions(&db, &draft(), &set.into_decisions()).unwrap();
        assert!(outcome.participant_ids.is_empty());
        assert!(outcome.failures.is_empty());
        assert!(db.list_people("ws1").unwrap().is_empty());
    }

    #[test]
    fn test_create_falls_back_to_extracted_name() {
        init_logging();
        let (_dir, db) = open_test_db();

        let mut set = DecisionSet::from_results(vec![result(EntityKind::Person, "Alice Chen")]);
        set.apply(
            0,
            crate::decision::DecisionPatch {
                new_name: Some("   ".to_string()),
                ..Default::default()
            },
        );

        let outcome = apply_decisions(&db, &draft(), &set.into_decisions()).unwrap();
        assert_eq!(outcome.participant_ids.len(), 1);
        assert_eq!(db.list_people("ws1").unwrap()[0].full_name, "Alice Chen");
    }

    #[test]
    fn test_unresolvable_affiliation_is_skipped_not_failed() {
        init_logging();
        let (_dir, db) = open_test_db();

        // Person affiliated with an organization that was neither
        // pre-existing nor created this commit.
        let mut person = result(EntityKind::Person, "Alice Chen");
        person.organization = Some("Ghost Corp".to_string());

        let decisions = DecisionSet::from_results(vec![person]).into_decisions();
        let outcome = apply_decisions(&db, &draft(), &decisions).unwrap();
        assert!(outcome.failures.is_empty());

        let people = db.list_people("ws1").unwrap();
        assert_eq!(people.len(), 1);
        assert!(db.list_affiliations_for_person(&people[0].id).unwrap().is_empty());
    }

    #[test]
    fn test_ghost_link_collects_failure_but_commit_continues() {
        init_logging();
        let (_dir, db) = open_test_db();
        seed_person(&db, "p1", "Bob Diaz", None);

        // First decision links to a person id that does not exist; the
        // participant link hits the foreign key and is reported, while
        // the second decision still commits.
        let ghost = linked_result(EntityKind::Person, "Alice Chen", "ghost");
        let real = linked_result(EntityKind::Person, "Bob Diaz", "p1");

        let decisions = DecisionSet::from_results(vec![ghost, real]).into_decisions();
        let outcome = apply_decisions(&db, &draft(), &decisions).unwrap();

        assert_eq!(outcome.participant_ids, vec!["p1".to_string()]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 0);
        assert_eq!(outcome.failures[0].extracted_name, "Alice Chen");
    }

    #[test]
    fn test_shared_org_mentioned_by_two_people_gets_one_row_each() {
        init_logging();
        let (_dir, db) = open_test_db();

        let mut alice = result(EntityKind::Person, "Alice Chen");
        alice.organization = Some("Beta LLC".to_string());
        let mut bob = result(EntityKind::Person, "Bob Diaz");
        bob.organization = Some("beta llc".to_string());

        let decisions = DecisionSet::from_results(vec![
            result(EntityKind::Organization, "Beta LLC"),
            alice,
            bob,
        ])
        .into_decisions();

        let outcome = apply_decisions(&db, &draft(), &decisions).unwrap();
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.participant_ids.len(), 2);

        // One organization, each person affiliated exactly once.
        let orgs = db.list_organizations("ws1").unwrap();
        assert_eq!(orgs.len(), 1);
        for person in db.list_people("ws1").unwrap() {
            let affiliations = db.list_affiliations_for_person(&person.id).unwrap();
            assert_eq!(affiliations.len(), 1, "person {}", person.full_name);
            assert_eq!(affiliations[0].organization_id, orgs[0].id);
        }
    }

    #[test]
    fn test_interaction_title_truncation_and_fallback() {
        assert_eq!(interaction_title(""), DEFAULT_TITLE);
        assert_eq!(interaction_title("  "), DEFAULT_TITLE);
        assert_eq!(interaction_title("Quick sync"), "Quick sync");

        let long: String = "x".repeat(250);
        assert_eq!(interaction_title(&long).chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_interaction_record_contents() {
        init_logging();
        let (_dir, db) = open_test_db();

        let outcome = apply_decisions(&db, &draft(), &[]).unwrap();
        let interaction = db.get_interaction(&outcome.interaction_id).unwrap().unwrap();
        assert_eq!(interaction.title.as_deref(), Some("Rollout sync with Alice."));
        assert_eq!(interaction.summary.as_deref(), Some("Rollout sync with Alice."));
        assert_eq!(
            interaction.raw_text.as_deref(),
            Some("Met Alice from Beta LLC about the rollout.")
        );
        assert_eq!(interaction.interaction_type, "note");
        assert_eq!(interaction.source, "manual");
        assert!(!interaction.occurred_at.is_empty());
    }
}
