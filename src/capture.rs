//! Smart-capture session workflow.
//!
//! One session walks a piece of captured text through
//! record -> extract -> reconcile -> review -> commit:
//!
//! 1. [`CaptureSession::process`] loads the workspace roster fresh,
//!    hands it to the extractor as hints, reconciles the mentions, and
//!    seeds reviewer decisions with safe defaults.
//! 2. The review UI patches decisions (and the summary) in place.
//! 3. [`CaptureSession::commit`] consumes the session and applies the
//!    decision set; abandoning the session before that writes nothing.
//!
//! The only suspension point is the extraction call; reconciliation is
//! pure and persistence is synchronous.

use crate::commit::{apply_decisions, CommitOutcome, InteractionDraft};
use crate::db::WorkspaceDb;
use crate::decision::{DecisionPatch, DecisionSet, EntityDecision};
use crate::error::CaptureError;
use crate::extraction::{EntityExtractor, KnownOrganization, KnownPerson};
use crate::matcher::CandidateRecord;
use crate::reconcile::reconcile;

/// A capture session held between extraction and commit.
#[derive(Debug)]
pub struct CaptureSession {
    workspace_id: String,
    raw_text: String,
    summary: String,
    decisions: DecisionSet,
}

impl CaptureSession {
    /// Extract and reconcile `text` against the workspace roster.
    ///
    /// The roster is read fresh here and passed through explicitly; the
    /// session never holds live database state.
    pub async fn process(
        extractor: &dyn EntityExtractor,
        db: &WorkspaceDb,
        workspace_id: &str,
        text: &str,
    ) -> Result<Self, CaptureError> {
        let people = db.list_people(workspace_id)?;
        let organizations = db.list_organizations(workspace_id)?;

        let people_hints: Vec<KnownPerson> = people
            .iter()
            .map(|p| KnownPerson {
                full_name: p.full_name.clone(),
                title: p.title.clone(),
            })
            .collect();
        let org_hints: Vec<KnownOrganization> = organizations
            .iter()
            .map(|o| KnownOrganization {
                name: o.name.clone(),
            })
            .collect();

        log::info!(
            "Capture: extracting entities against {} people / {} organizations",
            people.len(),
            organizations.len()
        );
        let extraction = extractor.extract(text, &people_hints, &org_hints).await?;

        let people_candidates: Vec<CandidateRecord> = people
            .iter()
            .map(|p| CandidateRecord {
                id: p.id.clone(),
                name: p.full_name.clone(),
            })
            .collect();
        let org_candidates: Vec<CandidateRecord> = organizations
            .iter()
            .map(|o| CandidateRecord {
                id: o.id.clone(),
                name: o.name.clone(),
            })
            .collect();

        let results = reconcile(&extraction.entities, &people_candidates, &org_candidates);
        log::info!(
            "Capture: {} of {} extracted mentions reconciled for review",
            results.len(),
            extraction.entities.len()
        );

        Ok(CaptureSession {
            workspace_id: workspace_id.to_string(),
            raw_text: text.to_string(),
            summary: extraction.summary,
            decisions: DecisionSet::from_results(results),
        })
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Reviewer override for the extracted summary.
    pub fn set_summary(&mut self, summary: &str) {
        self.summary = summary.to_string();
    }

    pub fn decisions(&self) -> &[EntityDecision] {
        self.decisions.decisions()
    }

    /// Apply a reviewer edit to the decision at `index`.
    pub fn update_decision(&mut self, index: usize, patch: DecisionPatch) -> bool {
        self.decisions.apply(index, patch)
    }

    /// Apply the accepted decisions and record the interaction.
    ///
    /// Consumes the session: each decision set is committed exactly once.
    pub fn commit(self, db: &WorkspaceDb) -> Result<CommitOutcome, CaptureError> {
        let draft = InteractionDraft::note(&self.workspace_id, &self.raw_text, &self.summary);
        let outcome = apply_decisions(db, &draft, &self.decisions.into_decisions())?;
        Ok(outcome)
    }
}
