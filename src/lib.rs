//! Entity reconciliation and smart-capture core for relationship
//! management.
//!
//! Given free text about people and organizations, the capture flow
//! extracts mentions (via an external collaborator), reconciles them
//! against the workspace roster, holds reviewer-adjustable decisions,
//! and commits the accepted set as dependency-ordered database writes.
//!
//! The interactive review UI sits on top of this crate; everything here
//! is UI-free library code.

pub mod capture;
pub mod commit;
pub mod db;
pub mod decision;
mod error;
pub mod extraction;
pub mod matcher;
mod migrations;
pub mod reconcile;
pub mod types;

pub use capture::CaptureSession;
pub use commit::{apply_decisions, CommitFailure, CommitOutcome, InteractionDraft};
pub use decision::{DecisionAction, DecisionPatch, DecisionSet, EntityDecision};
pub use error::CaptureError;
pub use extraction::{
    ChatExtractor, EntityExtractor, ExtractionError, ExtractionResult, KnownOrganization,
    KnownPerson,
};
pub use matcher::{best_match, similarity_score, CandidateMatch, CandidateRecord};
pub use reconcile::reconcile;
pub use types::{
    EntityKind, ExtractedEntity, MatchKind, MatchResult, MatchVerdict, SuggestedAction,
};
