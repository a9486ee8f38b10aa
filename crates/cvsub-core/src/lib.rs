//! Reconciliation and batching engine for the variant registry pipeline.
//!
//! The engine is deliberately single-threaded: every stage is a pure
//! function over owned data plus two capability seams, [`ArtifactStore`]
//! for persistence and [`Registry`] for the remote API.
//!
//! [`ArtifactStore`]: cvsub_ingest::artifact::ArtifactStore
//! [`Registry`]: registry::Registry

pub mod annotate;
pub mod batch;
pub mod clean;
pub mod dedupe;
pub mod error;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod reconcile;
pub mod registry;

pub use annotate::{AnnotateOptions, AnnotateSummary, run_annotate};
pub use batch::{Batch, DEFAULT_BATCH_SIZE, build_batches, deletion_accessions};
pub use clean::{CleanOutcome, clean_table};
pub use dedupe::{DedupOutcome, dedupe_sites};
pub use error::{EngineError, IssueKind, RowIssue};
pub use payload::{batch_payload, deletion_payload};
pub use pipeline::{
    BatchOutcome, RunSummary, StatusOutcome, SubmitOptions, run_delete, run_status, run_submit,
};
pub use reconcile::{Reconciliation, reconcile};
pub use registry::{
    DryRunRegistry, Registry, ScriptedRegistry, SubmissionId, SubmissionStatus, SubmitOutcome,
};
