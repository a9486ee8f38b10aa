//! Subcommand entry points: wire CLI arguments to the engine.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use cvsub_core::annotate::{AnnotateOptions, AnnotateSummary, run_annotate};
use cvsub_core::pipeline::{
    RunSummary, StatusOutcome, SubmitOptions, keys, run_delete, run_status, run_submit,
};
use cvsub_core::registry::{DryRunRegistry, SubmissionId};
use cvsub_ingest::artifact::FsArtifactStore;
use cvsub_model::ids::ExtractionDate;
use cvsub_model::record::{CatalogueOrigin, Intent, RecordType};

use cvsub_cli::http::HttpRegistry;

use crate::cli::{
    AnnotateArgs, DeleteArgs, EndpointArgs, IntentArg, OriginArg, RecordTypeArg, StatusArgs,
    SubmitArgs,
};

pub fn run_submit_cmd(args: &SubmitArgs) -> Result<RunSummary> {
    let options = SubmitOptions {
        origin: match args.origin {
            OriginArg::Germline => CatalogueOrigin::Germline,
            OriginArg::Somatic => CatalogueOrigin::Somatic,
        },
        batch_size: args.batch_size,
        extraction_date: ExtractionDate::parse(&args.date)
            .with_context(|| format!("--date {:?}", args.date))?,
        reconcile: !args.no_reconcile,
    };
    let store = FsArtifactStore::new(run_dir(&args.run_dir, &args.input));
    info!(run_dir = %store.root().display(), "artifact store");
    if args.dry_run {
        let registry = DryRunRegistry::new();
        run_submit(
            &store,
            &registry,
            &args.input,
            args.reference_variants.as_deref(),
            args.reference_haplotypes.as_deref(),
            &options,
        )
    } else {
        let registry = http_registry(&args.endpoint)?;
        run_submit(
            &store,
            &registry,
            &args.input,
            args.reference_variants.as_deref(),
            args.reference_haplotypes.as_deref(),
            &options,
        )
    }
}

pub fn run_delete_cmd(args: &DeleteArgs) -> Result<RunSummary> {
    let store = FsArtifactStore::new(run_dir(&args.run_dir, &args.input));
    if args.dry_run {
        let registry = DryRunRegistry::new();
        run_delete(&store, &registry, &args.input, args.batch_size)
    } else {
        let registry = http_registry(&args.endpoint)?;
        run_delete(&store, &registry, &args.input, args.batch_size)
    }
}

pub fn run_status_cmd(args: &StatusArgs) -> Result<StatusOutcome> {
    let store = FsArtifactStore::new(&args.run_dir);
    let registry = http_registry(&args.endpoint)?;
    run_status(
        &store,
        &registry,
        &SubmissionId(args.submission_id.clone()),
    )
}

pub fn run_annotate_cmd(args: &AnnotateArgs) -> Result<AnnotateSummary> {
    let date = ExtractionDate::parse(&args.date)
        .with_context(|| format!("--date {:?}", args.date))?;
    let record_type = match args.record_type {
        RecordTypeArg::Variants => RecordType::Variant,
        RecordTypeArg::Haplotypes => RecordType::Haplotype,
    };
    let intent = match args.intent {
        IntentArg::Novel => Intent::Novel,
        IntentArg::Update => Intent::Update,
    };
    let options = AnnotateOptions {
        record_type,
        output_key: format!("annotated/{date}_{record_type}.tsv"),
        extraction_date: date,
    };
    let store = FsArtifactStore::new(&args.run_dir);
    run_annotate(
        &store,
        &keys::manifest(intent),
        &args.input,
        args.reference.as_deref(),
        &options,
    )
}

fn http_registry(endpoint: &EndpointArgs) -> Result<HttpRegistry> {
    let api_key = fs::read_to_string(&endpoint.key_file)
        .with_context(|| format!("read api key {}", endpoint.key_file.display()))?
        .trim()
        .to_string();
    HttpRegistry::new(api_key, endpoint.test_endpoint)
}

fn run_dir(explicit: &Option<PathBuf>, input: &Path) -> PathBuf {
    explicit.clone().unwrap_or_else(|| {
        input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("submission")
    })
}
