//! CLI argument definitions for the registry submitter.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cvsub",
    version,
    about = "Submit a clinical variant catalogue to the ClinVar registry",
    long_about = "Clean an exported variant catalogue, reconcile it against the \
                  previously-submitted reference tables, and submit the novel and \
                  changed records to the ClinVar submission API in batches.\n\n\
                  Report documents are fetched with `status` and folded back into \
                  the cleaned tables with `annotate`."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean a catalogue export and submit novel/changed records.
    Submit(SubmitArgs),

    /// Delete previously-issued accessions listed in a TSV.
    Delete(DeleteArgs),

    /// Poll a submission and persist its report document once ready.
    Status(StatusArgs),

    /// Fold report accessions back into a cleaned table.
    Annotate(AnnotateArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Exported catalogue TSV.
    #[arg(value_name = "CATALOGUE_TSV")]
    pub input: PathBuf,

    /// Date the catalogue was exported (YYYY-MM-DD).
    #[arg(long = "date", value_name = "DATE")]
    pub date: String,

    /// Catalogue origin; selects classification vocabulary and condition set.
    #[arg(long = "origin", value_enum, default_value = "germline")]
    pub origin: OriginArg,

    /// Reference table of previously-submitted variants.
    #[arg(long = "reference-variants", value_name = "TSV")]
    pub reference_variants: Option<PathBuf>,

    /// Reference table of previously-submitted haplotypes.
    #[arg(long = "reference-haplotypes", value_name = "TSV")]
    pub reference_haplotypes: Option<PathBuf>,

    /// Run directory for artifacts (default: <CATALOGUE_TSV dir>/submission).
    #[arg(long = "run-dir", value_name = "DIR")]
    pub run_dir: Option<PathBuf>,

    /// Maximum records per submitted batch.
    #[arg(long = "batch-size", value_name = "N", default_value_t = cvsub_core::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Treat every cleaned row as novel instead of reconciling.
    ///
    /// Only for a first-ever submission of a catalogue. Refuses rows that
    /// already carry an accession.
    #[arg(long = "no-reconcile")]
    pub no_reconcile: bool,

    /// Clean, batch and write payload artifacts without contacting the
    /// registry.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// TSV listing the accessions to delete in its SCV column.
    #[arg(value_name = "RETRACTED_TSV")]
    pub input: PathBuf,

    /// Run directory for artifacts (default: <RETRACTED_TSV dir>/submission).
    #[arg(long = "run-dir", value_name = "DIR")]
    pub run_dir: Option<PathBuf>,

    /// Maximum accessions per deletion batch.
    #[arg(long = "batch-size", value_name = "N", default_value_t = cvsub_core::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Build deletion payloads without contacting the registry.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Submission id returned by `submit` (SUBnnnnnnnn).
    #[arg(value_name = "SUBMISSION_ID")]
    pub submission_id: String,

    /// Run directory the submission wrote its artifacts into.
    #[arg(long = "run-dir", value_name = "DIR", default_value = "submission")]
    pub run_dir: PathBuf,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

#[derive(Args)]
pub struct AnnotateArgs {
    /// Cleaned table to annotate with accessions.
    #[arg(value_name = "CLEANED_TSV")]
    pub input: PathBuf,

    /// Date of the submission round, used to name the output table.
    #[arg(long = "date", value_name = "DATE")]
    pub date: String,

    /// Record type the table holds.
    #[arg(long = "record-type", value_enum, default_value = "variants")]
    pub record_type: RecordTypeArg,

    /// Manifest of the submission round to fold in (novel or update).
    #[arg(long = "intent", value_enum, default_value = "novel")]
    pub intent: IntentArg,

    /// Previously-annotated reference table.
    #[arg(long = "reference", value_name = "TSV")]
    pub reference: Option<PathBuf>,

    /// Run directory holding the manifests and report documents.
    #[arg(long = "run-dir", value_name = "DIR", default_value = "submission")]
    pub run_dir: PathBuf,
}

/// Shared endpoint/credential flags for commands that reach the registry.
#[derive(Args)]
pub struct EndpointArgs {
    /// File holding the service-provider API key.
    #[arg(long = "key", value_name = "PATH", default_value = "clinvar.key")]
    pub key_file: PathBuf,

    /// Target the validation-only endpoint; no accessions are issued.
    #[arg(long = "test-endpoint")]
    pub test_endpoint: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OriginArg {
    Germline,
    Somatic,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RecordTypeArg {
    Variants,
    Haplotypes,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum IntentArg {
    Novel,
    Update,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
