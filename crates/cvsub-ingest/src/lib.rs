pub mod artifact;
pub mod error;
pub mod tsv;

pub use artifact::{ArtifactStore, FsArtifactStore};
pub use error::{IngestError, Result};
pub use tsv::{
    TsvTable, parse_tsv_bytes, read_tsv_table, records_to_table, render_tsv, write_tsv_table,
};
