pub mod columns;
pub mod error;
pub mod ids;
pub mod record;
pub mod reference;
pub mod report;

pub use error::{ModelError, Result};
pub use ids::{Accession, ExtractionDate, Locus, VariantKey};
pub use record::{CatalogueOrigin, Intent, RecordType, VariantRecord};
pub use reference::{ReferenceEntry, ReferenceTable};
pub use report::{Disposition, ReportDocument, ReportOutcome};
