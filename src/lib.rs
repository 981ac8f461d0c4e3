// src/lib.rs
pub mod builder;
pub mod config;
pub mod dump;
pub mod error;
pub mod lineage;
pub mod resolver;
pub mod schema;
pub mod taxdb;
pub mod types;

use std::fmt::Write as FmtWrite;
use std::path::Path;

pub use crate::builder::TaxonStoreBuilder;
pub use crate::config::TaxDbConfig;
pub use crate::error::{Result, TaxDbError};
pub use crate::lineage::{resolve_lineage, NodeLookup};
pub use crate::resolver::TaxonomyDb;
pub use crate::taxdb::TaxonomyMap;
pub use crate::types::{BuildSummary, Lineage, SequenceId, SequenceTaxon, TaxonId, TaxonNode};

/// Taxonomy assigned to one sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceAnnotation {
    pub sequence_id: SequenceId,
    /// `None` when the sequence id is not in the identifier map.
    pub taxon_id: Option<TaxonId>,
    /// `None` when there is no taxon or its ancestry is incomplete.
    pub lineage: Option<Lineage>,
}

impl SequenceAnnotation {
    /// One `sequence_id \t taxon_id \t rank:name;...` line, `-` for missing values.
    pub fn to_line(&self) -> String {
        let taxon = self
            .taxon_id
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let lineage = match &self.lineage {
            Some(lineage) if !lineage.is_empty() => lineage
                .iter()
                .map(|(rank, name)| format!("{rank}:{name}"))
                .collect::<Vec<_>>()
                .join(";"),
            _ => "-".to_string(),
        };
        format!("{}\t{}\t{}", self.sequence_id, taxon, lineage)
    }
}

/// Resolve taxon and lineage for every sequence id against a built store.
pub fn annotate_sequences<P: AsRef<Path>>(
    db_path: P,
    sequence_ids: &[SequenceId],
    config: TaxDbConfig,
) -> Result<Vec<SequenceAnnotation>> {
    let db = TaxonomyDb::open_with_config(db_path, config)?;

    let mut annotations = Vec::with_capacity(sequence_ids.len());
    for &sequence_id in sequence_ids {
        let taxon_id = db.get_taxon_id(sequence_id)?;
        let lineage = match taxon_id {
            Some(taxon_id) => db.get_lineage(taxon_id)?,
            None => None,
        };
        annotations.push(SequenceAnnotation {
            sequence_id,
            taxon_id,
            lineage,
        });
    }
    db.close()?;
    Ok(annotations)
}

/// Render annotations as text, one line per sequence.
pub fn annotations_text(annotations: &[SequenceAnnotation]) -> String {
    let mut output = String::new();
    for annotation in annotations {
        writeln!(output, "{}", annotation.to_line()).unwrap();
    }
    output
}
