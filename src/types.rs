//src/types.rs

use std::collections::BTreeMap;

/// NCBI taxon identifier.
pub type TaxonId = u32;

/// External sequence identifier (GI number).
pub type SequenceId = u64;

/// Rank -> scientific name for every ranked ancestor of a taxon (itself included).
pub type Lineage = BTreeMap<String, String>;

/// One row of the `nodes` table: a taxon joined with its scientific name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonNode {
    pub taxon_id: TaxonId,
    /// Equals `taxon_id` only for the root.
    pub parent_id: TaxonId,
    pub rank: String,
    pub name: String,
}

/// One row of the `gi_taxid` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTaxon {
    pub sequence_id: SequenceId,
    pub taxon_id: TaxonId,
}

/// Counters reported once a store has been built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Syntactically usable rows in the node dump.
    pub node_rows: usize,
    /// Rows of the name dump carrying a scientific name.
    pub scientific_names: usize,
    /// Nodes that survived the join with the names and were stored.
    pub nodes_stored: usize,
    /// Non-blank rows of the identifier map.
    pub identifier_rows: usize,
    pub identifiers_stored: usize,
    /// Identifier rows pointing at a taxon that is not in `nodes`.
    pub identifiers_dropped: usize,
}
