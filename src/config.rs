// src/config.rs

use crate::types::TaxonId;

/// NCBI denotes the root node as 1 with rank "no rank".
pub const ROOT_TAXON_ID: TaxonId = 1;

/// Upper bound on hops taken while walking towards the root.
pub const MAX_DEPTH: usize = 30;

/// Rank value that carries no taxonomic information.
pub const NO_RANK: &str = "no rank";

/// Rows between two progress log lines while building.
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Knobs shared by the store builder and the lineage resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxDbConfig {
    /// Taxon whose lineage terminates every walk.
    pub root_taxon_id: TaxonId,
    pub max_depth: usize,
    /// Ranks left out of a lineage.
    pub skip_ranks: Vec<String>,
    pub progress_interval: usize,
}

impl Default for TaxDbConfig {
    fn default() -> Self {
        Self {
            root_taxon_id: ROOT_TAXON_ID,
            max_depth: MAX_DEPTH,
            skip_ranks: vec![NO_RANK.to_string()],
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl TaxDbConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_root(mut self, root_taxon_id: TaxonId) -> Self {
        self.root_taxon_id = root_taxon_id;
        self
    }

    /// Whether a node of this rank contributes to a lineage.
    pub fn keeps_rank(&self, rank: &str) -> bool {
        !self.skip_ranks.iter().any(|skip| skip == rank)
    }
}
