// src/lineage.rs

use crate::config::TaxDbConfig;
use crate::error::{Result, TaxDbError};
use crate::types::{Lineage, TaxonId, TaxonNode};

/// Point lookup of a single taxon, shared by the SQLite and in-memory stores.
pub trait NodeLookup {
    fn node(&self, taxon_id: TaxonId) -> Result<Option<TaxonNode>>;
}

/// Walk from `taxon_id` up to the root, collecting `rank -> name`.
///
/// Returns `Ok(None)` if `taxon_id` (or any ancestor) is unknown. Ranks in
/// `config.skip_ranks` are left out. If two ancestors share a rank, the one
/// nearer the root wins, since it is written last.
///
/// Depth starts at 0 on `taxon_id` and grows by one per hop. The root check
/// happens before the depth check, so the walk fails with
/// [`TaxDbError::CycleOrDepthExceeded`] only once it has visited more than
/// `max_depth + 1` nodes none of which has the root as parent.
pub fn resolve_lineage<L: NodeLookup>(
    lookup: &L,
    taxon_id: TaxonId,
    config: &TaxDbConfig,
) -> Result<Option<Lineage>> {
    let mut lineage = Lineage::new();
    let mut current = taxon_id;
    let mut depth = 0usize;

    loop {
        let node = match lookup.node(current)? {
            Some(node) => node,
            None => return Ok(None),
        };
        if config.keeps_rank(&node.rank) {
            lineage.insert(node.rank, node.name);
        }

        current = node.parent_id;
        if node.parent_id == config.root_taxon_id {
            break;
        }
        if depth > config.max_depth {
            return Err(TaxDbError::CycleOrDepthExceeded {
                taxon_id,
                max_depth: config.max_depth,
            });
        }
        depth += 1;
    }
    Ok(Some(lineage))
}
