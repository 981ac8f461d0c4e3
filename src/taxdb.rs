//src/taxdb.rs

use ahash::{AHashMap, AHashSet};
use std::io::BufRead;
use std::path::Path;

use crate::config::TaxDbConfig;
use crate::dump::{self, open_dump};
use crate::error::{Result, TaxDbError};
use crate::lineage::{resolve_lineage, NodeLookup};
use crate::types::{Lineage, TaxonId, TaxonNode};

pub type ParentMap = AHashMap<TaxonId, TaxonId>;
pub type NameMap = AHashMap<TaxonId, String>;
pub type RankMap = AHashMap<TaxonId, String>;

/// In-memory taxonomy for dumps small enough to hold entirely in RAM.
///
/// Built from the same `nodes.dmp`/`names.dmp` readers as the SQLite store,
/// with the same rules: a node without a scientific name is left out, and a
/// repeated taxon id in either dump is an [`TaxDbError::Integrity`] error.
#[derive(Debug, Default)]
pub struct TaxonomyMap {
    parent_map: ParentMap,
    name_map: NameMap,
    rank_map: RankMap,
    config: TaxDbConfig,
}

impl TaxonomyMap {
    pub fn from_dumps<N: BufRead, M: BufRead>(nodes: N, names: M) -> Result<Self> {
        Self::from_dumps_with_config(nodes, names, TaxDbConfig::default())
    }

    /// Reads `names` first so that only nodes with a scientific name are kept.
    pub fn from_dumps_with_config<N: BufRead, M: BufRead>(
        nodes: N,
        names: M,
        config: TaxDbConfig,
    ) -> Result<Self> {
        let mut name_map: NameMap = AHashMap::new();
        for row in dump::scientific_names(names) {
            let row = row?;
            if name_map.insert(row.taxon_id, row.name).is_some() {
                return Err(TaxDbError::Integrity(format!(
                    "taxon {} has more than one scientific name",
                    row.taxon_id
                )));
            }
        }

        let mut seen: AHashSet<TaxonId> = AHashSet::new();
        let mut parent_map: ParentMap = AHashMap::new();
        let mut rank_map: RankMap = AHashMap::new();
        for row in dump::node_rows(nodes) {
            let row = row?;
            if !seen.insert(row.taxon_id) {
                return Err(TaxDbError::Integrity(format!(
                    "taxon {} appears more than once in nodes",
                    row.taxon_id
                )));
            }
            if name_map.contains_key(&row.taxon_id) {
                parent_map.insert(row.taxon_id, row.parent_id);
                rank_map.insert(row.taxon_id, row.rank);
            }
        }
        name_map.retain(|taxon_id, _| parent_map.contains_key(taxon_id));

        log::info!("loaded {} taxa into memory", parent_map.len());
        Ok(Self {
            parent_map,
            name_map,
            rank_map,
            config,
        })
    }

    pub fn from_paths<P: AsRef<Path>>(nodes: P, names: P) -> Result<Self> {
        Self::from_dumps(open_dump(nodes)?, open_dump(names)?)
    }

    pub fn len(&self) -> usize {
        self.parent_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent_map.is_empty()
    }

    pub fn get_node(&self, taxon_id: TaxonId) -> Option<TaxonNode> {
        let parent_id = *self.parent_map.get(&taxon_id)?;
        Some(TaxonNode {
            taxon_id,
            parent_id,
            rank: self.rank_map.get(&taxon_id).cloned().unwrap_or_default(),
            name: self.name_map.get(&taxon_id).cloned().unwrap_or_default(),
        })
    }

    pub fn get_lineage(&self, taxon_id: TaxonId) -> Result<Option<Lineage>> {
        resolve_lineage(self, taxon_id, &self.config)
    }
}

impl NodeLookup for TaxonomyMap {
    fn node(&self, taxon_id: TaxonId) -> Result<Option<TaxonNode>> {
        Ok(self.get_node(taxon_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::fixtures::*;
    use std::io::Cursor;

    #[test]
    fn nodes_without_scientific_name_are_dropped() {
        let taxonomy = TaxonomyMap::from_dumps(Cursor::new(NODES), Cursor::new(NAMES)).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert!(taxonomy.get_node(6).is_none());
        assert_eq!(taxonomy.get_node(2).unwrap().name, "Bacteria");
        assert_eq!(taxonomy.get_node(2).unwrap().parent_id, 131567);
    }

    #[test]
    fn second_scientific_name_is_an_integrity_error() {
        let names = format!("{NAMES}2\t|\tEubacteria\t|\t\t|\tscientific name\t|\n");
        let err = TaxonomyMap::from_dumps(Cursor::new(NODES), Cursor::new(names)).unwrap_err();
        assert!(matches!(err, TaxDbError::Integrity(_)), "got {err:?}");
    }

    #[test]
    fn repeated_node_id_is_an_integrity_error() {
        let nodes = format!("{NODES}2\t|\t1\t|\tsuperkingdom\t|\n");
        let err = TaxonomyMap::from_dumps(Cursor::new(nodes), Cursor::new(NAMES)).unwrap_err();
        assert!(matches!(err, TaxDbError::Integrity(_)), "got {err:?}");
    }

    #[test]
    fn lineage_matches_sqlite_semantics() {
        let taxonomy =
            TaxonomyMap::from_dumps(Cursor::new(HBV_NODES), Cursor::new(HBV_NAMES)).unwrap();

        assert_eq!(taxonomy.get_lineage(1).unwrap(), Some(Lineage::new()));
        assert_eq!(taxonomy.get_lineage(42).unwrap(), None);

        let lineage = taxonomy.get_lineage(10407).unwrap().unwrap();
        assert_eq!(lineage.len(), 4);
        assert_eq!(lineage["superkingdom"], "Viruses");
        assert_eq!(lineage["family"], "Hepadnaviridae");
        assert_eq!(lineage["genus"], "Orthohepadnavirus");
        assert_eq!(lineage["species"], "Hepatitis B virus");
    }

    #[test]
    fn custom_root_stops_walk_early() {
        let config = TaxDbConfig::default().with_root(10239);
        let taxonomy = TaxonomyMap::from_dumps_with_config(
            Cursor::new(HBV_NODES),
            Cursor::new(HBV_NAMES),
            config,
        )
        .unwrap();
        let lineage = taxonomy.get_lineage(10404).unwrap().unwrap();
        // 35268 is "no rank" and its parent is the root, so only the family remains
        assert_eq!(lineage.len(), 1);
        assert_eq!(lineage["family"], "Hepadnaviridae");
    }
}
