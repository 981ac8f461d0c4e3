// src/resolver.rs

use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::config::TaxDbConfig;
use crate::error::Result;
use crate::lineage::{resolve_lineage, NodeLookup};
use crate::schema;
use crate::types::{Lineage, SequenceId, TaxonId, TaxonNode};

/// Read-only access to a store produced by
/// [`TaxonStoreBuilder`](crate::builder::TaxonStoreBuilder).
///
/// The connection is released when the value is dropped; [`close`](Self::close)
/// does the same but reports errors.
pub struct TaxonomyDb {
    conn: Mutex<Connection>,
    config: TaxDbConfig,
}

impl TaxonomyDb {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, TaxDbConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: TaxDbConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(IoError::new(
                ErrorKind::NotFound,
                format!("taxonomy DB {} not found", path.display()),
            )
            .into());
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::debug!("opened taxonomy DB {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            config,
        })
    }

    pub fn config(&self) -> &TaxDbConfig {
        &self.config
    }

    /// Taxon of a sequence, or `None` if the sequence id is not mapped.
    pub fn get_taxon_id(&self, sequence_id: SequenceId) -> Result<Option<TaxonId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(schema::SELECT_TAXON_ID)?;
        let taxon_id = stmt
            .query_row([sequence_id], |row| row.get(0))
            .optional()?;
        Ok(taxon_id)
    }

    pub fn get_node(&self, taxon_id: TaxonId) -> Result<Option<TaxonNode>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(schema::SELECT_NODE)?;
        let node = stmt
            .query_row([taxon_id], |row| {
                Ok(TaxonNode {
                    taxon_id,
                    parent_id: row.get(0)?,
                    rank: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .optional()?;
        Ok(node)
    }

    /// Ranked ancestry of `taxon_id`, or `None` if it (or an ancestor) is unknown.
    pub fn get_lineage(&self, taxon_id: TaxonId) -> Result<Option<Lineage>> {
        resolve_lineage(self, taxon_id, &self.config)
    }

    /// `get_taxon_id` followed by `get_lineage`.
    pub fn get_sequence_lineage(&self, sequence_id: SequenceId) -> Result<Option<Lineage>> {
        match self.get_taxon_id(sequence_id)? {
            Some(taxon_id) => self.get_lineage(taxon_id),
            None => Ok(None),
        }
    }

    pub fn close(self) -> Result<()> {
        self.conn.into_inner().close().map_err(|(_, err)| err)?;
        Ok(())
    }
}

impl NodeLookup for TaxonomyDb {
    fn node(&self, taxon_id: TaxonId) -> Result<Option<TaxonNode>> {
        self.get_node(taxon_id)
    }
}
