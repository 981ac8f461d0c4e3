// src/builder.rs

use std::fs::{self, OpenOptions};
use std::io::{BufRead, ErrorKind};
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Transaction};

use crate::config::TaxDbConfig;
use crate::dump::{self, open_dump};
use crate::error::{Result, TaxDbError};
use crate::schema;
use crate::types::BuildSummary;

/// Creates a fresh SQLite taxonomy store from the NCBI dumps.
///
/// The node and name dumps are staged and inner-joined into `nodes`; the
/// identifier map is then loaded into `gi_taxid`, keeping only rows whose
/// taxon made it into `nodes`. Everything happens inside one transaction.
pub struct TaxonStoreBuilder {
    config: TaxDbConfig,
}

impl Default for TaxonStoreBuilder {
    fn default() -> Self {
        Self::new(TaxDbConfig::default())
    }
}

impl TaxonStoreBuilder {
    pub fn new(config: TaxDbConfig) -> Self {
        Self { config }
    }

    /// Build `destination` from three already-open dumps.
    ///
    /// Fails with [`TaxDbError::Precondition`] if `destination` exists. On any
    /// other failure the destination is removed again.
    pub fn build<P, G, N, M>(
        &self,
        destination: P,
        identifier_map: G,
        nodes: N,
        names: M,
    ) -> Result<BuildSummary>
    where
        P: AsRef<Path>,
        G: BufRead,
        N: BufRead,
        M: BufRead,
    {
        let claim = DestinationClaim::acquire(destination.as_ref())?;
        self.build_claimed(claim, identifier_map, nodes, names)
    }

    /// Same as [`build`](Self::build), opening the dumps from disk
    /// (`.gz` files are decompressed on the fly). The destination is claimed
    /// before any dump is opened.
    pub fn build_from_paths<P: AsRef<Path>>(
        &self,
        destination: P,
        identifier_map: P,
        nodes: P,
        names: P,
    ) -> Result<BuildSummary> {
        let claim = DestinationClaim::acquire(destination.as_ref())?;
        let identifier_map = open_dump(identifier_map)?;
        let nodes = open_dump(nodes)?;
        let names = open_dump(names)?;
        self.build_claimed(claim, identifier_map, nodes, names)
    }

    fn build_claimed<G: BufRead, N: BufRead, M: BufRead>(
        &self,
        claim: DestinationClaim,
        identifier_map: G,
        nodes: N,
        names: M,
    ) -> Result<BuildSummary> {
        log::info!("Starting creation of DB {}.", claim.path.display());

        // Dropped before `claim`, so a failed build closes the DB before removing it.
        let mut conn = Connection::open(&claim.path)?;
        let summary = self.populate(&mut conn, identifier_map, nodes, names)?;
        conn.close().map_err(|(_, err)| err)?;

        claim.keep();
        log::info!("DB created: {summary:?}");
        Ok(summary)
    }

    fn populate<G: BufRead, N: BufRead, M: BufRead>(
        &self,
        conn: &mut Connection,
        identifier_map: G,
        nodes: N,
        names: M,
    ) -> Result<BuildSummary> {
        conn.execute_batch(schema::PRAGMAS)?;
        let tx = conn.transaction()?;
        tx.execute_batch(schema::SCHEMA_SQL)?;
        tx.execute_batch(schema::STAGING_SQL)?;

        let mut summary = BuildSummary::default();

        log::info!("Starting creation of nodes-names table.");
        summary.node_rows = self.stage_nodes(&tx, nodes)?;
        summary.scientific_names = self.stage_names(&tx, names)?;
        summary.nodes_stored = tx.execute(schema::MERGE_STAGING_SQL, [])?;
        tx.execute_batch(schema::DROP_STAGING_SQL)?;
        log::info!(
            "nodes-names table created: {} nodes, {} scientific names, {} stored.",
            summary.node_rows,
            summary.scientific_names,
            summary.nodes_stored
        );

        log::info!("Starting creation of gi-taxid table.");
        self.load_identifiers(&tx, identifier_map, &mut summary)?;
        log::info!(
            "gi-taxid table created: {} stored, {} dropped (unknown taxon).",
            summary.identifiers_stored,
            summary.identifiers_dropped
        );

        tx.commit()?;
        Ok(summary)
    }

    fn stage_nodes<R: BufRead>(&self, tx: &Transaction, reader: R) -> Result<usize> {
        let mut insert = tx.prepare(schema::INSERT_STAGED_NODE)?;
        let mut count = 0;
        for row in dump::node_rows(reader) {
            let row = row?;
            insert.execute(params![row.taxon_id, row.parent_id, row.rank])?;
            count += 1;
            self.report_progress(count, "nodes");
        }
        Ok(count)
    }

    fn stage_names<R: BufRead>(&self, tx: &Transaction, reader: R) -> Result<usize> {
        let mut insert = tx.prepare(schema::INSERT_STAGED_NAME)?;
        let mut count = 0;
        for row in dump::scientific_names(reader) {
            let row = row?;
            insert.execute(params![row.taxon_id, row.name])?;
            count += 1;
            self.report_progress(count, "scientific names");
        }
        Ok(count)
    }

    /// Runs after `nodes` is complete: every row is checked against it.
    fn load_identifiers<R: BufRead>(
        &self,
        tx: &Transaction,
        reader: R,
        summary: &mut BuildSummary,
    ) -> Result<()> {
        let mut taxon_exists = tx.prepare(schema::TAXON_EXISTS)?;
        let mut insert = tx.prepare(schema::INSERT_SEQUENCE_TAXON)?;
        for row in dump::identifier_rows(reader) {
            let row = row?;
            summary.identifier_rows += 1;
            self.report_progress(summary.identifier_rows, "gi-taxid pairs");

            if taxon_exists.exists(params![row.taxon_id])? {
                insert.execute(params![row.sequence_id, row.taxon_id])?;
                summary.identifiers_stored += 1;
            } else {
                log::debug!(
                    "dropping gi {}: taxon {} not in nodes",
                    row.sequence_id,
                    row.taxon_id
                );
                summary.identifiers_dropped += 1;
            }
        }
        Ok(())
    }

    fn report_progress(&self, count: usize, what: &str) {
        let interval = self.config.progress_interval;
        if interval > 0 && count % interval == 0 {
            log::info!("processed {count} # of {what}.");
        }
    }
}

/// Exclusive ownership of a not-yet-existing destination file.
/// Removes the file on drop unless [`keep`](Self::keep) was called.
struct DestinationClaim {
    path: PathBuf,
    keep: bool,
}

impl DestinationClaim {
    fn acquire(path: &Path) -> Result<Self> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(Self {
                path: path.to_path_buf(),
                keep: false,
            }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(TaxDbError::Precondition {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for DestinationClaim {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("could not remove incomplete DB {}: {e}", self.path.display());
        } else {
            log::warn!("removed incomplete DB {}", self.path.display());
        }
    }
}
