// src/schema.rs

/// Applied on every connection that writes; must run outside a transaction.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// The two persisted tables.
pub const SCHEMA_SQL: &str = "
CREATE TABLE nodes(
  taxid INT NOT NULL PRIMARY KEY,
  parent_id INT NOT NULL,
  rank TEXT,
  name TEXT);

CREATE TABLE gi_taxid(
  gi INT NOT NULL PRIMARY KEY,
  taxid INT NOT NULL,
  FOREIGN KEY(taxid) REFERENCES nodes(taxid));
";

/// Staging tables holding the raw dumps until they are joined.
pub const STAGING_SQL: &str = "
CREATE TEMP TABLE dmp_nodes (
  tax_id INT NOT NULL PRIMARY KEY,
  parent_id INT NOT NULL,
  rank TEXT);

CREATE TEMP TABLE dmp_names (
  tax_id INT NOT NULL PRIMARY KEY,
  name TEXT);
";

pub const DROP_STAGING_SQL: &str = "
DROP TABLE temp.dmp_nodes;
DROP TABLE temp.dmp_names;
";

pub const INSERT_STAGED_NODE: &str = "INSERT INTO dmp_nodes VALUES (?1, ?2, ?3)";
pub const INSERT_STAGED_NAME: &str = "INSERT INTO dmp_names VALUES (?1, ?2)";

/// Nodes without a scientific name drop out of the inner join.
pub const MERGE_STAGING_SQL: &str = "
INSERT INTO nodes
    SELECT dmp_nodes.tax_id, parent_id, rank, name
    FROM dmp_nodes
    INNER JOIN dmp_names
    ON dmp_nodes.tax_id = dmp_names.tax_id
";

pub const INSERT_SEQUENCE_TAXON: &str = "INSERT INTO gi_taxid VALUES (?1, ?2)";

pub const TAXON_EXISTS: &str = "SELECT 1 FROM nodes WHERE taxid = ?1";

pub const SELECT_NODE: &str = "SELECT parent_id, rank, name FROM nodes WHERE taxid = ?1";

pub const SELECT_TAXON_ID: &str = "SELECT taxid FROM gi_taxid WHERE gi = ?1";
