// src/dump.rs
//
// Row readers for the three NCBI inputs:
//   nodes.dmp / names.dmp  fields separated by "\t|\t", lines end with "\t|\n"
//   gi_taxid_*.dmp         exactly two tab-separated columns

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;

use crate::error::{Result, TaxDbError};
use crate::types::{SequenceTaxon, TaxonId};

pub const NODES_SOURCE: &str = "nodes.dmp";
pub const NAMES_SOURCE: &str = "names.dmp";
pub const IDENTIFIER_MAP_SOURCE: &str = "gi_taxid.dmp";

const DMP_DELIMITER: &str = "\t|\t";
const SCIENTIFIC_NAME: &str = "scientific name";

/// `(taxon_id, parent_id, rank)` from nodes.dmp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub taxon_id: TaxonId,
    pub parent_id: TaxonId,
    pub rank: String,
}

/// `(taxon_id, name)` for a "scientific name" row of names.dmp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRow {
    pub taxon_id: TaxonId,
    pub name: String,
}

/// Open a dump file, transparently decompressing it if it ends in `.gz`.
pub fn open_dump<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Split one `.dmp` line into its fields. Returns `None` for blank lines.
pub fn split_dmp_line(line: &str) -> Option<Vec<&str>> {
    let line = line.trim_end_matches(&['\t', '|', '\n', '\r'][..]);
    if line.is_empty() {
        return None;
    }
    Some(line.split(DMP_DELIMITER).collect())
}

fn parse_id<T: FromStr>(field: &str, what: &str, source_name: &'static str, line: usize) -> Result<T> {
    field.trim().parse().map_err(|_| TaxDbError::Format {
        source_name,
        line,
        message: format!("invalid {what} '{field}'"),
    })
}

/// Rows with fewer than 3 fields are skipped; extra fields are ignored.
pub fn parse_node_line(line: &str, line_num: usize) -> Result<Option<NodeRow>> {
    let fields = match split_dmp_line(line) {
        Some(fields) if fields.len() >= 3 => fields,
        _ => return Ok(None),
    };
    Ok(Some(NodeRow {
        taxon_id: parse_id(fields[0], "taxon id", NODES_SOURCE, line_num)?,
        parent_id: parse_id(fields[1], "parent id", NODES_SOURCE, line_num)?,
        rank: fields[2].to_string(),
    }))
}

/// Only rows whose name class (4th field) is "scientific name" are kept.
pub fn parse_name_line(line: &str, line_num: usize) -> Result<Option<NameRow>> {
    let fields = match split_dmp_line(line) {
        Some(fields) if fields.len() >= 4 && fields[3] == SCIENTIFIC_NAME => fields,
        _ => return Ok(None),
    };
    Ok(Some(NameRow {
        taxon_id: parse_id(fields[0], "taxon id", NAMES_SOURCE, line_num)?,
        name: fields[1].to_string(),
    }))
}

/// Any non-blank row without exactly two columns is fatal.
pub fn parse_identifier_line(line: &str, line_num: usize) -> Result<Option<SequenceTaxon>> {
    let line = line.trim_end();
    if line.is_empty() {
        return Ok(None);
    }
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 2 {
        return Err(TaxDbError::Format {
            source_name: IDENTIFIER_MAP_SOURCE,
            line: line_num,
            message: format!(
                "GI-taxid file should have 2 columns per line, found {}",
                columns.len()
            ),
        });
    }
    Ok(Some(SequenceTaxon {
        sequence_id: parse_id(columns[0], "sequence id", IDENTIFIER_MAP_SOURCE, line_num)?,
        taxon_id: parse_id(columns[1], "taxon id", IDENTIFIER_MAP_SOURCE, line_num)?,
    }))
}

type LineParser<T> = fn(&str, usize) -> Result<Option<T>>;

/// Streams parsed rows from a reader, one pass, skipping rows the parser drops.
pub struct DumpRows<R, T> {
    reader: R,
    line: String,
    line_num: usize,
    parse: LineParser<T>,
}

impl<R: BufRead, T> DumpRows<R, T> {
    fn new(reader: R, parse: LineParser<T>) -> Self {
        Self {
            reader,
            line: String::new(),
            line_num: 0,
            parse,
        }
    }

    /// 1-based number of the last line read.
    pub fn line_num(&self) -> usize {
        self.line_num
    }
}

impl<R: BufRead, T> Iterator for DumpRows<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None, // EOF
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_num += 1;
            match (self.parse)(&self.line, self.line_num) {
                Ok(Some(row)) => return Some(Ok(row)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

pub fn node_rows<R: BufRead>(reader: R) -> DumpRows<R, NodeRow> {
    DumpRows::new(reader, parse_node_line)
}

pub fn scientific_names<R: BufRead>(reader: R) -> DumpRows<R, NameRow> {
    DumpRows::new(reader, parse_name_line)
}

pub fn identifier_rows<R: BufRead>(reader: R) -> DumpRows<R, SequenceTaxon> {
    DumpRows::new(reader, parse_identifier_line)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use std::io::{Cursor, Write};

    fn collect<T>(rows: impl Iterator<Item = Result<T>>) -> Vec<T> {
        rows.collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_parse_names_keeps_only_scientific() {
        let obs: Vec<(TaxonId, String)> = collect(scientific_names(Cursor::new(NAMES)))
            .into_iter()
            .map(|r| (r.taxon_id, r.name))
            .collect();
        assert_eq!(obs, vec![(1, "root".to_string()), (2, "Bacteria".to_string())]);
    }

    #[test]
    fn test_parse_nodes() {
        let obs: Vec<(TaxonId, TaxonId, String)> = collect(node_rows(Cursor::new(NODES)))
            .into_iter()
            .map(|r| (r.taxon_id, r.parent_id, r.rank))
            .collect();
        assert_eq!(
            obs,
            vec![
                (1, 1, "no rank".to_string()),
                (2, 131567, "superkingdom".to_string()),
                (6, 335928, "genus".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_gi_taxid() {
        let obs: Vec<(u64, TaxonId)> = collect(identifier_rows(Cursor::new(GI_TAXID)))
            .into_iter()
            .map(|r| (r.sequence_id, r.taxon_id))
            .collect();
        assert_eq!(obs, vec![(2, 1), (3, 1), (4, 2), (5, 2)]);
    }

    #[test]
    fn split_strips_trailing_delimiter() {
        assert_eq!(
            split_dmp_line("1\t|\troot\t|\t\t|\tscientific name\t|\r\n"),
            Some(vec!["1", "root", "", "scientific name"])
        );
        assert_eq!(split_dmp_line("\t|\n"), None);
        assert_eq!(split_dmp_line("\n"), None);
    }

    #[test]
    fn short_node_rows_are_skipped() {
        let rows = collect(node_rows(Cursor::new("7\t|\t1\t|\n\n9\t|\t1\t|\tgenus\t|\n")));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].taxon_id, 9);
    }

    #[test]
    fn wrong_column_count_is_fatal() {
        let mut rows = identifier_rows(Cursor::new("2\t1\n3\t1\t9\n4\t2\n"));
        assert!(rows.next().unwrap().is_ok());
        match rows.next() {
            Some(Err(TaxDbError::Format { source_name, line, .. })) => {
                assert_eq!(source_name, IDENTIFIER_MAP_SOURCE);
                assert_eq!(line, 2);
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn blank_identifier_lines_are_skipped() {
        let rows = collect(identifier_rows(Cursor::new("\n2\t1\n\n")));
        assert_eq!(rows, vec![SequenceTaxon { sequence_id: 2, taxon_id: 1 }]);
    }

    #[test]
    fn non_numeric_ids_are_fatal() {
        let err = node_rows(Cursor::new("abc\t|\t1\t|\tgenus\t|\n"))
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, TaxDbError::Format { source_name: NODES_SOURCE, line: 1, .. }));
    }

    #[test]
    fn open_dump_reads_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gi_taxid_nucl.dmp.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(HBV_GI_TAXID.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let rows = collect(identifier_rows(open_dump(&path).unwrap()));
        assert_eq!(
            rows,
            vec![SequenceTaxon { sequence_id: 409692259, taxon_id: 10407 }]
        );
    }
}
