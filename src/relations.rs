use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::registry::{Asn, AsnRegistry};

/// Row accounting for one ingestion run. Each skipped row also produced
/// a warn-level diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_ingested: usize,
    pub rows_skipped: usize,
}

/// Streams `asn,related_asn` rows into the registry.
///
/// A relation row references both endpoints, so each valid row credits
/// one edge to either side. Rows with an empty or non-numeric field are
/// skipped with a diagnostic; ingestion itself never fails on content.
pub fn ingest_relations(reader: impl BufRead, registry: &mut AsnRegistry) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read relations input")?;
        let row = line.trim_end_matches('\r');
        if row.is_empty() {
            continue;
        }

        let mut fields = row.splitn(3, ',');
        let asn = fields.next().and_then(parse_asn_field);
        let related = fields.next().and_then(parse_asn_field);

        match (asn, related) {
            (Some(asn), Some(related)) => {
                registry.add_relation(asn, related);
                registry.add_relation(related, asn);
                summary.rows_ingested += 1;
            }
            _ => {
                warn!(
                    action = "skip",
                    component = "relation_ingest",
                    line_number = line_number + 1,
                    row = row,
                    "Invalid relation row"
                );
                summary.rows_skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// File-based entry point; a missing or unreadable file is fatal.
pub fn ingest_relations_file(path: &Path, registry: &mut AsnRegistry) -> Result<IngestSummary> {
    info!(action = "start", component = "relation_ingest", path = ?path, "Parsing relations");

    let file = File::open(path)
        .with_context(|| format!("Failed to open relations file {:?}", path))?;
    ingest_relations(BufReader::new(file), registry)
}

fn parse_asn_field(field: &str) -> Option<Asn> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    field.parse().ok()
}
