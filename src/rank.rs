use std::time::Instant;

use anyhow::Result;
use tracing::info;

use crate::args::Args;
use crate::domains::{self, EnrichSummary, SystemResolver};
use crate::prefix::IpAsnTable;
use crate::registry::{AsnRegistry, RankedEntry};
use crate::relations::{self, IngestSummary};
use crate::select;

#[derive(Debug)]
pub struct RankingResult {
    pub entries: Vec<RankedEntry>,
    pub total_asns: usize,
    pub ingest: IngestSummary,
    pub enrich: EnrichSummary,
}

/// Runs the full pipeline: relation ingestion, domain enrichment,
/// bounded top-N selection. Phases run strictly in that order and each
/// one reports its elapsed time.
pub fn rank_asns(args: &Args) -> Result<RankingResult> {
    let total_start = Instant::now();
    info!(action = "start", component = "ranking", "Starting ASN ranking");

    let mut registry = AsnRegistry::new();

    let phase_start = Instant::now();
    let ingest = relations::ingest_relations_file(&args.relations, &mut registry)?;
    info!(
        action = "complete",
        component = "relation_ingest",
        rows_ingested = ingest.rows_ingested,
        rows_skipped = ingest.rows_skipped,
        total_asns = registry.len(),
        duration_ms = phase_start.elapsed().as_millis(),
        "Relation ingestion completed"
    );

    let phase_start = Instant::now();
    let table = IpAsnTable::from_path(&args.prefixes)?;
    let domains = domains::read_domain_list_file(&args.domains, args.max_domains)?;
    let enrich = domains::enrich_with_domains(
        &domains,
        args.max_domains,
        &SystemResolver,
        &table,
        &mut registry,
        args.workers,
    )?;
    info!(
        action = "complete",
        component = "domain_enrich",
        processed = enrich.processed,
        resolved = enrich.resolved,
        attributed = enrich.attributed,
        duration_ms = phase_start.elapsed().as_millis(),
        "Domain enrichment completed"
    );

    let entries = select::top_asns(&registry, args.best);

    info!(
        action = "complete",
        component = "ranking",
        total_asns = registry.len(),
        duration_ms = total_start.elapsed().as_millis(),
        "Ranking completed"
    );

    Ok(RankingResult {
        entries,
        total_asns: registry.len(),
        ingest,
        enrich,
    })
}
