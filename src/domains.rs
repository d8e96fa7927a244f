use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::{IpAddr, ToSocketAddrs};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::prefix::AsnLookup;
use crate::registry::AsnRegistry;

const PROGRESS_INTERVAL: usize = 1000;

/// Turns a domain name into one IP address, or nothing.
pub trait Resolver {
    fn resolve(&self, domain: &str) -> Option<IpAddr>;
}

/// Resolves through the operating system's resolver; the first returned
/// address wins when a name maps to several.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, domain: &str) -> Option<IpAddr> {
        // ToSocketAddrs wants a port, the lookup ignores it
        (domain, 0)
            .to_socket_addrs()
            .ok()?
            .next()
            .map(|addr| addr.ip())
    }
}

/// Outcome counters for one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub processed: usize,
    pub resolved: usize,
    pub attributed: usize,
}

/// Reads `rank,domain` rows from the head of a popularity list, stopping
/// exactly after `max_domains` consumed rows. A consumed row without a
/// domain column is skipped with a diagnostic but still counts against
/// the cap.
pub fn read_domain_list(reader: impl BufRead, max_domains: usize) -> Result<Vec<String>> {
    let mut domains = Vec::new();
    let mut consumed = 0usize;

    for (line_number, line) in reader.lines().enumerate() {
        if consumed == max_domains {
            break;
        }
        let line = line.context("Failed to read domain list input")?;
        let row = line.trim_end_matches('\r');
        if row.is_empty() {
            continue;
        }
        consumed += 1;

        let domain = row
            .splitn(3, ',')
            .nth(1)
            .map(str::trim)
            .filter(|domain| !domain.is_empty());

        match domain {
            Some(domain) => domains.push(domain.to_string()),
            None => warn!(
                action = "skip",
                component = "domain_list",
                line_number = line_number + 1,
                row = row,
                "Domain row without a domain column"
            ),
        }
    }

    Ok(domains)
}

/// File-based entry point; a missing or unreadable file is fatal.
pub fn read_domain_list_file(path: &Path, max_domains: usize) -> Result<Vec<String>> {
    info!(action = "start", component = "domain_list", path = ?path, "Reading domain list");

    let file = File::open(path)
        .with_context(|| format!("Failed to open domain list file {:?}", path))?;
    read_domain_list(BufReader::new(file), max_domains)
}

/// Resolves up to `max_domains` entries from the head of `domains` and
/// credits each one to the ASN owning the resolved address.
///
/// Resolution failures and addresses outside the prefix table contribute
/// nothing and are skipped quietly. Resolution fans out over a rayon
/// pool; the registry merge below stays sequential so every ASN key is
/// mutated by a single writer.
pub fn enrich_with_domains<R, L>(
    domains: &[String],
    max_domains: usize,
    resolver: &R,
    lookup: &L,
    registry: &mut AsnRegistry,
    workers: Option<usize>,
) -> Result<EnrichSummary>
where
    R: Resolver + Sync,
    L: AsnLookup + Sync,
{
    let capped = &domains[..domains.len().min(max_domains)];

    let worker_count = workers.unwrap_or_else(|| num_cpus::get().min(8));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .context("Failed to build resolver thread pool")?;

    info!(
        action = "configure",
        component = "domain_enrich",
        worker_count,
        domain_count = capped.len(),
        "Resolving domains"
    );

    let processed = AtomicUsize::new(0);
    let resolved = AtomicUsize::new(0);

    // collected in input order; attribution happens in the merge loop
    let attributions: Vec<_> = pool.install(|| {
        capped
            .par_iter()
            .map(|domain| {
                let attribution = match resolver.resolve(domain) {
                    Some(ip) => {
                        resolved.fetch_add(1, Ordering::Relaxed);
                        lookup.lookup(ip)
                    }
                    None => {
                        debug!(
                            action = "skip",
                            component = "domain_enrich",
                            domain = domain.as_str(),
                            "Resolution failed"
                        );
                        None
                    }
                };

                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 {
                    info!(
                        action = "progress",
                        component = "domain_enrich",
                        processed = done,
                        "Parsed domains"
                    );
                }

                attribution
            })
            .collect()
    });

    let mut summary = EnrichSummary {
        processed: capped.len(),
        resolved: resolved.into_inner(),
        attributed: 0,
    };

    for (domain, attribution) in capped.iter().zip(attributions) {
        if let Some(found) = attribution {
            registry.add_domain(found.asn, domain.clone());
            summary.attributed += 1;
        }
    }

    Ok(summary)
}
