use crate::rank::RankingResult;
use crate::utils::format_number;

/// Renders the ranked list in report form:
///
/// ```text
/// 1. AS 15169:
///         relations: 31,337
///         domains: 24
///         weight: 31,361
/// ```
pub fn render_ranking(result: &RankingResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n--- Top {} ASNs by weight ---\n", result.entries.len()));
    out.push_str(&format!(
        "Total ASNs tracked: {}\n",
        format_number(result.total_asns as u64)
    ));
    out.push_str(&format!(
        "Relation rows ingested: {} ({} skipped)\n",
        format_number(result.ingest.rows_ingested as u64),
        format_number(result.ingest.rows_skipped as u64)
    ));
    out.push_str(&format!(
        "Domains processed: {} ({} attributed)\n\n",
        format_number(result.enrich.processed as u64),
        format_number(result.enrich.attributed as u64)
    ));

    for (index, entry) in result.entries.iter().enumerate() {
        out.push_str(&format!(
            "{}. AS {}:\n\trelations: {}\n\tdomains: {}\n\tweight: {}\n",
            index + 1,
            entry.asn,
            format_number(entry.relation_count as u64),
            format_number(entry.domain_count as u64),
            format_number(entry.weight as u64),
        ));
    }

    out
}

pub fn print_ranking(result: &RankingResult) {
    print!("{}", render_ranking(result));
}
