use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "asnrank",
    about = "Rank autonomous systems by peering relations and hosted popular domains",
    version,
    long_about = None
)]
pub struct Args {
    /// CSV file of ASN relation pairs (asn,related_asn)
    #[arg(short, long)]
    pub relations: PathBuf,

    /// CSV file of domains ranked by popularity (rank,domain)
    #[arg(short, long)]
    pub domains: PathBuf,

    /// IP-to-ASN prefix table file (pyasn-style dump)
    #[arg(short, long)]
    pub prefixes: PathBuf,

    /// Number of top ASNs to display
    #[arg(short, long, default_value_t = 10)]
    pub best: usize,

    /// How many domains from the head of the list to resolve
    #[arg(long, default_value_t = 10_000)]
    pub max_domains: usize,

    /// Number of worker threads for domain resolution
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
