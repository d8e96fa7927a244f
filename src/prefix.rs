use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use anyhow::{Context, Result};
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use tracing::{info, warn};

use crate::registry::Asn;

/// A prefix-table hit: the owning ASN and the matched mask length.
/// Absence of a covering prefix is `None` at the call site, which keeps
/// AS 0 distinguishable from "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch {
    pub asn: Asn,
    pub prefix_len: u8,
}

/// Maps an address to the autonomous system owning its prefix.
pub trait AsnLookup {
    fn lookup(&self, ip: IpAddr) -> Option<PrefixMatch>;
}

/// Longest-prefix-match table over IP space, loaded from a pyasn-style
/// dump with one `PREFIX/LEN<ws>ASN` entry per line.
#[derive(Debug, Default)]
pub struct IpAsnTable {
    v4: HashMap<(Ipv4Addr, u8), Asn>,
    v6: HashMap<(Ipv6Addr, u8), Asn>,
    // distinct mask lengths, longest first, so lookups try the most
    // specific prefix first
    v4_lens: Vec<u8>,
    v6_lens: Vec<u8>,
}

impl IpAsnTable {
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut table = IpAsnTable::default();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read prefix table input")?;
            let row = line.trim();
            if row.is_empty() || row.starts_with(';') || row.starts_with('#') {
                continue;
            }

            let mut fields = row.split_whitespace();
            let parsed = match (fields.next(), fields.next()) {
                (Some(prefix), Some(asn)) => prefix
                    .parse::<IpNetwork>()
                    .ok()
                    .zip(asn.parse::<Asn>().ok()),
                _ => None,
            };

            match parsed {
                Some((network, asn)) => table.insert(network, asn),
                None => warn!(
                    action = "skip",
                    component = "prefix_table",
                    line_number = line_number + 1,
                    row = row,
                    "Invalid prefix table line"
                ),
            }
        }

        Ok(table)
    }

    /// File-based entry point; a missing or unreadable file is fatal.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open prefix table file {:?}", path))?;
        let table = Self::from_reader(BufReader::new(file))?;

        info!(
            action = "loaded",
            component = "prefix_table",
            prefix_count = table.len(),
            path = ?path,
            "Prefix table loaded"
        );
        Ok(table)
    }

    pub fn insert(&mut self, network: IpNetwork, asn: Asn) {
        match network {
            IpNetwork::V4(net) => {
                self.v4.insert((net.network(), net.prefix()), asn);
                register_len(&mut self.v4_lens, net.prefix());
            }
            IpNetwork::V6(net) => {
                self.v6.insert((net.network(), net.prefix()), asn);
                register_len(&mut self.v6_lens, net.prefix());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }
}

impl AsnLookup for IpAsnTable {
    fn lookup(&self, ip: IpAddr) -> Option<PrefixMatch> {
        match ip {
            IpAddr::V4(addr) => self.v4_lens.iter().find_map(|&len| {
                let net = Ipv4Network::new(addr, len).ok()?;
                self.v4
                    .get(&(net.network(), len))
                    .map(|&asn| PrefixMatch { asn, prefix_len: len })
            }),
            IpAddr::V6(addr) => self.v6_lens.iter().find_map(|&len| {
                let net = Ipv6Network::new(addr, len).ok()?;
                self.v6
                    .get(&(net.network(), len))
                    .map(|&asn| PrefixMatch { asn, prefix_len: len })
            }),
        }
    }
}

fn register_len(lens: &mut Vec<u8>, len: u8) {
    if let Err(position) = lens.binary_search_by(|probe| len.cmp(probe)) {
        lens.insert(position, len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: &str) -> IpAsnTable {
        IpAsnTable::from_reader(content.as_bytes()).unwrap()
    }

    fn ip(addr: &str) -> IpAddr {
        addr.parse().unwrap()
    }

    #[test]
    fn longest_prefix_wins() {
        let table = table("1.0.0.0/8\t100\n1.1.0.0/16\t200\n");

        assert_eq!(
            table.lookup(ip("1.1.5.5")),
            Some(PrefixMatch { asn: 200, prefix_len: 16 })
        );
        assert_eq!(
            table.lookup(ip("1.2.3.4")),
            Some(PrefixMatch { asn: 100, prefix_len: 8 })
        );
    }

    #[test]
    fn uncovered_address_is_a_miss() {
        let table = table("1.0.0.0/8\t100\n");

        assert_eq!(table.lookup(ip("9.9.9.9")), None);
    }

    #[test]
    fn as_zero_is_a_hit_not_a_miss() {
        let table = table("2.0.0.0/8\t0\n");

        assert_eq!(
            table.lookup(ip("2.1.1.1")),
            Some(PrefixMatch { asn: 0, prefix_len: 8 })
        );
    }

    #[test]
    fn comments_blanks_and_garbage_are_skipped() {
        let table = table("; ip-asn dump\n# comment\n\nnot a line\n1.0.0.0/24 13335\n");

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(ip("1.0.0.7")),
            Some(PrefixMatch { asn: 13335, prefix_len: 24 })
        );
    }

    #[test]
    fn space_and_tab_separators_both_parse() {
        let table = table("1.0.0.0/24\t1\n2.0.0.0/24 2\n");

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(ip("2.0.0.1")).map(|m| m.asn), Some(2));
    }

    #[test]
    fn ipv6_prefixes_are_supported() {
        let table = table("2001:db8::/32\t64500\n");

        assert_eq!(
            table.lookup(ip("2001:db8::1")),
            Some(PrefixMatch { asn: 64500, prefix_len: 32 })
        );
        assert_eq!(table.lookup(ip("2001:db9::1")), None);
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(IpAsnTable::from_path(Path::new("/nonexistent/ipasn.dat")).is_err());
    }
}
