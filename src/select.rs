use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::registry::{Asn, AsnRegistry, RankedEntry};

/// Selects the `n_best` heaviest ASNs without sorting the whole
/// registry: a bounded min-heap keeps the current winners while every
/// other record is examined once. Equal weights order by ascending ASN.
pub fn top_asns(registry: &AsnRegistry, n_best: usize) -> Vec<RankedEntry> {
    if n_best == 0 {
        return Vec::new();
    }

    // Reverse(asn) makes the heap evict the larger ASN on equal weight,
    // pinning the tie-break to ascending ASN order.
    let mut heap: BinaryHeap<Reverse<(usize, Reverse<Asn>)>> =
        BinaryHeap::with_capacity(n_best + 1);

    for (asn, record) in registry.iter() {
        heap.push(Reverse((record.weight, Reverse(asn))));
        if heap.len() > n_best {
            heap.pop();
        }
    }

    let mut winners: Vec<(usize, Asn)> = heap
        .into_iter()
        .map(|Reverse((weight, Reverse(asn)))| (weight, asn))
        .collect();
    winners.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    winners
        .into_iter()
        .filter_map(|(_, asn)| {
            registry.get(asn).map(|record| RankedEntry {
                asn,
                relation_count: record.relations.len(),
                domain_count: record.domains.len(),
                weight: record.weight,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_weights(weights: &[(Asn, usize)]) -> AsnRegistry {
        let mut registry = AsnRegistry::new();
        for &(asn, weight) in weights {
            for peer in 0..weight {
                registry.add_relation(asn, peer as Asn);
            }
        }
        registry
    }

    #[test]
    fn returns_heaviest_in_descending_order() {
        let registry = registry_with_weights(&[(1, 3), (2, 9), (3, 1), (4, 6)]);

        let top = top_asns(&registry, 3);

        let asns: Vec<Asn> = top.iter().map(|e| e.asn).collect();
        assert_eq!(asns, vec![2, 4, 1]);
        assert!(top.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
    }

    #[test]
    fn length_is_min_of_n_best_and_registry_size() {
        let registry = registry_with_weights(&[(1, 1), (2, 2)]);

        assert_eq!(top_asns(&registry, 10).len(), registry.len());
        assert_eq!(top_asns(&registry, 1).len(), 1);
    }

    #[test]
    fn n_best_zero_selects_nothing() {
        let registry = registry_with_weights(&[(1, 5)]);

        assert!(top_asns(&registry, 0).is_empty());
    }

    #[test]
    fn equal_weights_order_by_ascending_asn() {
        let registry = registry_with_weights(&[(30, 2), (10, 2), (20, 2), (40, 5)]);

        let top = top_asns(&registry, 3);

        let asns: Vec<Asn> = top.iter().map(|e| e.asn).collect();
        assert_eq!(asns, vec![40, 10, 20]);
    }

    #[test]
    fn entries_snapshot_counts_and_weight() {
        let mut registry = AsnRegistry::new();
        registry.add_relation(9, 1);
        registry.add_relation(9, 2);
        registry.add_domain(9, "a.com".to_string());

        let top = top_asns(&registry, 1);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].asn, 9);
        assert_eq!(top[0].relation_count, 2);
        assert_eq!(top[0].domain_count, 1);
        assert_eq!(top[0].weight, 3);
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let registry = AsnRegistry::new();

        assert!(top_asns(&registry, 10).is_empty());
    }
}
