//! Probe filtering ahead of tallying and shuffling.

use crate::link::{GeneId, ProbeId, ProbeLink};
use std::collections::{HashMap, HashSet};

/// Restrict a probe->genes map to a gene universe.
///
/// Each probe keeps only its genes inside `universe`; probes left without genes are
/// dropped. With `filter_non_specific`, probes mapped to more than one gene (in or out
/// of the universe) are dropped outright. The result doubles as the shuffle universe
/// of the dataset.
pub fn filter_probes(
    probe_genes: &HashMap<ProbeId, HashSet<GeneId>>,
    universe: &HashSet<GeneId>,
    filter_non_specific: bool,
) -> HashMap<ProbeId, HashSet<GeneId>> {
    probe_genes
        .iter()
        .filter(|(_, genes)| !(filter_non_specific && genes.len() > 1))
        .filter_map(|(&probe, genes)| {
            let kept: HashSet<GeneId> = genes
                .iter()
                .filter(|g| universe.contains(*g))
                .copied()
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some((probe, kept))
            }
        })
        .collect()
}

/// Keep links whose two probes both survived filtering.
/// Returns the kept links and the number dropped.
pub fn restrict_links(
    links: &[ProbeLink],
    filtered: &HashMap<ProbeId, HashSet<GeneId>>,
) -> (Vec<ProbeLink>, usize) {
    let kept: Vec<ProbeLink> = links
        .iter()
        .filter(|l| filtered.contains_key(&l.first()) && filtered.contains_key(&l.second()))
        .copied()
        .collect();
    let dropped = links.len() - kept.len();
    (kept, dropped)
}

/// Probes of a filtered map in ascending order.
pub fn shuffle_universe(filtered: &HashMap<ProbeId, HashSet<GeneId>>) -> Vec<ProbeId> {
    let mut probes: Vec<ProbeId> = filtered.keys().copied().collect();
    probes.sort_unstable();
    probes
}
