use crate::error::{LinkError, Result};
use crate::link::{DatasetId, GeneId, GeneLink, ProbeId, ProbeLink};
use crate::utils::DynamicEnum;
use itertools::iproduct;
use rand::rngs::SmallRng; // SmallRng is enough for shuffling and much faster than StdRng
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

/// Randomly re-pairs probe links while keeping the number of links of every probe.
#[derive(Debug)]
pub struct ProbeShuffler<R> {
    rng: R,
}

impl ProbeShuffler<SmallRng> {
    pub fn from_seed(seed: u64) -> Self {
        ProbeShuffler {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> ProbeShuffler<R> {
    pub fn new(rng: R) -> Self {
        ProbeShuffler { rng }
    }

    /// Shuffle `links` within `universe` and return new link values.
    ///
    /// Probe identities are first permuted over the universe, then the second
    /// endpoints are re-paired across links (Fisher-Yates). Both steps move whole
    /// endpoints around, so each probe keeps its degree under its new identity.
    /// A link touching a probe outside the universe is an error; the filter upstream
    /// should never let one through.
    pub fn shuffle(&mut self, links: &[ProbeLink], universe: &[ProbeId]) -> Result<Vec<ProbeLink>> {
        // canonical order, so that a seed fully determines the outcome
        let mut sorted = universe.to_vec();
        sorted.sort_unstable();
        let original = DynamicEnum::from(&sorted);
        let mut permuted = original.clone();
        permuted.shuffle(&mut self.rng);
        let mapping: HashMap<ProbeId, ProbeId> = original
            .get_vec()
            .iter()
            .copied()
            .zip(permuted.get_vec().iter().copied())
            .collect();

        let mut shuffled: Vec<ProbeLink> = Vec::with_capacity(links.len());
        for link in links {
            let first = remap(&mapping, link.first(), link.dataset())?;
            let second = remap(&mapping, link.second(), link.dataset())?;
            shuffled.push(link.with_probes(first, second));
        }

        let mut seconds: Vec<ProbeId> = shuffled.iter().map(|l| l.second()).collect();
        seconds.shuffle(&mut self.rng);
        Ok(shuffled
            .iter()
            .zip(seconds)
            .map(|(l, second)| l.with_probes(l.first(), second))
            .collect())
    }
}

fn remap(mapping: &HashMap<ProbeId, ProbeId>, probe: ProbeId, dataset: DatasetId) -> Result<ProbeId> {
    mapping
        .get(&probe)
        .copied()
        .ok_or(LinkError::ProbeOutsideUniverse { probe, dataset })
}

/// Gene links of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedGeneLinks {
    pub dataset: DatasetId,
    /// distinct gene pairs, sorted
    pub links: Vec<GeneLink>,
    /// probe links with an endpoint that has no usable gene
    pub missing: usize,
    /// candidate pairs joining a gene to itself
    pub self_links: usize,
}

/// Convert probe links into gene links.
///
/// Every combination of the two probes' genes is a candidate; candidates are kept
/// when both genes are in `known_genes`.
pub fn derive_gene_links(
    dataset: DatasetId,
    links: &[ProbeLink],
    probe_genes: &HashMap<ProbeId, HashSet<GeneId>>,
    known_genes: &HashSet<GeneId>,
) -> DerivedGeneLinks {
    let mut missing = 0;
    let mut self_links = 0;
    let mut seen: HashSet<GeneLink> = HashSet::new();

    for link in links {
        let (genes1, genes2) = match (
            probe_genes.get(&link.first()),
            probe_genes.get(&link.second()),
        ) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a, b),
            _ => {
                missing += 1;
                continue;
            }
        };
        for (g1, g2) in iproduct!(genes1.iter(), genes2.iter()) {
            if !known_genes.contains(g1) || !known_genes.contains(g2) {
                continue;
            }
            let gl = GeneLink::new(*g1, *g2);
            if gl.is_self_link() {
                self_links += 1;
                continue;
            }
            seen.insert(gl);
        }
    }

    let mut links: Vec<GeneLink> = seen.into_iter().collect();
    links.sort_unstable();
    DerivedGeneLinks {
        dataset,
        links,
        missing,
        self_links,
    }
}
