//! Probe coexpression data sources.
//!
//! The statistics core only sees [`ProbeCoexpressionSource`]. Two implementations are
//! provided: [`InMemorySource`], assembled programmatically, and [`TsvSource`], which
//! loads tab-delimited link and probe annotation files.

use crate::error::{LinkError, Result};
use crate::link::{DatasetId, GeneId, ProbeId, ProbeLink};
use crate::utils::{read_tsv, DynamicEnum};
use log::{debug, info};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Read access to probe-level coexpression links and probe annotations.
pub trait ProbeCoexpressionSource {
    /// probes measured on the platform of a dataset
    fn assayed_probes(&self, dataset: DatasetId) -> Result<HashSet<ProbeId>>;
    /// stored links of a dataset
    fn probe_coexpression(
        &self,
        dataset: DatasetId,
        taxon: &str,
        filter_non_specific: bool,
    ) -> Result<Vec<ProbeLink>>;
    /// genes of each probe; probes without genes may be absent from the map
    fn genes_for_probes(
        &self,
        probes: &HashSet<ProbeId>,
    ) -> Result<HashMap<ProbeId, HashSet<GeneId>>>;
    /// One-time preparation before repeated shuffled passes.
    fn prepare_for_shuffling(
        &self,
        _datasets: &[DatasetId],
        _taxon: &str,
        _filter_non_specific: bool,
    ) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    links: HashMap<DatasetId, Vec<ProbeLink>>,
    assayed: HashMap<DatasetId, HashSet<ProbeId>>,
    probe_genes: HashMap<ProbeId, HashSet<GeneId>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a dataset, possibly without links
    pub fn add_dataset(&mut self, dataset: DatasetId) -> &mut Self {
        self.links.entry(dataset).or_default();
        self
    }

    pub fn add_link(
        &mut self,
        dataset: DatasetId,
        first: ProbeId,
        second: ProbeId,
        score: f64,
    ) -> &mut Self {
        self.links
            .entry(dataset)
            .or_default()
            .push(ProbeLink::new(first, second, score, dataset));
        self
    }

    pub fn map_probe(&mut self, probe: ProbeId, gene: GeneId) -> &mut Self {
        self.probe_genes.entry(probe).or_default().insert(gene);
        self
    }

    /// Declare a probe as assayed in a dataset. Once any probe is declared for a
    /// dataset, only declared probes count as assayed there.
    pub fn assay(&mut self, dataset: DatasetId, probe: ProbeId) -> &mut Self {
        self.links.entry(dataset).or_default();
        self.assayed.entry(dataset).or_default().insert(probe);
        self
    }

    pub fn datasets(&self) -> Vec<DatasetId> {
        let mut ds: Vec<DatasetId> = self.links.keys().copied().collect();
        ds.sort();
        ds
    }

    pub fn genes(&self) -> HashSet<GeneId> {
        self.probe_genes.values().flatten().copied().collect()
    }

    fn dataset_links(&self, dataset: DatasetId) -> Result<&Vec<ProbeLink>> {
        self.links
            .get(&dataset)
            .ok_or_else(|| LinkError::Source(format!("no such dataset: {}", dataset)))
    }

    fn is_specific(&self, probe: ProbeId) -> bool {
        self.probe_genes
            .get(&probe)
            .map_or(true, |genes| genes.len() <= 1)
    }
}

impl ProbeCoexpressionSource for InMemorySource {
    fn assayed_probes(&self, dataset: DatasetId) -> Result<HashSet<ProbeId>> {
        let links = self.dataset_links(dataset)?;
        if let Some(probes) = self.assayed.get(&dataset) {
            return Ok(probes.clone());
        }
        Ok(links
            .iter()
            .flat_map(|l| [l.first(), l.second()])
            .collect())
    }

    fn probe_coexpression(
        &self,
        dataset: DatasetId,
        _taxon: &str,
        filter_non_specific: bool,
    ) -> Result<Vec<ProbeLink>> {
        let links = self.dataset_links(dataset)?;
        if !filter_non_specific {
            return Ok(links.clone());
        }
        Ok(links
            .iter()
            .filter(|l| self.is_specific(l.first()) && self.is_specific(l.second()))
            .copied()
            .collect())
    }

    fn genes_for_probes(
        &self,
        probes: &HashSet<ProbeId>,
    ) -> Result<HashMap<ProbeId, HashSet<GeneId>>> {
        Ok(probes
            .iter()
            .filter_map(|p| self.probe_genes.get(p).map(|g| (*p, g.clone())))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    dataset: String,
    probe1: String,
    probe2: String,
    score: f64,
    #[serde(default)]
    taxon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeGeneRecord {
    probe: String,
    gene: String,
}

#[derive(Debug, Deserialize)]
struct AssayRecord {
    dataset: String,
    probe: String,
}

/// Source backed by tab-delimited files; names are interned into numeric ids.
#[derive(Debug, Clone, Default)]
pub struct TsvSource {
    inner: InMemorySource,
    datasets: DynamicEnum<String>,
    probes: DynamicEnum<String>,
    genes: DynamicEnum<String>,
    dataset_taxon: HashMap<DatasetId, String>,
}

impl TsvSource {
    /// - links: `dataset probe1 probe2 score [taxon]`
    /// - probe_genes: `probe gene`, one row per mapping
    /// - assayed: `dataset probe`
    pub fn from_paths<P, Q, R>(links: P, probe_genes: Q, assayed: Option<R>) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let mut src = TsvSource::default();

        let mapping: Vec<ProbeGeneRecord> = read_tsv(probe_genes)?;
        for rec in mapping.into_iter() {
            let probe = src.probe_id_or_new(rec.probe);
            let gene = GeneId(src.genes.add_if_new(rec.gene) as u64);
            src.inner.map_probe(probe, gene);
        }

        let records: Vec<LinkRecord> = read_tsv(links)?;
        let nlinks = records.len();
        for rec in records.into_iter() {
            let dataset = src.dataset_id_or_new(rec.dataset);
            let first = src.probe_id_or_new(rec.probe1);
            let second = src.probe_id_or_new(rec.probe2);
            if let Some(taxon) = rec.taxon {
                src.dataset_taxon.entry(dataset).or_insert(taxon);
            }
            src.inner.add_link(dataset, first, second, rec.score);
        }

        if let Some(path) = assayed {
            let rows: Vec<AssayRecord> = read_tsv(path)?;
            for rec in rows.into_iter() {
                let dataset = src.dataset_id_or_new(rec.dataset);
                let probe = src.probe_id_or_new(rec.probe);
                src.inner.assay(dataset, probe);
            }
        }

        info!(
            "Loaded {} links in {} datasets; {} probes annotated to {} genes",
            nlinks,
            src.datasets.size(),
            src.probes.size(),
            src.genes.size()
        );
        Ok(src)
    }

    fn dataset_id_or_new(&mut self, name: String) -> DatasetId {
        DatasetId(self.datasets.add_if_new(name) as u64)
    }

    fn probe_id_or_new(&mut self, name: String) -> ProbeId {
        ProbeId(self.probes.add_if_new(name) as u64)
    }

    /// datasets in file order
    pub fn datasets(&self) -> Vec<DatasetId> {
        (0..self.datasets.size() as u64).map(DatasetId).collect()
    }

    pub fn genes(&self) -> Vec<GeneId> {
        (0..self.genes.size() as u64).map(GeneId).collect()
    }

    pub fn gene_id(&self, name: &str) -> Option<GeneId> {
        self.genes
            .index_of(&name.to_string())
            .map(|i| GeneId(i as u64))
    }

    pub fn gene_name(&self, gene: GeneId) -> Option<&str> {
        self.genes.elt_of(gene.0 as usize).map(|s| s.as_str())
    }

    pub fn dataset_name(&self, dataset: DatasetId) -> Option<&str> {
        self.datasets.elt_of(dataset.0 as usize).map(|s| s.as_str())
    }
}

impl ProbeCoexpressionSource for TsvSource {
    fn assayed_probes(&self, dataset: DatasetId) -> Result<HashSet<ProbeId>> {
        self.inner.assayed_probes(dataset)
    }

    fn probe_coexpression(
        &self,
        dataset: DatasetId,
        taxon: &str,
        filter_non_specific: bool,
    ) -> Result<Vec<ProbeLink>> {
        if let Some(t) = self.dataset_taxon.get(&dataset) {
            if !t.eq_ignore_ascii_case(taxon) {
                debug!("Dataset {} is {}, not {}; no links", dataset, t, taxon);
                return Ok(Vec::new());
            }
        }
        self.inner
            .probe_coexpression(dataset, taxon, filter_non_specific)
    }

    fn genes_for_probes(
        &self,
        probes: &HashSet<ProbeId>,
    ) -> Result<HashMap<ProbeId, HashSet<GeneId>>> {
        self.inner.genes_for_probes(probes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_in_memory_source() {
        let mut src = InMemorySource::new();
        src.add_link(DatasetId(1), ProbeId(1), ProbeId(2), 0.9)
            .add_link(DatasetId(1), ProbeId(2), ProbeId(3), -0.7)
            .map_probe(ProbeId(1), GeneId(10))
            .map_probe(ProbeId(2), GeneId(20))
            .map_probe(ProbeId(3), GeneId(30))
            .map_probe(ProbeId(3), GeneId(31));

        let assayed = src.assayed_probes(DatasetId(1)).unwrap();
        assert_eq!(assayed.len(), 3);
        assert_eq!(src.probe_coexpression(DatasetId(1), "human", false).unwrap().len(), 2);
        // probe 3 is non-specific
        assert_eq!(src.probe_coexpression(DatasetId(1), "human", true).unwrap().len(), 1);
        let map = src.genes_for_probes(&assayed).unwrap();
        assert_eq!(map[&ProbeId(3)].len(), 2);
        assert!(matches!(
            src.assayed_probes(DatasetId(2)),
            Err(LinkError::Source(_))
        ));
        assert_eq!(src.genes().len(), 4);
    }

    #[test]
    fn test_explicit_assay() {
        let mut src = InMemorySource::new();
        src.add_link(DatasetId(1), ProbeId(1), ProbeId(2), 0.9)
            .assay(DatasetId(1), ProbeId(1))
            .assay(DatasetId(1), ProbeId(5));
        let assayed = src.assayed_probes(DatasetId(1)).unwrap();
        assert!(assayed.contains(&ProbeId(5)));
        assert!(!assayed.contains(&ProbeId(2)));
    }

    #[test]
    fn test_tsv_source() {
        let mut links = tempfile::NamedTempFile::new().unwrap();
        writeln!(links, "dataset\tprobe1\tprobe2\tscore\ttaxon").unwrap();
        writeln!(links, "GSE1\tp1\tp2\t0.8\thuman").unwrap();
        writeln!(links, "GSE2\tp1\tp3\t-0.6\tmouse").unwrap();
        let mut genes = tempfile::NamedTempFile::new().unwrap();
        writeln!(genes, "probe\tgene").unwrap();
        writeln!(genes, "p1\tTP53\np2\tMDM2\np3\tCDKN1A").unwrap();

        let src = TsvSource::from_paths(links.path(), genes.path(), None::<&Path>).unwrap();
        let ds = src.datasets();
        assert_eq!(ds.len(), 2);
        assert_eq!(src.dataset_name(ds[0]), Some("GSE1"));
        assert_eq!(src.genes().len(), 3);
        let tp53 = src.gene_id("TP53").unwrap();
        assert_eq!(src.gene_name(tp53), Some("TP53"));

        assert_eq!(src.probe_coexpression(ds[0], "human", false).unwrap().len(), 1);
        assert!(src.probe_coexpression(ds[1], "human", false).unwrap().is_empty());
        assert_eq!(src.probe_coexpression(ds[1], "Mouse", false).unwrap().len(), 1);
    }
}
