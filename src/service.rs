//! Real and shuffled link statistics passes over all datasets.

use crate::algorithm::{derive_gene_links, DerivedGeneLinks, ProbeShuffler};
use crate::config::AnalysisConfig;
use crate::error::{LinkError, Result};
use crate::filter::{filter_probes, restrict_links, shuffle_universe};
use crate::link::{DatasetId, GeneId};
use crate::report::LinkReport;
use crate::source::ProbeCoexpressionSource;
use crate::stats::{LinkConfirmationStatistics, LinkStatistics};
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;

pub struct LinkStatisticsService<'a, S> {
    source: &'a S,
    datasets: Vec<DatasetId>,
    genes: HashSet<GeneId>,
    config: &'a AnalysisConfig,
}

impl<'a, S> LinkStatisticsService<'a, S>
where
    S: ProbeCoexpressionSource + Sync,
{
    pub fn new<I>(source: &'a S, datasets: &[DatasetId], genes: I, config: &'a AnalysisConfig) -> Self
    where
        I: IntoIterator<Item = GeneId>,
    {
        LinkStatisticsService {
            source,
            datasets: datasets.to_vec(),
            genes: genes.into_iter().collect(),
            config,
        }
    }

    /// Tally the links as stored.
    pub fn analyze_real(&self) -> Result<LinkStatistics> {
        self.analyze::<SmallRng>(None)
    }

    /// Tally the links after shuffling each dataset's probes.
    pub fn analyze_shuffled<R: Rng>(&self, shuffler: &mut ProbeShuffler<R>) -> Result<LinkStatistics> {
        self.analyze(Some(shuffler))
    }

    fn analyze<R: Rng>(&self, mut shuffler: Option<&mut ProbeShuffler<R>>) -> Result<LinkStatistics> {
        let mut stats = LinkStatistics::new(&self.datasets, self.genes.iter().copied());
        let mut missing = 0;
        let mut self_links = 0;
        let mut skipped = 0;
        let mut empty = 0;
        for &dataset in self.datasets.iter() {
            let derived = match self.dataset_links(dataset, shuffler.as_deref_mut()) {
                Ok(d) => d,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Skipping dataset {}: {}", dataset, e);
                    skipped += 1;
                    continue;
                }
            };
            missing += derived.missing;
            self_links += derived.self_links;
            let added = stats.add_links(&derived.links, dataset)?;
            if added == 0 {
                empty += 1;
            }
            debug!("Dataset {}: {} gene links", dataset, added);
        }
        if missing > 0 {
            warn!("{} probe links had an endpoint without usable genes", missing);
        }
        if self_links > 0 {
            info!("{} candidate gene pairs joined a gene to itself", self_links);
        }
        if skipped > 0 || empty > 0 {
            warn!(
                "{} datasets skipped, {} datasets without usable links",
                skipped, empty
            );
        }
        Ok(stats)
    }

    fn dataset_links<R: Rng>(
        &self,
        dataset: DatasetId,
        shuffler: Option<&mut ProbeShuffler<R>>,
    ) -> Result<DerivedGeneLinks> {
        let assayed = self.source.assayed_probes(dataset)?;
        let probe_genes = self.source.genes_for_probes(&assayed)?;
        let filtered = filter_probes(&probe_genes, &self.genes, self.config.filter_non_specific);
        let links = self.source.probe_coexpression(
            dataset,
            &self.config.taxon,
            self.config.filter_non_specific,
        )?;
        let (mut links, dropped) = restrict_links(&links, &filtered);
        debug!(
            "Dataset {}: {} of {} probes usable, {} links dropped",
            dataset,
            filtered.len(),
            assayed.len(),
            dropped
        );
        if let Some(s) = shuffler {
            links = s.shuffle(&links, &shuffle_universe(&filtered))?;
        }
        let mut derived = derive_gene_links(dataset, &links, &filtered, &self.genes);
        // links lost to filtering had an endpoint without a usable gene
        derived.missing += dropped;
        Ok(derived)
    }

    /// Run `num_iterations` independent shuffled passes.
    ///
    /// Each pass gets its own generator, seeded from a master generator, so results
    /// do not depend on the number of threads. `on_run` sees every pass's statistics
    /// (1-based run index) before they are reduced to a histogram.
    pub fn shuffle_runs<F>(&self, on_run: F) -> Result<Vec<LinkConfirmationStatistics>>
    where
        F: Fn(usize, &LinkStatistics) -> Result<()> + Sync,
    {
        self.config.validate()?;
        let n = self.config.num_iterations;
        if n == 0 {
            return Ok(Vec::new());
        }
        self.source.prepare_for_shuffling(
            &self.datasets,
            &self.config.taxon,
            self.config.filter_non_specific,
        )?;

        let mut master = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..n).map(|_| master.gen()).collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| LinkError::InvalidParameter(e.to_string()))?;

        pool.install(|| {
            seeds
                .par_iter()
                .enumerate()
                .map(|(i, &seed)| -> Result<LinkConfirmationStatistics> {
                    let start = Instant::now();
                    let mut shuffler = ProbeShuffler::from_seed(seed);
                    let stats = self.analyze_shuffled(&mut shuffler)?;
                    on_run(i + 1, &stats)?;
                    info!(
                        "Shuffle run {}/{}: {} gene pairs in {:.2?}",
                        i + 1,
                        n,
                        stats.num_pairs(),
                        start.elapsed()
                    );
                    Ok(stats.link_confirmation_stats())
                })
                .collect::<Result<Vec<_>>>()
        })
    }

    /// Real pass if configured, then the shuffled passes.
    pub fn run<F, G>(&self, on_real: G, on_run: F) -> Result<LinkReport>
    where
        F: Fn(usize, &LinkStatistics) -> Result<()> + Sync,
        G: FnOnce(&LinkStatistics) -> Result<()>,
    {
        self.config.validate()?;
        let mut report = LinkReport::new(self.datasets.len());
        if self.config.real_analysis {
            let start = Instant::now();
            let stats = self.analyze_real()?;
            info!(
                "Real analysis: {} gene pairs over {} genes in {:.2?}",
                stats.num_pairs(),
                stats.num_genes(),
                start.elapsed()
            );
            on_real(&stats)?;
            report.set_real(stats.link_confirmation_stats());
        }
        for lcs in self.shuffle_runs(on_run)? {
            report.add_shuffled(lcs);
        }
        Ok(report)
    }
}
