use crate::error::{LinkError, Result};
use crate::link::{DatasetId, GeneId, GeneLink};
use crate::utils::DynamicEnum;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// Histogram of gene pairs by support, for levels `1..=max_support`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfirmationStatistics {
    // counts[k] holds the pairs with support k + 1
    counts: Vec<usize>,
}

impl LinkConfirmationStatistics {
    pub fn new(max_support: usize) -> Self {
        LinkConfirmationStatistics {
            counts: vec![0; max_support],
        }
    }
    /// count one pair with the given support; support 0 is ignored
    pub fn add(&mut self, support: usize) {
        if support == 0 {
            return;
        }
        if support > self.counts.len() {
            self.counts.resize(support, 0);
        }
        self.counts[support - 1] += 1;
    }
    pub fn max_support(&self) -> usize {
        self.counts.len()
    }
    /// pairs with exactly `support`
    pub fn rep_count(&self, support: usize) -> usize {
        if support == 0 {
            return 0;
        }
        self.counts.get(support - 1).copied().unwrap_or(0)
    }
    /// pairs with at least `support`
    pub fn cumulative_rep_count(&self, support: usize) -> usize {
        let from = support.max(1) - 1;
        self.counts.iter().skip(from).sum()
    }
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
    /// counts for levels 1..=max_support
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }
}

/// Running tally of gene pair support across a fixed set of datasets.
#[derive(Debug, Clone)]
pub struct LinkStatistics {
    datasets: DynamicEnum<DatasetId>,
    genes: HashSet<GeneId>,
    // indices of the datasets each pair was linked in, ascending
    support: HashMap<GeneLink, Vec<usize>>,
}

impl LinkStatistics {
    pub fn new<I>(datasets: &[DatasetId], genes: I) -> Self
    where
        I: IntoIterator<Item = GeneId>,
    {
        LinkStatistics {
            datasets: DynamicEnum::from(datasets),
            genes: genes.into_iter().collect(),
            support: HashMap::new(),
        }
    }

    /// Credit `links` to `dataset`, each pair at most once per dataset.
    /// Returns the number of pairs newly credited. Pairs with a gene outside the
    /// universe are ignored.
    pub fn add_links(&mut self, links: &[GeneLink], dataset: DatasetId) -> Result<usize> {
        let idx = self
            .datasets
            .index_of(&dataset)
            .ok_or(LinkError::UnknownDataset(dataset))?;
        let mut added = 0;
        for link in links {
            if !self.genes.contains(&link.first()) || !self.genes.contains(&link.second()) {
                continue;
            }
            let seen = self.support.entry(*link).or_default();
            if let Err(pos) = seen.binary_search(&idx) {
                seen.insert(pos, idx);
                added += 1;
            }
        }
        Ok(added)
    }

    /// number of datasets the pair was linked in
    pub fn support(&self, a: GeneId, b: GeneId) -> usize {
        self.support
            .get(&GeneLink::new(a, b))
            .map_or(0, |ds| ds.len())
    }

    /// datasets the pair was linked in
    pub fn datasets_of(&self, a: GeneId, b: GeneId) -> Vec<DatasetId> {
        self.support
            .get(&GeneLink::new(a, b))
            .map(|ds| {
                ds.iter()
                    .filter_map(|&i| self.datasets.elt_of(i).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn num_datasets(&self) -> usize {
        self.datasets.size()
    }

    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    /// distinct pairs with support >= 1
    pub fn num_pairs(&self) -> usize {
        self.support.len()
    }

    pub fn link_confirmation_stats(&self) -> LinkConfirmationStatistics {
        let mut lcs = LinkConfirmationStatistics::new(self.num_datasets());
        self.support.values().for_each(|ds| lcs.add(ds.len()));
        lcs
    }

    /// Write `gene1 gene2 support` rows for pairs with support >= `min_support`,
    /// highest support first. Returns the number of rows.
    pub fn write_links<W, F>(&self, writer: W, min_support: usize, label: F) -> Result<usize>
    where
        W: Write,
        F: Fn(GeneId) -> String,
    {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        wtr.write_record(["gene1", "gene2", "support"])?;
        let mut n = 0;
        for (link, ds) in self
            .support
            .iter()
            .filter(|(_, ds)| ds.len() >= min_support)
            .sorted_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(b.0)))
        {
            wtr.write_record([
                label(link.first()),
                label(link.second()),
                ds.len().to_string(),
            ])?;
            n += 1;
        }
        wtr.flush()?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gl(a: u64, b: u64) -> GeneLink {
        GeneLink::new(GeneId(a), GeneId(b))
    }

    fn datasets(n: u64) -> Vec<DatasetId> {
        (1..=n).map(DatasetId).collect()
    }

    fn genes(n: u64) -> Vec<GeneId> {
        (1..=n).map(GeneId).collect()
    }

    #[test]
    fn test_same_pair_in_three_datasets() {
        let ds = datasets(3);
        let mut stats = LinkStatistics::new(&ds, genes(2));
        for &d in ds.iter() {
            assert_eq!(stats.add_links(&[gl(1, 2)], d).unwrap(), 1);
        }
        assert_eq!(stats.support(GeneId(2), GeneId(1)), 3);
        assert_eq!(stats.datasets_of(GeneId(1), GeneId(2)), ds);
        let lcs = stats.link_confirmation_stats();
        assert_eq!(lcs.counts(), &[0, 0, 1]);
        assert_eq!(lcs.rep_count(3), 1);
        assert_eq!(lcs.cumulative_rep_count(1), 1);
    }

    #[test]
    fn test_dedup_within_dataset() {
        let ds = datasets(2);
        let mut stats = LinkStatistics::new(&ds, genes(3));
        assert_eq!(stats.add_links(&[gl(1, 2), gl(2, 1)], ds[0]).unwrap(), 1);
        assert_eq!(stats.add_links(&[gl(1, 2)], ds[0]).unwrap(), 0);
        assert_eq!(stats.support(GeneId(1), GeneId(2)), 1);
    }

    #[test]
    fn test_empty_batch() {
        let ds = datasets(2);
        let mut stats = LinkStatistics::new(&ds, genes(3));
        assert_eq!(stats.add_links(&[], ds[1]).unwrap(), 0);
        assert_eq!(stats.num_pairs(), 0);
        assert_eq!(stats.link_confirmation_stats().total(), 0);
    }

    #[test]
    fn test_unknown_dataset_and_genes() {
        let mut stats = LinkStatistics::new(&datasets(1), genes(2));
        assert!(matches!(
            stats.add_links(&[gl(1, 2)], DatasetId(9)),
            Err(LinkError::UnknownDataset(DatasetId(9)))
        ));
        // gene 5 is outside the universe
        assert_eq!(stats.add_links(&[gl(1, 5)], DatasetId(1)).unwrap(), 0);
        assert_eq!(stats.num_genes(), 2);
    }

    #[test]
    fn test_support_monotone_and_bounded() {
        let ds = datasets(5);
        let mut stats = LinkStatistics::new(&ds, genes(4));
        let batches = [
            vec![gl(1, 2), gl(3, 4)],
            vec![gl(1, 2)],
            vec![gl(1, 3), gl(1, 2), gl(3, 4)],
            vec![],
            vec![gl(1, 2), gl(2, 4)],
        ];
        let pairs = [gl(1, 2), gl(3, 4), gl(1, 3), gl(2, 4)];
        let mut last = vec![0; pairs.len()];
        for (d, batch) in ds.iter().zip(batches.iter()) {
            stats.add_links(batch, *d).unwrap();
            for (i, p) in pairs.iter().enumerate() {
                let s = stats.support(p.first(), p.second());
                assert!(s >= last[i]);
                assert!(s <= stats.num_datasets());
                last[i] = s;
            }
        }
        assert_eq!(last, vec![4, 2, 1, 1]);

        // conservation: all pairs appear at exactly one level
        let lcs = stats.link_confirmation_stats();
        assert_eq!(lcs.total(), stats.num_pairs());
        assert_eq!(lcs.counts(), &[2, 1, 0, 1, 0]);
        assert_eq!(lcs.cumulative_rep_count(2), 2);
        assert_eq!(lcs.rep_count(0), 0);
        assert_eq!(lcs.rep_count(9), 0);
    }

    #[test]
    fn test_write_links() {
        let ds = datasets(2);
        let mut stats = LinkStatistics::new(&ds, genes(3));
        stats.add_links(&[gl(1, 2), gl(2, 3)], ds[0]).unwrap();
        stats.add_links(&[gl(2, 3)], ds[1]).unwrap();
        let mut buf = Vec::new();
        let n = stats
            .write_links(&mut buf, 1, |g| format!("G{}", g))
            .unwrap();
        assert_eq!(n, 2);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "gene1\tgene2\tsupport\nG2\tG3\t2\nG1\tG2\t1\n");

        let n = stats.write_links(std::io::sink(), 2, |g| g.to_string()).unwrap();
        assert_eq!(n, 1);
    }
}
