//! Support histogram report.
//!
//! ```text
//! Support      1   2   ...  N
//! RealLinks    ...                 (real pass present)
//! ShuffleMean  ...                 (real pass and shuffled runs present)
//! ShuffleRun_1 ...
//! ```

use crate::error::Result;
use crate::stats::LinkConfirmationStatistics;
use statrs::statistics::Statistics;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LinkReport {
    max_support: usize,
    real: Option<LinkConfirmationStatistics>,
    shuffled: Vec<LinkConfirmationStatistics>,
}

impl LinkReport {
    /// `max_support` is normally the number of datasets analysed
    pub fn new(max_support: usize) -> Self {
        LinkReport {
            max_support,
            real: None,
            shuffled: Vec::new(),
        }
    }
    pub fn set_real(&mut self, real: LinkConfirmationStatistics) {
        self.real = Some(real);
    }
    pub fn add_shuffled(&mut self, run: LinkConfirmationStatistics) {
        self.shuffled.push(run);
    }
    pub fn real(&self) -> Option<&LinkConfirmationStatistics> {
        self.real.as_ref()
    }
    pub fn shuffled(&self) -> &[LinkConfirmationStatistics] {
        &self.shuffled
    }
    pub fn max_support(&self) -> usize {
        self.max_support
    }

    /// Per support level, the mean over runs of shuffled / real pair counts.
    /// A level without real pairs contributes 0 for every run.
    pub fn shuffle_mean(&self) -> Option<Vec<f64>> {
        let real = self.real.as_ref()?;
        if self.shuffled.is_empty() {
            return None;
        }
        let means = (1..=self.max_support)
            .map(|level| {
                let r = real.rep_count(level);
                let ratios: Vec<f64> = self
                    .shuffled
                    .iter()
                    .map(|s| {
                        if r == 0 {
                            0.0
                        } else {
                            s.rep_count(level) as f64 / r as f64
                        }
                    })
                    .collect();
                ratios.iter().mean()
            })
            .collect();
        Some(means)
    }

    fn count_row(&self, name: String, lcs: &LinkConfirmationStatistics) -> Vec<String> {
        std::iter::once(name)
            .chain((1..=self.max_support).map(|level| lcs.rep_count(level).to_string()))
            .collect()
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        let header: Vec<String> = std::iter::once("Support".to_string())
            .chain((1..=self.max_support).map(|level| level.to_string()))
            .collect();
        wtr.write_record(&header)?;
        if let Some(real) = &self.real {
            wtr.write_record(&self.count_row("RealLinks".to_string(), real))?;
        }
        if let Some(means) = self.shuffle_mean() {
            let row: Vec<String> = std::iter::once("ShuffleMean".to_string())
                .chain(means.iter().map(|m| format!("{:.4}", m)))
                .collect();
            wtr.write_record(&row)?;
        }
        for (i, run) in self.shuffled.iter().enumerate() {
            wtr.write_record(&self.count_row(format!("ShuffleRun_{}", i + 1), run))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file))
    }
}
