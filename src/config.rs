//! Run configuration for link statistics.

use crate::error::{LinkError, Result};
use serde::{Deserialize, Serialize};

/// Configuration of one analysis invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Taxon passed to the data source when fetching links.
    pub taxon: String,
    /// Drop probes that map to more than one gene.
    pub filter_non_specific: bool,
    /// Number of shuffled passes.
    pub num_iterations: usize,
    /// Also run the unshuffled baseline.
    pub real_analysis: bool,
    /// Dump per-run gene links.
    pub output_shuffled_data: bool,
    /// Minimum support of gene pairs written to link dumps.
    pub stringency: usize,
    /// Master seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Worker threads for shuffled passes.
    pub threads: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            taxon: "human".to_string(),
            filter_non_specific: false,
            num_iterations: 2,
            real_analysis: false,
            output_shuffled_data: false,
            stringency: 2,
            seed: None,
            threads: 1,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(LinkError::InvalidParameter(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.stringency == 0 {
            return Err(LinkError::InvalidParameter(
                "stringency must be at least 1".to_string(),
            ));
        }
        if self.num_iterations == 0 && !self.real_analysis {
            return Err(LinkError::InvalidParameter(
                "no shuffle iterations and no real analysis requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());

        let idle = AnalysisConfig {
            num_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(idle.validate(), Err(LinkError::InvalidParameter(_))));

        let real_only = AnalysisConfig {
            num_iterations: 0,
            real_analysis: true,
            ..Default::default()
        };
        assert!(real_only.validate().is_ok());

        let no_threads = AnalysisConfig {
            threads: 0,
            ..Default::default()
        };
        assert!(no_threads.validate().is_err());
    }
}
