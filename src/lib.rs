//! Coexpression link support statistics.
//!
//! Counts, for every gene pair, the number of datasets in which the pair is linked
//! (its *support*), and estimates the support expected by chance by repeating the
//! tally on degree-preserving shuffles of the probe-level links.
//!
//! - `source`: probe links and probe annotations ([`ProbeCoexpressionSource`])
//! - `filter`: restrict probes to a gene universe
//! - `algorithm`: probe shuffling and probe-to-gene link conversion
//! - `stats`: support tally and histograms
//! - `service`: real and shuffled passes over all datasets
//! - `report`: tab-delimited summary

pub mod algorithm;
pub mod config;
pub mod error;
pub mod filter;
pub mod link;
pub mod report;
pub mod service;
pub mod source;
pub mod stats;
pub mod utils;

pub use algorithm::{derive_gene_links, DerivedGeneLinks, ProbeShuffler};
pub use config::AnalysisConfig;
pub use error::{LinkError, Result};
pub use link::{DatasetId, GeneId, GeneLink, ProbeId, ProbeLink};
pub use report::LinkReport;
pub use service::LinkStatisticsService;
pub use source::{InMemorySource, ProbeCoexpressionSource, TsvSource};
pub use stats::{LinkConfirmationStatistics, LinkStatistics};
