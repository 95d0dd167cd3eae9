//! Error types for link statistics.

use crate::link::{DatasetId, ProbeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("link in dataset {dataset} refers to probe {probe}, which is outside the shuffle universe")]
    ProbeOutsideUniverse { probe: ProbeId, dataset: DatasetId },

    #[error("dataset {0} is not part of this analysis")]
    UnknownDataset(DatasetId),

    #[error("data source error: {0}")]
    Source(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl LinkError {
    /// Whether the error must abort the whole pass. Only data source failures are
    /// confined to the dataset they occurred in.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LinkError::Source(_))
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
