//! Probe, gene and dataset ids and the links between them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// probe (composite sequence) on a platform
    ProbeId
);
id_type!(GeneId);
id_type!(
    /// expression experiment the links were computed in
    DatasetId
);

/// A coexpression link between two probes, found in one dataset.
/// The pair is unordered; `first`/`second` only name the two slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeLink {
    first: ProbeId,
    second: ProbeId,
    score: f64,
    dataset: DatasetId,
}

impl ProbeLink {
    pub fn new(first: ProbeId, second: ProbeId, score: f64, dataset: DatasetId) -> Self {
        ProbeLink {
            first,
            second,
            score,
            dataset,
        }
    }
    pub fn first(&self) -> ProbeId {
        self.first
    }
    pub fn second(&self) -> ProbeId {
        self.second
    }
    pub fn score(&self) -> f64 {
        self.score
    }
    pub fn dataset(&self) -> DatasetId {
        self.dataset
    }
    /// same score and dataset, new endpoints
    pub fn with_probes(&self, first: ProbeId, second: ProbeId) -> Self {
        ProbeLink {
            first,
            second,
            ..*self
        }
    }
}

/// Unordered gene pair; always stored with `first <= second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeneLink {
    first: GeneId,
    second: GeneId,
}

impl GeneLink {
    pub fn new(a: GeneId, b: GeneId) -> Self {
        if a <= b {
            GeneLink {
                first: a,
                second: b,
            }
        } else {
            GeneLink {
                first: b,
                second: a,
            }
        }
    }
    pub fn first(&self) -> GeneId {
        self.first
    }
    pub fn second(&self) -> GeneId {
        self.second
    }
    pub fn is_self_link(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for GeneLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}
