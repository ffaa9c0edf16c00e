//! The three dataset partitions.

use serde::Serialize;
use std::fmt;

/// One of the three disjoint dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    /// All splits, in the order the converter writes them.
    pub const PROCESSING_ORDER: [Split; 3] = [Split::Validation, Split::Train, Split::Test];

    /// The name used for the split directory and shard file prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
