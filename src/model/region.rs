//! Candidate regions.

use super::{BlockCategory, Rect};
use serde::{Deserialize, Serialize};

/// A rectangular page area to be classified.
///
/// Ground-truth regions carry their annotated category; regions built for
/// inference carry none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region bounds in page space
    pub bound: Rect,

    /// Annotated category, if known
    pub category: Option<BlockCategory>,
}

impl Region {
    /// Create an unlabeled region.
    pub fn new(bound: Rect) -> Self {
        Self {
            bound,
            category: None,
        }
    }

    /// Create a labeled region.
    pub fn labeled(bound: Rect, category: BlockCategory) -> Self {
        Self {
            bound,
            category: Some(category),
        }
    }
}
