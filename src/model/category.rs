//! Structural block categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of block categories.
pub const CATEGORY_COUNT: usize = 5;

/// Structural category of a page block.
///
/// The numeric ids are part of every persisted feature table and model;
/// they never change between schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    /// Body text
    Text = 0,
    /// Heading or title
    Title = 1,
    /// List item
    List = 2,
    /// Table
    Table = 3,
    /// Image or figure
    Image = 4,
}

impl BlockCategory {
    /// All categories in id order.
    pub const ALL: [BlockCategory; CATEGORY_COUNT] = [
        BlockCategory::Text,
        BlockCategory::Title,
        BlockCategory::List,
        BlockCategory::Table,
        BlockCategory::Image,
    ];

    /// Stable numeric id.
    pub fn id(self) -> usize {
        self as usize
    }

    /// Look up a category by id.
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            BlockCategory::Text => "text",
            BlockCategory::Title => "title",
            BlockCategory::List => "list",
            BlockCategory::Table => "table",
            BlockCategory::Image => "image",
        }
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
