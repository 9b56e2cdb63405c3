//! Document-level types.

use super::Page;
use serde::{Deserialize, Serialize};

/// A parsed document: pages plus its outline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the source document (usually the file name)
    #[serde(default)]
    pub name: String,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// Document outline (bookmarks)
    #[serde(default)]
    pub outline: Vec<BookmarkNode>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Vec::new(),
            outline: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Add a top-level bookmark.
    pub fn add_bookmark(&mut self, node: BookmarkNode) {
        self.outline.push(node);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All bookmarks, flattened depth-first.
    pub fn bookmarks(&self) -> Vec<&BookmarkNode> {
        fn walk<'a>(nodes: &'a [BookmarkNode], out: &mut Vec<&'a BookmarkNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.outline, &mut out);
        out
    }

    /// Bookmarks whose destination is the given page (1-indexed).
    pub fn bookmarks_on_page(&self, page_num: u32) -> Vec<&BookmarkNode> {
        self.bookmarks()
            .into_iter()
            .filter(|b| b.page == Some(page_num))
            .collect()
    }
}

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkNode {
    /// Entry title
    pub title: String,

    /// Target page number (1-indexed); `None` for entries that do not point
    /// into the document (external links, named actions)
    #[serde(default)]
    pub page: Option<u32>,

    /// Nesting level (0 = top level)
    #[serde(default)]
    pub level: u8,

    /// Child entries
    #[serde(default)]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    /// Create a new bookmark.
    pub fn new(title: impl Into<String>, page: Option<u32>, level: u8) -> Self {
        Self {
            title: title.into(),
            page,
            level,
            children: Vec::new(),
        }
    }

    /// Add a child entry.
    pub fn add_child(&mut self, child: BookmarkNode) {
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new("a.pdf");
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.get_page(0).is_none());
        assert!(doc.get_page(1).is_none());
    }

    #[test]
    fn test_bookmarks_on_page() {
        let mut doc = Document::new("a.pdf");
        let mut chapter1 = BookmarkNode::new("Chapter 1", Some(1), 0);
        chapter1.add_child(BookmarkNode::new("Section 1.1", Some(2), 1));
        chapter1.add_child(BookmarkNode::new("Section 1.2", Some(2), 1));
        doc.add_bookmark(chapter1);
        doc.add_bookmark(BookmarkNode::new("Website", None, 0));

        assert_eq!(doc.bookmarks().len(), 4);
        let page2: Vec<&str> = doc
            .bookmarks_on_page(2)
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(page2, vec!["Section 1.1", "Section 1.2"]);
        assert!(doc.bookmarks_on_page(3).is_empty());
    }
}
