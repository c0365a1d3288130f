//! Document-level types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PageRecord;
use crate::error::{Error, Result};

/// Processed pages keyed by page index.
///
/// Keys are unique; iteration is always in ascending page order, which keeps
/// serialized output stable regardless of the order pages finished in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Page records by 0-based page index
    pub pages: BTreeMap<usize, PageRecord>,
}

impl DocumentModel {
    /// Create a new empty document model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished page. Each page index may be committed only once.
    pub fn commit(&mut self, record: PageRecord) -> Result<()> {
        let page_idx = record.page_idx;
        if self.pages.contains_key(&page_idx) {
            return Err(Error::Other(format!(
                "page {} was committed twice",
                page_idx
            )));
        }
        self.pages.insert(page_idx, record);
        Ok(())
    }

    /// Move every page of `other` into this model.
    pub fn merge(&mut self, other: DocumentModel) -> Result<()> {
        for (_, record) in other.pages {
            self.commit(record)?;
        }
        Ok(())
    }

    /// Get a page by index.
    pub fn get(&self, page_idx: usize) -> Option<&PageRecord> {
        self.pages.get(&page_idx)
    }

    /// Number of processed pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if no pages were processed.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .values()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
