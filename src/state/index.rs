//! The page index built by the crawl phase
//!
//! Maps each successfully fetched sitemap URL to what was extracted from it.
//! The index keeps sitemap order so validation reports pages in the order the
//! sitemap lists them.

use std::collections::{HashMap, HashSet};

/// Everything extracted from one indexed page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// The sitemap URL the page was fetched from
    pub url: String,

    /// Text of the page's `<title>`
    pub title: String,

    /// Links containing a fragment, absolutized and denylist-filtered
    pub anchor_links: Vec<String>,

    /// Links without a fragment, absolutized
    pub normal_links: Vec<String>,

    /// `id` and `name` attribute values found in the markup
    pub anchor_targets: HashSet<String>,

    /// Anchor links inside the domain that were authored as absolute URLs
    pub absolute_links: Vec<String>,
}

impl PageRecord {
    /// Returns true if the page has an element the fragment can point to
    pub fn has_target(&self, fragment: &str) -> bool {
        self.anchor_targets.contains(fragment)
    }
}

/// Insertion-ordered map from URL to [`PageRecord`]
#[derive(Debug, Default)]
pub struct PageIndex {
    records: Vec<PageRecord>,
    positions: HashMap<String, usize>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record keyed by its URL
    ///
    /// Keys are unique: if the URL is already indexed the existing record is
    /// kept and false is returned.
    pub fn insert(&mut self, record: PageRecord) -> bool {
        if self.positions.contains_key(&record.url) {
            tracing::debug!("Page {} already indexed, keeping the first record", record.url);
            return false;
        }
        self.positions.insert(record.url.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.positions.get(url).map(|&i| &self.records[i])
    }

    pub fn contains(&self, url: &str) -> bool {
        self.positions.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion (sitemap) order
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.records.iter()
    }
}
