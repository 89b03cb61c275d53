use std::collections::HashMap;

use super::detector::Detection;

/// Number of visually distinguishable slot classes.
pub const SLOT_COUNT: usize = 5;

// Catalog entry
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub text: String,
    pub slot: usize,
    pub stale: bool,
}

impl CatalogEntry {
    pub fn is_url(&self) -> bool {
        self.text.starts_with("https://")
    }
}

// Catalog
//------------------------------------------------------------------------------

/// Deduplicated messages seen during a scanning session, in first-seen order.
///
/// Entries missing from the latest pass are kept and marked stale so they
/// stay selectable.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    last_pass: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(&mut self, detections: &[Detection]) -> &Self {
        self.entries.iter_mut().for_each(|e| e.stale = true);

        for (i, det) in detections.iter().enumerate() {
            let slot = i % SLOT_COUNT;
            match self.index.get(det.text()) {
                Some(&pos) => {
                    let entry = &mut self.entries[pos];
                    entry.slot = slot;
                    entry.stale = false;
                }
                None => {
                    self.index.insert(det.text().to_string(), self.entries.len());
                    self.entries.push(CatalogEntry {
                        text: det.text().to_string(),
                        slot,
                        stale: false,
                    });
                }
            }
        }

        self.last_pass = detections.len();
        self
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.last_pass = 0;
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, text: &str) -> Option<&CatalogEntry> {
        self.index.get(text).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of detections in the most recent pass.
    pub fn last_pass(&self) -> usize {
        self.last_pass
    }

    /// Position of the first entry refreshed by the most recent pass.
    pub fn first_fresh(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.stale)
    }
}
