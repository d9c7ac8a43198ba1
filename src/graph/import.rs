use std::collections::HashMap;

use crate::base::ObjRef;

/// Bookkeeping for cloning objects from one document into another.
///
/// Maps identities in the source document to the identities their copies received in the
/// target, so that an object referenced from several places is imported only once. A row of
/// per-page proxy slots supports the common case of importing pages: the slot is filled once
/// the page's copy exists and consulted when later imports reference that page.
#[derive(Debug, Default)]
pub struct ImportedObjectTable {
    map: HashMap<ObjRef, ObjRef>,
    page_proxies: Vec<Option<ObjRef>>,
}

impl ImportedObjectTable {
    /// Creates a table for a source document with `page_count` pages.
    pub fn new(page_count: usize) -> Self {
        ImportedObjectTable {
            map: HashMap::new(),
            page_proxies: vec![None; page_count],
        }
    }

    /// Has this source object been imported already?
    pub fn contains(&self, external: &ObjRef) -> bool {
        self.map.contains_key(external)
    }

    /// Records that the source object `external` was copied as `internal` in the target
    /// document. A repeated import of the same source object keeps the first mapping.
    pub fn add(&mut self, external: ObjRef, internal: ObjRef) {
        self.map.entry(external).or_insert(internal);
    }

    /// The target-document identity of a previously imported source object.
    pub fn lookup(&self, external: &ObjRef) -> Option<ObjRef> {
        self.map.get(external).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The imported copy of the source document's page number `index` (zero-based), if that
    /// page has been imported.
    pub fn page_proxy(&self, index: usize) -> Option<ObjRef> {
        self.page_proxies.get(index).copied().flatten()
    }

    pub fn set_page_proxy(&mut self, index: usize, internal: ObjRef) {
        if let Some(slot) = self.page_proxies.get_mut(index) {
            *slot = Some(internal);
        }
    }
}
