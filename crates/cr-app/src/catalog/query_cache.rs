//! Keyed result cache with stale-while-revalidate semantics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cr_core::clip::PageResult;
use cr_core::ports::ClipStorePort;
use cr_core::EngineError;

/// Fingerprint of one cached catalog query.
///
/// The search term is normalized on construction: surrounding whitespace is
/// trimmed and an empty term becomes `None`, so a cleared search box and an
/// absent search hit the same cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    page: usize,
    search: Option<String>,
}

impl QueryKey {
    pub fn new(page: usize, search: &str) -> Self {
        let trimmed = search.trim();
        Self {
            page: page.max(1),
            search: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

#[derive(Default)]
struct Slot {
    /// Last-known-good result. Survives failed refreshes and staleness.
    result: Option<PageResult>,
    fresh: bool,
    in_flight: bool,
    /// Monotonic per-key issuance counter. A completion may only write the
    /// slot if it carries the latest issued sequence number.
    latest_seq: u64,
    /// Bumped on every invalidation. A completion whose fetch was issued
    /// under an older generation may still store its payload as the
    /// last-known-good value, but never as fresh.
    invalidation_gen: u64,
}

/// Cache of fetched catalog pages, keyed by `(page, normalized search)`.
///
/// Methods take `&self`; the slot map lives behind a mutex that is never
/// held across an await, so any number of logical fetches can be in flight
/// while the UI keeps reading stale entries for display.
pub struct QueryCache {
    store: Arc<dyn ClipStorePort>,
    page_size: usize,
    slots: Mutex<HashMap<QueryKey, Slot>>,
}

/// Grid size of the original catalog view.
pub const DEFAULT_PAGE_SIZE: usize = 16;

impl QueryCache {
    pub fn new(store: Arc<dyn ClipStorePort>) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: Arc<dyn ClipStorePort>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Last-known-good result for `key`, fresh or stale. This is what the
    /// view renders immediately while a revalidation is in flight, instead
    /// of collapsing to a loading state on every key change.
    pub fn cached(&self, key: &QueryKey) -> Option<PageResult> {
        let slots = self.slots.lock().unwrap();
        slots.get(key).and_then(|slot| slot.result.clone())
    }

    /// Return the cached result if fresh, otherwise fetch.
    ///
    /// The fetch is guarded by a per-key sequence number taken at issuance:
    /// if a newer request for the same key is issued while this one is in
    /// flight, this completion (success or failure) does not write the slot.
    /// An invalidation landing mid-flight demotes the completion's payload
    /// to last-known-good (stored, but stale). A failed fetch keeps the
    /// previous value, marks the slot stale and surfaces the error.
    pub async fn get_or_fetch(&self, key: &QueryKey) -> Result<PageResult, EngineError> {
        let (seq, issued_gen) = {
            let mut slots = self.slots.lock().unwrap();
            let slot = slots.entry(key.clone()).or_default();
            if slot.fresh {
                if let Some(result) = &slot.result {
                    return Ok(result.clone());
                }
            }
            if slot.in_flight {
                // A revalidation is already underway; keep showing the stale
                // entry rather than stacking a duplicate request.
                if let Some(result) = &slot.result {
                    return Ok(result.clone());
                }
            }
            slot.in_flight = true;
            slot.latest_seq += 1;
            (slot.latest_seq, slot.invalidation_gen)
        };

        let fetched = self
            .store
            .pull_clips(key.page(), self.page_size, key.search())
            .await;

        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(key.clone()).or_default();

        if slot.latest_seq != seq {
            // Superseded by a request issued later. Whatever that request
            // stored (or will store) wins; this completion is discarded.
            log::debug!(
                "discarding superseded fetch for page {} (seq {seq} < {})",
                key.page(),
                slot.latest_seq
            );
            if let Some(result) = &slot.result {
                return Ok(result.clone());
            }
            return match fetched {
                Ok(page) => Ok(page),
                Err(err) => Err(EngineError::backend(err)),
            };
        }

        slot.in_flight = false;
        match fetched {
            Ok(page) => {
                slot.result = Some(page.clone());
                // An invalidation that landed while this fetch was in flight
                // makes the payload last-known-good only; the next read must
                // still bypass it.
                slot.fresh = issued_gen == slot.invalidation_gen;
                Ok(page)
            }
            Err(err) => {
                slot.fresh = false;
                Err(EngineError::backend(err))
            }
        }
    }

    /// Mark every slot matching `pred` stale, forcing the next
    /// `get_or_fetch` for it to bypass the cached value.
    pub fn invalidate<F>(&self, mut pred: F)
    where
        F: FnMut(&QueryKey) -> bool,
    {
        let mut slots = self.slots.lock().unwrap();
        for (key, slot) in slots.iter_mut() {
            if pred(key) {
                slot.fresh = false;
                slot.invalidation_gen += 1;
            }
        }
    }

    pub fn invalidate_all(&self) {
        self.invalidate(|_| true);
    }

    /// Exact copy of the current entry, taken before an optimistic apply.
    pub(crate) fn snapshot(&self, key: &QueryKey) -> Option<PageResult> {
        self.cached(key)
    }

    /// Transform the cached entry in place. No-op when nothing is cached.
    pub(crate) fn apply<F>(&self, key: &QueryKey, f: F)
    where
        F: FnOnce(&mut PageResult),
    {
        let mut slots = self.slots.lock().unwrap();
        if let Some(result) = slots.get_mut(key).and_then(|slot| slot.result.as_mut()) {
            f(result);
        }
    }

    /// Put a snapshot back, overwriting whatever the optimistic apply left
    /// behind. Targets the snapshot's own key, so rollback lands correctly
    /// even if the view has navigated elsewhere in the meantime.
    pub(crate) fn restore(&self, key: &QueryKey, snapshot: PageResult) {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(key.clone()).or_default();
        slot.result = Some(snapshot);
    }

    /// Re-mark an entry fresh after a confirmed mutation whose optimistic
    /// shape is already exact (like-toggle).
    pub(crate) fn mark_fresh(&self, key: &QueryKey) {
        let mut slots = self.slots.lock().unwrap();
        if let Some(slot) = slots.get_mut(key) {
            if slot.result.is_some() {
                slot.fresh = true;
            }
        }
    }
}
