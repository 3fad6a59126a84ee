//! Clip catalog synchronization: query cache, optimistic mutations, and the
//! controller tying them to the pager and the (debounced) search box.

mod mutation;
mod query_cache;

pub use mutation::{ClipMutation, MutationCoordinator};
pub use query_cache::{QueryCache, QueryKey, DEFAULT_PAGE_SIZE};

use std::sync::Arc;

use cr_core::clip::{page_tokens, PageResult, PageToken};
use cr_core::EngineError;

/// View state of the catalog page: current page number, the settled search
/// term, and the last known page count.
///
/// This is an explicit context object handed to whatever renders the
/// catalog; there is no ambient global view state. Search input must be fed
/// through a [`crate::DebounceGate`] first — `apply_search` expects settled
/// values and resets the page exactly once per settled change, so rapid
/// keystrokes never stack page resets.
pub struct CatalogController {
    cache: Arc<QueryCache>,
    page: usize,
    search: String,
    last_total_pages: usize,
}

impl CatalogController {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self {
            cache,
            page: 1,
            search: String::new(),
            last_total_pages: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Cache key of what the view is currently looking at.
    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.page, &self.search)
    }

    /// Accept a settled search value. A changed term resets the page to 1;
    /// re-settling the same term leaves the page alone.
    pub fn apply_search(&mut self, term: &str) {
        let normalized = term.trim();
        if normalized != self.search {
            self.search = normalized.to_string();
            self.page = 1;
        }
    }

    /// Navigate to `page`, clamped into the known page range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.last_total_pages.max(1));
    }

    /// Last-known-good page for immediate display, stale or fresh.
    pub fn visible(&self) -> Option<PageResult> {
        self.cache.cached(&self.key())
    }

    /// Fetch (or revalidate) the current key. Updates the known page range
    /// and clamps the current page back into it when the catalog shrank
    /// under us (e.g. after deletes near a page boundary).
    pub async fn refresh(&mut self) -> Result<PageResult, EngineError> {
        let result = self.cache.get_or_fetch(&self.key()).await?;
        self.last_total_pages = result.total_pages;
        if result.total_pages > 0 && self.page > result.total_pages {
            self.page = result.total_pages;
        }
        Ok(result)
    }

    /// Pager controls for the current position.
    pub fn page_tokens(&self) -> Vec<PageToken> {
        page_tokens(self.page, self.last_total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Local;
    use cr_core::clip::{ClipPath, ClipRecord};
    use cr_core::ports::ClipStorePort;
    use std::sync::Mutex;

    /// Serves a fixed catalog, slicing pages like the real backend.
    struct FixedStore {
        names: Vec<String>,
        calls: Mutex<Vec<(usize, Option<String>)>>,
    }

    impl FixedStore {
        fn with_clips(count: usize) -> Arc<Self> {
            Arc::new(Self {
                names: (0..count).map(|i| format!("clip-{i:02}")).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ClipStorePort for FixedStore {
        async fn pull_clips(
            &self,
            page: usize,
            page_size: usize,
            search: Option<&str>,
        ) -> Result<PageResult> {
            self.calls
                .lock()
                .unwrap()
                .push((page, search.map(str::to_string)));
            let filtered: Vec<&String> = self
                .names
                .iter()
                .filter(|n| search.is_none_or(|q| n.to_lowercase().contains(&q.to_lowercase())))
                .collect();
            let total_clips = filtered.len();
            let total_pages = total_clips.div_ceil(page_size);
            let start = (page - 1) * page_size;
            let clips = filtered
                .iter()
                .skip(start)
                .take(page_size)
                .map(|name| ClipRecord {
                    name: (*name).clone(),
                    path: ClipPath::from(format!("/clips/{name}.mp4").as_str()),
                    length: 10.0,
                    size: 1,
                    created_at: Local::now(),
                    updated_at: Local::now(),
                    tags: Vec::new(),
                    liked: false,
                })
                .collect();
            Ok(PageResult {
                clips,
                total_pages,
                total_clips,
            })
        }

        async fn delete_clip(&self, _path: &ClipPath) -> Result<()> {
            unimplemented!()
        }

        async fn rename_clip(&self, _path: &ClipPath, _new_name: &str) -> Result<()> {
            unimplemented!()
        }

        async fn like_clip(&self, _name: &str, _liked: bool) -> Result<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn search_change_resets_page_exactly_once() {
        let store = FixedStore::with_clips(40);
        let cache = Arc::new(QueryCache::new(store));
        let mut controller = CatalogController::new(cache);

        controller.refresh().await.unwrap();
        controller.set_page(2);
        assert_eq!(controller.page(), 2);

        controller.apply_search("clip");
        assert_eq!(controller.page(), 1);

        // Navigating after the settle must stick: the same settled term
        // arriving again is not a change.
        controller.refresh().await.unwrap();
        controller.set_page(2);
        controller.apply_search("clip");
        assert_eq!(controller.page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_settle_to_a_single_page_reset() {
        use crate::DebounceGate;
        use std::time::Duration;
        use tokio::time::advance;

        let store = FixedStore::with_clips(40);
        let cache = Arc::new(QueryCache::new(store));
        let mut controller = CatalogController::new(cache);
        controller.refresh().await.unwrap();
        controller.set_page(2);

        let (mut gate, mut settled) = DebounceGate::channel(Duration::from_millis(300));
        for term in ["c", "cl", "cli", "clip", "clip-1"] {
            gate.update(term.to_string());
            advance(Duration::from_millis(10)).await;
        }
        advance(Duration::from_millis(300)).await;

        // Exactly one value survived the burst.
        let term = settled.recv().await.unwrap();
        assert!(settled.try_recv().is_err());

        controller.apply_search(&term);
        assert_eq!(controller.search(), "clip-1");
        assert_eq!(controller.page(), 1);
    }

    #[tokio::test]
    async fn page_clamps_back_when_catalog_shrinks() {
        let store = FixedStore::with_clips(40);
        let cache = Arc::new(QueryCache::new(store.clone()));
        let mut controller = CatalogController::new(cache.clone());

        controller.refresh().await.unwrap();
        controller.set_page(3);
        controller.refresh().await.unwrap();
        assert_eq!(controller.page(), 3);

        // A narrower search has fewer pages; the controller resets to page 1
        // on the term change and the refreshed range keeps it in bounds.
        controller.apply_search("clip-0");
        let result = controller.refresh().await.unwrap();
        assert_eq!(result.total_pages, 1);
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.page_tokens(), Vec::new());
    }

    #[tokio::test]
    async fn visible_serves_stale_entry_after_invalidation() {
        let store = FixedStore::with_clips(20);
        let cache = Arc::new(QueryCache::new(store.clone()));
        let mut controller = CatalogController::new(cache.clone());

        controller.refresh().await.unwrap();
        assert!(controller.visible().is_some());

        cache.invalidate_all();
        // Still renderable while stale.
        assert_eq!(controller.visible().unwrap().clips.len(), 16);
    }

    #[tokio::test]
    async fn pager_tokens_follow_known_range() {
        let store = FixedStore::with_clips(100);
        let cache = Arc::new(QueryCache::new(store));
        let mut controller = CatalogController::new(cache);

        controller.refresh().await.unwrap();
        // 100 clips at 16/page -> 7 pages.
        let tokens = controller.page_tokens();
        assert_eq!(
            tokens.first(),
            Some(&PageToken::Page { number: 1, current: true })
        );
        assert_eq!(
            tokens.last(),
            Some(&PageToken::Page { number: 7, current: false })
        );
    }
}
