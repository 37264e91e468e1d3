//! Paged fetches
//!
//! Wraps a [`FetchHandle`] whose producer receives the current page and page
//! size. Changing either re-runs the fetch.

use crate::fetch::{FetchHandle, FetchOptions, FetchState};
use parking_lot::Mutex;
use sensus_client::ClientError;
use std::{future::Future, sync::Arc};
use tokio::task::JoinHandle;
use tracing::debug;

/// Current page position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page, 1-based
    pub page: u32,
    /// Items per page
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// A fetch driven by page and page size
#[derive(Debug)]
pub struct PaginatedFetch<T> {
    position: Arc<Mutex<Pagination>>,
    fetch: FetchHandle<T>,
}

impl<T> PaginatedFetch<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a paged fetch starting at `initial`
    pub fn new<F, Fut>(producer: F, initial: Pagination, options: FetchOptions<T>) -> Self
    where
        F: Fn(Pagination) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let position = Arc::new(Mutex::new(Pagination {
            page: initial.page.max(1),
            limit: initial.limit.max(1),
        }));
        let current = Arc::clone(&position);
        let fetch = FetchHandle::new(move || producer(*current.lock()), options);
        Self { position, fetch }
    }

    /// Current page and page size
    pub fn pagination(&self) -> Pagination {
        *self.position.lock()
    }

    /// Move to `page` and fetch it
    pub fn go_to_page(&self, page: u32) -> JoinHandle<()> {
        let page = page.max(1);
        self.position.lock().page = page;
        debug!(page, "page changed");
        self.fetch.refetch()
    }

    /// Change the page size, go back to the first page and fetch it
    pub fn change_limit(&self, limit: u32) -> JoinHandle<()> {
        let limit = limit.max(1);
        *self.position.lock() = Pagination { page: 1, limit };
        debug!(limit, "page size changed");
        self.fetch.refetch()
    }

    /// Start the initial fetch
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        self.fetch.mount()
    }

    /// Snapshot of the fetch state
    pub fn state(&self) -> FetchState<T> {
        self.fetch.state()
    }

    /// Underlying controller
    pub const fn fetch(&self) -> &FetchHandle<T> {
        &self.fetch
    }
}
