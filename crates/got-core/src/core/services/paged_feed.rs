//! Paginated fetch orchestration over a single resource list.
//!
//! [`PagedFeed`] owns the [`Pagination`] cursor for one list session and
//! broadcasts every fetch as `Loading` followed by the terminal
//! [`RequestStatus`].
//!
//! Overlapping fetches are not deduplicated: two concurrent `fetch` calls
//! both hit the network and their emissions may interleave. Callers should
//! not trigger a new fetch while one is outstanding.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::networking::{Pagination, RequestStatus};

const UPDATE_CAPACITY: usize = 64;

/// Something that can fetch one page of a list.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Error: Clone + Send + Sync + 'static;

    /// Fetches page `page` (1-based). `None` if the fetch was canceled.
    async fn fetch_page(&self, page: u32) -> Option<RequestStatus<Vec<Self::Item>, Self::Error>>;
}

pub type FeedStatus<S> = RequestStatus<Vec<<S as PageSource>::Item>, <S as PageSource>::Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

pub struct PagedFeed<S: PageSource> {
    source: Arc<S>,
    pagination: Mutex<Pagination>,
    state: Mutex<FeedState>,
    cancel: Mutex<CancellationToken>,
    updates: broadcast::Sender<FeedStatus<S>>,
}

impl<S: PageSource> PagedFeed<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            source,
            pagination: Mutex::new(Pagination::new()),
            state: Mutex::new(FeedState::Idle),
            cancel: Mutex::new(CancellationToken::new()),
            updates,
        }
    }

    /// Stream of statuses. Values sent while nobody is subscribed are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedStatus<S>> {
        self.updates.subscribe()
    }

    /// Cursor snapshot. Read it on `Loading` to choose between replacing
    /// and appending the list.
    pub fn pagination(&self) -> Pagination {
        *self
            .pagination
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> FeedState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Aborts the fetches in flight. They emit nothing further.
    pub fn cancel(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }

    /// Fetches the next page, or page one again when `refresh` is set.
    ///
    /// Does nothing, and emits nothing, once the last page was reached.
    pub async fn fetch(&self, refresh: bool) {
        let (page, cancel) = {
            let mut pagination = self
                .pagination
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if refresh {
                pagination.reset();
                log::debug!("Pagination reset for refresh");
            }
            if pagination.reached_last_page {
                log::debug!("Last page already reached, not fetching");
                return;
            }
            let cancel = self
                .cancel
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            (pagination.current_page, cancel)
        };

        self.set_state(FeedState::Loading);
        self.emit(RequestStatus::Loading);

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            status = self.source.fetch_page(page) => status,
        };

        let Some(status) = outcome else {
            log::debug!("Fetch of page {} canceled", page);
            self.set_state(FeedState::Idle);
            return;
        };

        let received = match &status {
            RequestStatus::Success { data, .. } => Some(data.len()),
            _ => None,
        };

        self.set_state(if status.is_failure() {
            FeedState::Failed
        } else {
            FeedState::Loaded
        });
        log::debug!("Page {} finished: {}", page, status.kind());
        self.emit(status);

        if let Some(item_count) = received {
            let mut pagination = self
                .pagination
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            pagination.advance(item_count);
            log::debug!(
                "Pagination advanced to page {} (last page: {})",
                pagination.current_page,
                pagination.reached_last_page
            );
        }
    }

    /// Runs [`PagedFeed::fetch`] on the runtime. A panic inside the fetch is
    /// reported to subscribers as `UnknownError`.
    pub fn spawn_fetch(self: &Arc<Self>, refresh: bool) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        tokio::spawn(async move {
            let worker = Arc::clone(&feed);
            let fetch = tokio::spawn(async move { worker.fetch(refresh).await });
            if let Err(e) = fetch.await {
                if e.is_panic() {
                    log::error!("Fetch task panicked: {}", e);
                    feed.set_state(FeedState::Failed);
                    feed.emit(RequestStatus::UnknownError);
                }
            }
        })
    }

    fn set_state(&self, state: FeedState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn emit(&self, status: FeedStatus<S>) {
        if self.updates.send(status).is_err() {
            log::trace!("No feed subscribers, status dropped");
        }
    }
}
