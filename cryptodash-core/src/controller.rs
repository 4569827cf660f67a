//! Paging state machine for server-paginated lists.
//!
//! Every trigger (`refresh`, `set_page_index`, `set_page_size`) returns a
//! [`PendingFetch`] right away. The caller drives it to completion on whatever
//! executor it uses and hands the resulting [`FetchOutcome`] back through
//! [`PaginatedListController::complete`]. Outcomes carry the sequence tag of
//! the trigger that issued them, and only the most recently issued tag is
//! applied, so responses arriving out of order can never overwrite newer data.

use crate::error::DashError;
use crate::pagination::{ListQuery, Page, PageRequest, PageSizes, PageWindow};
use async_trait::async_trait;
use log::{debug, warn};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;

/// A remote collection that can be fetched one page at a time.
#[async_trait]
pub trait ListDataSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Self::Item>, DashError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Unreachable host, timeout, or a body that could not be decoded.
    Transport,
    /// Non-success status from the data source.
    Server,
}

/// Cloneable summary of a failed fetch, suitable for passing to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&DashError> for FetchFailure {
    fn from(err: &DashError) -> Self {
        let kind = if err.is_server_error() {
            FailureKind::Server
        } else {
            FailureKind::Transport
        };
        FetchFailure {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Transport => write!(f, "could not load data: {}", self.message),
            FailureKind::Server => write!(f, "server rejected request: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    Idle,
    Loading,
    /// Last fetch failed. Behaves like `Idle`: nothing in flight, previous page kept.
    Failed(FetchFailure),
}

/// Everything a display layer needs to render a list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub is_loading: bool,
    pub failure: Option<FetchFailure>,
}

impl<T> ListView<T> {
    fn empty(query: &ListQuery) -> Self {
        Self {
            items: Vec::new(),
            page_index: query.page_index,
            page_size: query.page_size,
            total_items: 0,
            total_pages: 0,
            is_loading: false,
            failure: None,
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            page_index: self.page_index,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

type PageFuture<T> = Pin<Box<dyn Future<Output = Result<Page<T>, DashError>> + Send>>;

/// A fetch that has been issued but not yet run.
pub struct PendingFetch<T> {
    tag: u64,
    request: PageRequest,
    future: PageFuture<T>,
}

impl<T> PendingFetch<T> {
    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    /// Perform the request. Errors are captured in the outcome, never returned.
    pub async fn run(self) -> FetchOutcome<T> {
        let result = self.future.await.map_err(|e| {
            warn!(
                "fetch #{} for page {} (size {}) failed: {}",
                self.tag, self.request.page_index, self.request.page_size, e
            );
            FetchFailure::from(&e)
        });

        FetchOutcome {
            tag: self.tag,
            request: self.request,
            result,
        }
    }
}

impl<T> fmt::Debug for PendingFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("tag", &self.tag)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub tag: u64,
    pub request: PageRequest,
    pub result: Result<Page<T>, FetchFailure>,
}

pub struct PaginatedListController<S: ListDataSource> {
    source: Arc<S>,
    sizes: PageSizes,
    sort_by: String,
    query: ListQuery,
    page: Option<Page<S::Item>>,
    status: ListStatus,
    latest_tag: u64,
    updates: watch::Sender<ListView<S::Item>>,
}

impl<S: ListDataSource> PaginatedListController<S> {
    pub fn new(source: Arc<S>, sizes: PageSizes, sort_by: impl Into<String>) -> Self {
        let query = ListQuery::new(&sizes);
        let (updates, _) = watch::channel(ListView::empty(&query));

        Self {
            source,
            sizes,
            sort_by: sort_by.into(),
            query,
            page: None,
            status: ListStatus::Idle,
            latest_tag: 0,
            updates,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn page_sizes(&self) -> &PageSizes {
        &self.sizes
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }

    /// Last successfully fetched page, if any.
    pub fn last_page(&self) -> Option<&Page<S::Item>> {
        self.page.as_ref()
    }

    /// Re-fetch the current query unchanged.
    pub fn refresh(&mut self) -> PendingFetch<S::Item> {
        self.issue()
    }

    /// Jump to `page_index`. Not checked against the last known page count.
    pub fn set_page_index(&mut self, page_index: usize) -> PendingFetch<S::Item> {
        self.query.page_index = page_index;
        self.issue()
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<PendingFetch<S::Item>, DashError> {
        if !self.sizes.contains(page_size) {
            return Err(DashError::UnsupportedPageSize {
                requested: page_size,
                allowed: self.sizes.as_slice().to_vec(),
            });
        }

        self.query.page_size = page_size;
        self.query.page_index = 0;
        Ok(self.issue())
    }

    /// Apply a finished fetch. Returns `false` if the outcome was stale and ignored.
    pub fn complete(&mut self, outcome: FetchOutcome<S::Item>) -> bool {
        if outcome.tag != self.latest_tag {
            debug!(
                "discarding stale fetch #{} (latest is #{})",
                outcome.tag, self.latest_tag
            );
            return false;
        }

        match outcome.result {
            Ok(page) => {
                debug!(
                    "fetch #{} applied: page {} with {} items ({} total, {} pages)",
                    outcome.tag,
                    page.page_index,
                    page.items.len(),
                    page.total_items,
                    page.total_pages
                );
                self.page = Some(page);
                self.status = ListStatus::Idle;
            }
            Err(failure) => {
                warn!("keeping previous page after failed fetch #{}", outcome.tag);
                self.status = ListStatus::Failed(failure);
            }
        }

        self.publish();
        true
    }

    /// Run a pending fetch to completion and apply it.
    pub async fn resolve(&mut self, pending: PendingFetch<S::Item>) -> bool {
        let outcome = pending.run().await;
        self.complete(outcome)
    }

    pub fn current_view(&self) -> ListView<S::Item> {
        let failure = match &self.status {
            ListStatus::Failed(failure) => Some(failure.clone()),
            _ => None,
        };
        let (items, total_items, total_pages) = match &self.page {
            Some(page) => (page.items.clone(), page.total_items, page.total_pages),
            None => (Vec::new(), 0, 0),
        };

        ListView {
            items,
            page_index: self.query.page_index,
            page_size: self.query.page_size,
            total_items,
            total_pages,
            is_loading: self.is_loading(),
            failure,
        }
    }

    /// Receive a fresh [`ListView`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListView<S::Item>> {
        self.updates.subscribe()
    }

    fn issue(&mut self) -> PendingFetch<S::Item> {
        self.latest_tag += 1;
        let tag = self.latest_tag;
        let request = PageRequest::from_query(&self.query, &self.sort_by);
        self.status = ListStatus::Loading;

        debug!(
            "issuing fetch #{}: page={} size={} sortBy={}",
            tag, request.page_index, request.page_size, request.sort_by
        );

        let source = Arc::clone(&self.source);
        let source_request = request.clone();
        let future: PageFuture<S::Item> =
            Box::pin(async move { source.fetch_page(&source_request).await });

        self.publish();
        PendingFetch {
            tag,
            request,
            future,
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.current_view());
    }
}
