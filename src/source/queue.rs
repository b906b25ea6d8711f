//! Queue View
//!
//! Holds the current page of a disbursement or processing queue as a
//! projected table. Every load takes a request token from a monotonically
//! increasing generation counter; a response whose token is no longer
//! current is dropped, so a slow earlier request can never overwrite the
//! result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use super::{AgentSource, PageRequest, RecordSource};
use crate::error::FetchError;
use crate::table::{AgentDirectory, Page, RawRecord, TableView};

/// Where the view is in its load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    /// The request succeeded with no rows
    Empty,
    /// The request failed; the message is user-facing
    Failed(String),
}

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// What happened to a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page replaced the view contents
    Applied { rows: usize },
    /// A newer request was started; the response was discarded
    Superseded,
    /// The request failed and the view was cleared
    Failed(String),
}

#[derive(Debug)]
struct ViewState {
    directory: AgentDirectory,
    request: Option<PageRequest>,
    records: Vec<RawRecord>,
    table: TableView,
    total_count: usize,
    state: LoadState,
}

/// One queue page and its load status.
#[derive(Debug)]
pub struct QueueView {
    generation: AtomicU64,
    inner: Mutex<ViewState>,
}

impl QueueView {
    pub fn new(directory: AgentDirectory) -> Self {
        let table = TableView::project(&[], &directory);
        Self {
            generation: AtomicU64::new(0),
            inner: Mutex::new(ViewState {
                directory,
                request: None,
                records: Vec::new(),
                table,
                total_count: 0,
                state: LoadState::Idle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the agent directory and re-projects the current page.
    pub fn set_directory(&self, directory: AgentDirectory) {
        let mut inner = self.lock();
        inner.table = TableView::project(&inner.records, &directory);
        inner.directory = directory;
        debug!("Agent directory replaced ({} agents)", inner.directory.len());
    }

    /// Reloads the agent directory from a source.
    pub async fn refresh_directory<A: AgentSource>(
        &self,
        source: &A,
        page_size: usize,
    ) -> Result<usize, FetchError> {
        let directory = AgentDirectory::load_all(source, page_size).await?;
        let count = directory.len();
        self.set_directory(directory);
        Ok(count)
    }

    /// Starts a request, superseding any in flight.
    ///
    /// The generation is bumped under the state lock, so `Loading` from an
    /// older request can never land after a newer request has completed.
    pub fn begin(&self) -> RequestToken {
        let mut inner = self.lock();
        let token = RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        inner.state = LoadState::Loading;
        debug!("Queue request {:?} started", token);
        token
    }

    /// True if no newer request has started since `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Applies a response if its request is still current.
    pub fn complete(
        &self,
        token: RequestToken,
        request: PageRequest,
        result: Result<Page<RawRecord>, FetchError>,
    ) -> LoadOutcome {
        let mut inner = self.lock();

        // Checked under the lock so two completions cannot interleave.
        if !self.is_current(token) {
            debug!("Discarding stale response for {:?}", token);
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                let rows = page.items.len();
                inner.table = TableView::project(&page.items, &inner.directory);
                inner.records = page.items;
                inner.total_count = page.total_count;
                inner.request = Some(request);
                inner.state = if rows == 0 {
                    LoadState::Empty
                } else {
                    LoadState::Loaded
                };
                info!(
                    "Queue page {} loaded: {} rows, {} columns",
                    page.page_number,
                    rows,
                    inner.table.columns.len()
                );
                LoadOutcome::Applied { rows }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Queue load failed: {}", message);
                inner.records.clear();
                inner.table = TableView::project(&[], &inner.directory);
                inner.total_count = 0;
                inner.request = Some(request);
                inner.state = LoadState::Failed(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Fetches a page and applies it unless superseded meanwhile.
    pub async fn load<S: RecordSource>(&self, source: &S, request: PageRequest) -> LoadOutcome {
        let token = self.begin();
        let result = source.list_records(&request).await;
        self.complete(token, request, result)
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state == LoadState::Loading
    }

    pub fn state(&self) -> LoadState {
        self.lock().state.clone()
    }

    /// Snapshot of the projected page.
    pub fn table(&self) -> TableView {
        self.lock().table.clone()
    }

    /// Request behind the current contents.
    pub fn current_request(&self) -> Option<PageRequest> {
        self.lock().request.clone()
    }

    pub fn total_count(&self) -> usize {
        self.lock().total_count
    }
}

impl Default for QueueView {
    fn default() -> Self {
        Self::new(AgentDirectory::new())
    }
}
