//! Single-flight page fetcher with last-requested-wins write-back.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;

use crate::api::{ApiReader, ApiResult};
use crate::pagination::{
    CollectionPage, CollectionQuery, Cursor, EnvelopeConfig, FETCH_FAILED_MESSAGE, Locator,
    PaginationError,
};
use crate::session::Session;

/// Static description of one list view.
#[derive(Clone, Debug)]
pub struct BrowserConfig {
    pub endpoint: String,
    pub page_size: NonZeroUsize,
    pub fields: Vec<String>,
    pub envelope: EnvelopeConfig,
}

/// Everything a list view renders.
#[derive(Clone, Debug)]
pub struct BrowserState<T> {
    /// Input fields; `filter_text` mirrors the search box.
    pub query: CollectionQuery,
    pub last_page: Option<CollectionPage<T>>,
    pub loading: bool,
    /// Exactly what the displayed page was fetched from.
    pub current_locator: Option<Locator>,
    pub page_number: usize,
    pub cursor: Cursor,
}

impl<T> BrowserState<T> {
    fn new(query: CollectionQuery) -> Self {
        Self {
            query,
            last_page: None,
            loading: false,
            current_locator: None,
            page_number: 1,
            cursor: Cursor::default(),
        }
    }

    fn apply(&mut self, locator: Locator, page: CollectionPage<T>) {
        self.query.offset = page.offset;
        self.page_number = page.page_number();
        self.cursor = Cursor::from_page(&page);
        self.current_locator = Some(locator);
        self.last_page = Some(page);
    }

    /// Items of the displayed page.
    pub fn items(&self) -> &[T] {
        self.last_page.as_ref().map_or(&[], |page| page.items.as_slice())
    }
}

/// What became of a fetch request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written to the state.
    Applied,
    /// A newer request was dispatched meanwhile; the response was dropped.
    Superseded,
    /// Nothing to fetch, e.g. `go_to_next` on the last page.
    Skipped,
}

/// Key pressed in the search box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    Enter,
    Other,
}

struct Inner<T> {
    state: BrowserState<T>,
    /// Ticket of the most recently dispatched request.
    dispatched: u64,
}

/// State and actions of one list view.
///
/// Every fetch takes a ticket before suspending and writes back only if no
/// later ticket was taken meanwhile, so overlapping actions resolve to the
/// last one issued regardless of the order responses arrive in. The state
/// lock is never held across an await point.
pub struct CollectionBrowser<T, A: ?Sized> {
    api: Arc<A>,
    session: Session,
    config: BrowserConfig,
    inner: Mutex<Inner<T>>,
}

impl<T, A> CollectionBrowser<T, A>
where
    T: DeserializeOwned + Clone,
    A: ApiReader + ?Sized,
{
    /// Creates the browser on the first page with an empty filter.
    /// Nothing is fetched until [`load`](Self::load).
    pub fn new(api: Arc<A>, session: Session, config: BrowserConfig) -> Self {
        let query = CollectionQuery::new(config.page_size, config.fields.iter().cloned());
        Self {
            api,
            session,
            config,
            inner: Mutex::new(Inner {
                state: BrowserState::new(query),
                dispatched: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn state(&self) -> BrowserState<T> {
        self.lock().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    pub fn cursor(&self) -> Cursor {
        self.lock().state.cursor.clone()
    }

    /// Locator for the current input fields.
    pub fn build_locator(&self) -> Result<Locator, PaginationError> {
        self.lock().state.query.build_locator(&self.config.endpoint)
    }

    /// Fetches `locator` and, unless superseded, makes it the displayed page.
    ///
    /// On failure the displayed page is kept and the session gets an error
    /// notification; authentication failures expire the session instead.
    pub async fn fetch(&self, locator: Locator) -> Result<FetchOutcome, PaginationError> {
        self.fetch_or_restore(locator, None).await
    }

    /// Like [`fetch`](Self::fetch), but a failure puts `previous` back as the
    /// query so the input fields keep describing the displayed page.
    async fn fetch_or_restore(
        &self,
        locator: Locator,
        previous: Option<CollectionQuery>,
    ) -> Result<FetchOutcome, PaginationError> {
        let ticket = self.begin();
        let result = self.api.get(&locator).await.and_then(|body| {
            CollectionPage::from_envelope(body, self.config.envelope)
        });
        self.finish(ticket, locator, result, previous)
    }

    fn begin(&self) -> u64 {
        let mut inner = self.lock();
        inner.dispatched += 1;
        inner.state.loading = true;
        inner.dispatched
    }

    fn finish(
        &self,
        ticket: u64,
        locator: Locator,
        result: ApiResult<CollectionPage<T>>,
        previous: Option<CollectionQuery>,
    ) -> Result<FetchOutcome, PaginationError> {
        let mut inner = self.lock();
        if ticket != inner.dispatched {
            log::debug!(
                "Discarding response for {locator}: request {ticket} superseded by {}",
                inner.dispatched
            );
            return Ok(FetchOutcome::Superseded);
        }
        inner.state.loading = false;

        let err = match result {
            Ok(page) => {
                inner.state.apply(locator, page);
                return Ok(FetchOutcome::Applied);
            }
            Err(err) => err,
        };
        if let Some(query) = previous {
            inner.state.query = query;
        }
        drop(inner);

        log::error!("Failed to fetch {locator}: {err}");
        if err.is_auth() {
            self.session.expire();
            return Err(PaginationError::AuthenticationRequired);
        }
        self.session.show_error(FETCH_FAILED_MESSAGE, Some("Erro"));
        Err(PaginationError::FetchFailed(err))
    }

    /// Initial fetch of the current input fields.
    pub async fn load(&self) -> Result<FetchOutcome, PaginationError> {
        let locator = self.build_locator()?;
        self.fetch(locator).await
    }

    /// Refetches the displayed page, e.g. after a delete.
    pub async fn reload(&self) -> Result<FetchOutcome, PaginationError> {
        let current = self.lock().state.current_locator.clone();
        match current {
            Some(locator) => self.fetch(locator).await,
            None => self.load().await,
        }
    }

    /// Updates the search box without fetching.
    pub fn set_filter_text(&self, text: &str) {
        self.lock().state.query.filter_text = text.to_string();
    }

    /// Runs `text` as the filter starting from the first page.
    ///
    /// If the fetch fails the previous query is restored.
    pub async fn search(&self, text: &str) -> Result<FetchOutcome, PaginationError> {
        let (locator, previous) = {
            let mut inner = self.lock();
            let previous = inner.state.query.clone();
            inner.state.query.filter_text = text.to_string();
            inner.state.query.offset = 0;
            match inner.state.query.build_locator(&self.config.endpoint) {
                Ok(locator) => (locator, previous),
                Err(err) => {
                    inner.state.query = previous;
                    return Err(err);
                }
            }
        };
        self.fetch_or_restore(locator, Some(previous)).await
    }

    pub async fn clear(&self) -> Result<FetchOutcome, PaginationError> {
        self.search("").await
    }

    /// Searches with whatever is in the search box.
    pub async fn submit(&self) -> Result<FetchOutcome, PaginationError> {
        let text = self.lock().state.query.filter_text.clone();
        self.search(&text).await
    }

    /// Enter submits; every other key only edits the box.
    pub async fn on_key(&self, key: KeyPress) -> Result<FetchOutcome, PaginationError> {
        match key {
            KeyPress::Enter => self.submit().await,
            KeyPress::Other => Ok(FetchOutcome::Skipped),
        }
    }

    pub async fn go_to_next(&self) -> Result<FetchOutcome, PaginationError> {
        let target = self.lock().state.cursor.next_target.clone();
        match target {
            Some(locator) => self.fetch(locator).await,
            None => Ok(FetchOutcome::Skipped),
        }
    }

    pub async fn go_to_prev(&self) -> Result<FetchOutcome, PaginationError> {
        let target = self.lock().state.cursor.prev_target.clone();
        match target {
            Some(locator) => self.fetch(locator).await,
            None => Ok(FetchOutcome::Skipped),
        }
    }
}
