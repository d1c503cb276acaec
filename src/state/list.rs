//! Paginated list state: parameters in, `{data, loading, error}` out.
//!
//! State is published on a `watch` channel. Every fetch takes a ticket from a
//! [`RequestSequencer`]; the ticket is issued and the response committed while
//! holding the channel's write lock, so a response is only applied if no newer
//! fetch has started in between.

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{
    api::{ApiClient, ApiResult},
    model::{Page, PageMeta, PaginatableResource, ViewerScopedResource},
    query::{HasPagination, QueryParams},
    state::sequencer::{RequestSequencer, Ticket},
};

#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Params: QueryParams + HasPagination + std::fmt::Debug;

    async fn fetch_page(&self, params: &Self::Params) -> ApiResult<Page<Self::Item>>;
}

/// Lists a backend collection through its [`PaginatableResource`] impl.
pub struct ResourceSource<T> {
    client: ApiClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> ResourceSource<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl<T> PageSource for ResourceSource<T>
where
    T: PaginatableResource + Clone + Send + Sync + 'static,
    T::Params: HasPagination + std::fmt::Debug,
{
    type Item = T;
    type Params = T::Params;

    async fn fetch_page(&self, params: &T::Params) -> ApiResult<Page<T>> {
        T::page(&self.client, params).await
    }
}

/// Lists the signed-in viewer's own entries (`/my`).
pub struct ViewerSource<T> {
    client: ApiClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> ViewerSource<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T> PageSource for ViewerSource<T>
where
    T: ViewerScopedResource + Clone + Send + Sync + 'static,
    T::Params: HasPagination + std::fmt::Debug,
{
    type Item = T;
    type Params = T::Params;

    async fn fetch_page(&self, params: &T::Params) -> ApiResult<Page<T>> {
        T::page_for_viewer(&self.client, params).await
    }
}

#[async_trait]
impl<S: PageSource> PageSource for Arc<S> {
    type Item = S::Item;
    type Params = S::Params;

    async fn fetch_page(&self, params: &S::Params) -> ApiResult<Page<S::Item>> {
        self.as_ref().fetch_page(params).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T, P> {
    pub params: P,
    pub items: Vec<T>,
    pub meta: Option<PageMeta>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T, P> ListSnapshot<T, P> {
    fn new(params: P) -> Self {
        Self {
            params,
            items: Vec::new(),
            meta: None,
            loading: false,
            error: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.meta.is_some_and(|m| m.page < m.last_page)
    }

    pub fn total(&self) -> u64 {
        self.meta.map_or(0, |m| m.total)
    }

    pub fn last_page(&self) -> u32 {
        self.meta.map_or(1, |m| m.last_page.max(1))
    }
}

/// How a fetched page is merged into the visible items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Replace,
    /// Infinite scroll: the page is appended.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Committed,
    Failed(String),
    /// A newer fetch started before this one finished.
    Discarded,
    /// Nothing to fetch (already loading or on the last page).
    Skipped,
}

impl FetchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

pub struct ListQuery<S: PageSource> {
    source: S,
    state: watch::Sender<ListSnapshot<S::Item, S::Params>>,
    sequencer: RequestSequencer,
}

impl<S: PageSource> ListQuery<S> {
    /// Builds the query without fetching; call [`ListQuery::refetch`] to load.
    pub fn new(source: S, params: S::Params) -> Self {
        let (state, _) = watch::channel(ListSnapshot::new(params));
        Self {
            source,
            state,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<S::Item, S::Params>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot<S::Item, S::Params> {
        self.state.borrow().clone()
    }

    pub fn params(&self) -> S::Params {
        self.state.borrow().params.clone()
    }

    pub async fn set_params(&self, params: S::Params) -> FetchOutcome {
        self.fetch(move |p| *p = params, ListMode::Replace).await
    }

    /// Applies `patch` to the latest parameters and fetches.
    pub async fn update_params<F>(&self, patch: F) -> FetchOutcome
    where
        F: FnOnce(&mut S::Params) + Send,
    {
        self.fetch(patch, ListMode::Replace).await
    }

    pub async fn refetch(&self) -> FetchOutcome {
        self.fetch(|_| {}, ListMode::Replace).await
    }

    /// Fetches the page after the last committed one and appends it. A failed
    /// attempt leaves `meta` untouched, so the next call asks for the same page.
    pub async fn load_more(&self) -> FetchOutcome {
        let next = {
            let snapshot = self.state.borrow();
            match snapshot.meta {
                Some(meta) if !snapshot.loading && meta.page < meta.last_page => meta.page + 1,
                _ => return FetchOutcome::Skipped,
            }
        };

        self.fetch(move |p| p.pagination_mut().page = next, ListMode::Append)
            .await
    }

    /// Cancels the in-flight fetch, if any.
    pub fn cancel(&self) {
        self.sequencer.cancel_all();
        self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }

    async fn fetch<F>(&self, change: F, mode: ListMode) -> FetchOutcome
    where
        F: FnOnce(&mut S::Params) + Send,
    {
        let mut issued: Option<(Ticket, S::Params)> = None;
        self.state.send_modify(|s| {
            change(&mut s.params);
            s.loading = true;
            issued = Some((self.sequencer.issue(), s.params.clone()));
        });
        let Some((ticket, params)) = issued else {
            return FetchOutcome::Skipped;
        };

        tracing::debug!(seq = ticket.seq(), ?params, ?mode, "fetching page");
        let Some(result) = ticket.run(self.source.fetch_page(&params)).await else {
            tracing::debug!(seq = ticket.seq(), "fetch cancelled");
            return FetchOutcome::Discarded;
        };

        let mut outcome = FetchOutcome::Discarded;
        self.state.send_if_modified(|s| {
            if !self.sequencer.is_current(&ticket) {
                return false;
            }

            s.loading = false;
            match result {
                Ok(page) => {
                    match mode {
                        ListMode::Replace => s.items = page.data,
                        ListMode::Append => s.items.extend(page.data),
                    }
                    s.meta = Some(page.meta);
                    s.error = None;
                    outcome = FetchOutcome::Committed;
                }
                Err(e) => {
                    let message = e.client_display();
                    tracing::warn!(error = %e, "list fetch failed");
                    s.error = Some(message.clone());
                    outcome = FetchOutcome::Failed(message);
                }
            }
            true
        });

        if outcome == FetchOutcome::Discarded {
            tracing::debug!(seq = ticket.seq(), "stale response discarded");
        }
        outcome
    }
}
