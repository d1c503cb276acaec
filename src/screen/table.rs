//! Paginated tables: admin management lists and the viewer's own lists.
//!
//! A table is built from the raw query string of its URL, keeps a display
//! copy of the search box, and debounces text filters before they reach the
//! shared list parameters.

use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
    api::ApiClient,
    config::Ui,
    error::AppResult,
    form::{EntityForm, submit_form},
    model::{
        PaginatableResource, ResourceTyped,
        entity::{Category, Course, Transaction},
    },
    notify::Notifier,
    query::{HasPagination, PaginationOptions, QueryParams},
    screen::{debounced_patch, delete_with_notice},
    state::{
        Debouncer, FetchOutcome, ListQuery, ListSnapshot, PageSource, ResourceSource, ViewerSource,
    },
};

type Patch<P> = Box<dyn FnOnce(&mut P) + Send>;

pub struct TableScreen<S: PageSource> {
    list: Arc<ListQuery<S>>,
    options: PaginationOptions,
    quiet: Duration,
    search_input: String,
    search: Debouncer<String>,
    filters: HashMap<&'static str, Debouncer<Patch<S::Params>>>,
}

impl<S: PageSource> TableScreen<S> {
    /// Must be called inside a Tokio runtime: debouncers run as tasks.
    pub fn new(source: S, options: PaginationOptions, raw_query: &str, quiet: Duration) -> Self {
        let params = S::Params::decode(raw_query, &options);
        let search_input = params.pagination().search.clone();
        let list = Arc::new(ListQuery::new(source, params));

        let search = debounced_patch(&list, quiet, |p: &mut S::Params, search: String| {
            p.pagination_mut().search = search;
        });

        Self {
            list,
            options,
            quiet,
            search_input,
            search,
            filters: HashMap::new(),
        }
    }

    pub fn list(&self) -> &ListQuery<S> {
        &self.list
    }

    pub fn options(&self) -> &PaginationOptions {
        &self.options
    }

    pub fn snapshot(&self) -> ListSnapshot<S::Item, S::Params> {
        self.list.snapshot()
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// URL form of the current parameters (defaults omitted).
    pub fn query_string(&self) -> String {
        self.list.params().encode(&self.options)
    }

    pub async fn load(&self) -> FetchOutcome {
        self.list.refetch().await
    }

    pub async fn refetch(&self) -> FetchOutcome {
        self.list.refetch().await
    }

    /// Updates the search box now and the list after the quiet period.
    pub fn type_search(&mut self, text: &str) {
        self.search_input = text.to_string();
        self.search.push(self.search_input.clone());
    }

    pub async fn change_sort(&self, key: &str) -> FetchOutcome {
        if !self.options.sortable().iter().any(|k| k == key) {
            tracing::debug!(key, "column is not sortable");
            return FetchOutcome::Skipped;
        }

        let key = key.to_string();
        self.list
            .update_params(move |p| p.pagination_mut().toggle_sort(&key))
            .await
    }

    pub async fn change_page(&self, page: u32) -> FetchOutcome {
        let page = page.max(1);
        self.list
            .update_params(move |p| p.pagination_mut().page = page)
            .await
    }

    pub async fn change_rows_per_page(&self, limit: u32) -> FetchOutcome {
        if !self.options.rows_per_page().contains(&limit) {
            tracing::debug!(limit, "unsupported page size");
            return FetchOutcome::Skipped;
        }

        self.list
            .update_params(move |p| {
                let pagination = p.pagination_mut();
                pagination.limit = limit;
                pagination.page = 1;
            })
            .await
    }

    /// Applies a filter immediately (selects, date pickers).
    pub async fn set_filter<F>(&self, patch: F) -> FetchOutcome
    where
        F: FnOnce(&mut S::Params) + Send,
    {
        self.list
            .update_params(move |p| {
                patch(p);
                p.pagination_mut().page = 1;
            })
            .await
    }

    /// Applies a filter after the quiet period. Each `field` owns its own timer.
    pub fn debounce_filter<F>(&mut self, field: &'static str, patch: F)
    where
        F: FnOnce(&mut S::Params) + Send + 'static,
    {
        let list = &self.list;
        let quiet = self.quiet;
        let debouncer = self.filters.entry(field).or_insert_with(|| {
            debounced_patch(list, quiet, |p: &mut S::Params, patch: Patch<S::Params>| patch(p))
        });
        debouncer.push(Box::new(patch));
    }

    /// Back to the default parameters; pending debounced input is dropped.
    pub async fn reset(&mut self) -> FetchOutcome {
        self.search.cancel();
        for debouncer in self.filters.values() {
            debouncer.cancel();
        }
        self.search_input.clear();
        self.list.set_params(S::Params::decode("", &self.options)).await
    }
}

impl<T> TableScreen<ResourceSource<T>>
where
    T: PaginatableResource + Clone + Send + Sync + 'static,
    T::Params: HasPagination + std::fmt::Debug,
{
    /// Submits a create or edit dialog and reloads the current page on success.
    pub async fn submit<F: EntityForm>(
        &self,
        form: F,
        notifier: &dyn Notifier,
    ) -> AppResult<F::Output> {
        let saved = submit_form(self.list.source().client(), form, notifier).await?;
        self.list.refetch().await;
        Ok(saved)
    }

    /// Deletes a row, reports the outcome, and reloads the page. An emptied
    /// page steps back to the previous one.
    #[tracing::instrument(skip(self, notifier))]
    pub async fn delete_row(&self, id: &str, notifier: &dyn Notifier) -> AppResult<()> {
        delete_with_notice(self.list.source().client(), T::get_resource_type(), id, notifier)
            .await?;

        let outcome = self.list.refetch().await;
        let snapshot = self.list.snapshot();
        let page = snapshot.params.pagination().page;
        if outcome.is_committed() && snapshot.items.is_empty() && page > 1 {
            self.change_page(page - 1).await;
        }
        Ok(())
    }
}

pub type CourseTable = TableScreen<ResourceSource<Course>>;
pub type CategoryTable = TableScreen<ResourceSource<Category>>;
pub type TransactionTable = TableScreen<ResourceSource<Transaction>>;
pub type MyCoursesTable = TableScreen<ViewerSource<Course>>;
pub type MyTransactionsTable = TableScreen<ViewerSource<Transaction>>;

pub fn course_table(client: &ApiClient, ui: &Ui, raw_query: &str) -> CourseTable {
    let options = PaginationOptions::new(
        ui.rows_per_page(),
        ["title", "instructor", "price", "createdAt"],
    );
    TableScreen::new(ResourceSource::new(client.clone()), options, raw_query, ui.debounce())
}

pub fn category_table(client: &ApiClient, ui: &Ui, raw_query: &str) -> CategoryTable {
    let options = PaginationOptions::new(ui.rows_per_page(), ["_id", "name", "description"]);
    TableScreen::new(ResourceSource::new(client.clone()), options, raw_query, ui.debounce())
}

pub fn transaction_table(client: &ApiClient, ui: &Ui, raw_query: &str) -> TransactionTable {
    let options = PaginationOptions::new(ui.rows_per_page(), ["createdAt"]);
    TableScreen::new(ResourceSource::new(client.clone()), options, raw_query, ui.debounce())
}

pub fn my_courses_table(client: &ApiClient, ui: &Ui, raw_query: &str) -> MyCoursesTable {
    let options = PaginationOptions::new(&[12], ["title", "createdAt"]);
    TableScreen::new(ViewerSource::new(client.clone()), options, raw_query, ui.debounce())
}

pub fn my_transactions_table(client: &ApiClient, ui: &Ui, raw_query: &str) -> MyTransactionsTable {
    let options = PaginationOptions::new(&[50], ["createdAt"]);
    TableScreen::new(ViewerSource::new(client.clone()), options, raw_query, ui.debounce())
}
