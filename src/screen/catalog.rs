//! Public course catalog with infinite scroll.

use std::sync::Arc;

use crate::{
    api::ApiClient,
    config::Ui,
    model::{
        PaginatableResource,
        entity::{Category, Course},
    },
    query::{
        CategoryListParams, CourseListParams, PaginationOptions, PaginationParams, QueryParams,
    },
    screen::{debounced_patch, parse_price},
    state::{Debouncer, FetchOutcome, ListQuery, ListSnapshot, ResourceSource},
};

type CourseSource = ResourceSource<Course>;

/// Categories shown in the filter dropdown.
const CATEGORY_OPTIONS_LIMIT: u32 = 100;

pub struct Catalog {
    client: ApiClient,
    list: Arc<ListQuery<CourseSource>>,
    options: PaginationOptions,
    categories: Vec<Category>,
    search_input: String,
    min_price_input: String,
    max_price_input: String,
    search: Debouncer<String>,
    min_price: Debouncer<Option<i64>>,
    max_price: Debouncer<Option<i64>>,
}

impl Catalog {
    /// Must be called inside a Tokio runtime.
    pub fn new(client: &ApiClient, ui: &Ui, raw_query: &str) -> Self {
        let options = PaginationOptions::new(&[ui.catalog_page_size()], ["createdAt", "price"]);
        let mut params = CourseListParams::decode(raw_query, &options);
        // Infinite scroll always starts from the top.
        params.pagination.page = 1;

        let search_input = params.pagination.search.clone();
        let min_price_input = params.min_price.map(|n| n.to_string()).unwrap_or_default();
        let max_price_input = params.max_price.map(|n| n.to_string()).unwrap_or_default();

        let list = Arc::new(ListQuery::new(ResourceSource::new(client.clone()), params));
        let quiet = ui.debounce();

        let search = debounced_patch(&list, quiet, |p: &mut CourseListParams, v: String| {
            p.pagination.search = v;
        });
        let min_price = debounced_patch(&list, quiet, |p: &mut CourseListParams, v: Option<i64>| {
            p.min_price = v;
        });
        let max_price = debounced_patch(&list, quiet, |p: &mut CourseListParams, v: Option<i64>| {
            p.max_price = v;
        });

        Self {
            client: client.clone(),
            list,
            options,
            categories: Vec::new(),
            search_input,
            min_price_input,
            max_price_input,
            search,
            min_price,
            max_price,
        }
    }

    /// Loads the first page of courses and the category options together.
    pub async fn load(&mut self) -> FetchOutcome {
        let category_params = CategoryListParams {
            limit: CATEGORY_OPTIONS_LIMIT,
            ..PaginationParams::default()
        };
        let (outcome, categories) = tokio::join!(
            self.list.refetch(),
            Category::page(&self.client, &category_params)
        );

        match categories {
            Ok(page) => self.categories = page.data,
            Err(e) => tracing::warn!(error = %e, "unable to load category filter"),
        }
        outcome
    }

    pub fn snapshot(&self) -> ListSnapshot<Course, CourseListParams> {
        self.list.snapshot()
    }

    pub fn list(&self) -> &ListQuery<CourseSource> {
        &self.list
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn min_price_input(&self) -> &str {
        &self.min_price_input
    }

    pub fn max_price_input(&self) -> &str {
        &self.max_price_input
    }

    pub fn query_string(&self) -> String {
        self.list.params().encode(&self.options)
    }

    pub fn type_search(&mut self, text: &str) {
        self.search_input = text.to_string();
        self.search.push(self.search_input.clone());
    }

    pub fn type_min_price(&mut self, text: &str) {
        self.min_price_input = text.to_string();
        self.min_price.push(parse_price(text));
    }

    pub fn type_max_price(&mut self, text: &str) {
        self.max_price_input = text.to_string();
        self.max_price.push(parse_price(text));
    }

    /// Category changes apply immediately.
    pub async fn select_category(&self, category: Option<String>) -> FetchOutcome {
        self.list
            .update_params(move |p| {
                p.category = category.filter(|c| !c.is_empty());
                p.pagination.page = 1;
            })
            .await
    }

    pub async fn load_more(&self) -> FetchOutcome {
        self.list.load_more().await
    }

    pub async fn clear_filters(&mut self) -> FetchOutcome {
        self.search.cancel();
        self.min_price.cancel();
        self.max_price.cancel();
        self.search_input.clear();
        self.min_price_input.clear();
        self.max_price_input.clear();

        self.list
            .set_params(CourseListParams::decode("", &self.options))
            .await
    }
}
