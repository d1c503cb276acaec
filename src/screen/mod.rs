//! Headless screens: the state each page holds and the actions it exposes.
//! A renderer (the CLI, or any UI) reads their snapshots and calls the actions.

use std::{sync::Arc, time::Duration};

use crate::{
    api::ApiClient,
    error::AppResult,
    model::{ResourceType, delete_resource},
    notify::{Notification, Notifier},
    query::HasPagination,
    state::{Debouncer, ListQuery, PageSource},
};

pub mod catalog;
pub mod course_detail;
pub mod dashboard;
pub mod lesson;
pub mod lesson_admin;
pub mod table;

pub use catalog::Catalog;
pub use course_detail::{CourseDetail, EnrollClick};
pub use dashboard::{AdminDashboard, UserDashboard};
pub use lesson::{LessonScreen, LessonViewer};
pub use lesson_admin::LessonAdmin;
pub use table::{
    CategoryTable, CourseTable, MyCoursesTable, MyTransactionsTable, TableScreen,
    TransactionTable, category_table, course_table, my_courses_table, my_transactions_table,
    transaction_table,
};

/// A debouncer whose commits patch the latest list parameters and go back to
/// page 1.
pub(crate) fn debounced_patch<S, T, F>(
    list: &Arc<ListQuery<S>>,
    quiet: Duration,
    apply: F,
) -> Debouncer<T>
where
    S: PageSource,
    T: Send + 'static,
    F: Fn(&mut S::Params, T) + Send + Sync + 'static,
{
    let list = Arc::clone(list);
    let apply = Arc::new(apply);
    Debouncer::new(quiet, move |value: T| {
        let list = Arc::clone(&list);
        let apply = Arc::clone(&apply);
        async move {
            list.update_params(move |p| {
                apply(p, value);
                p.pagination_mut().page = 1;
            })
            .await;
        }
    })
}

/// Text box contents to an optional price; anything unparsable clears the filter.
pub(crate) fn parse_price(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

/// Deletes one entity and reports the outcome. The backend's message wins
/// over the generic one.
pub(crate) async fn delete_with_notice(
    client: &ApiClient,
    resource: ResourceType,
    id: &str,
    notifier: &dyn Notifier,
) -> AppResult<()> {
    let label = resource.label();
    match delete_resource(client, resource, id).await {
        Ok(response) => {
            let message = if response.message.is_empty() {
                format!("{label} deleted successfully")
            } else {
                response.message
            };
            tracing::info!("{message}");
            notifier.notify(Notification::success(message));
            Ok(())
        }
        Err(e) => {
            let fallback = format!("Failed to delete {}", label.to_lowercase());
            notifier.notify(Notification::from_api_error(&e, &fallback));
            Err(e.into())
        }
    }
}
