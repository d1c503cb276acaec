use crate::{
    api::ApiClient,
    error::AppResult,
    model::{
        PaginatableResource, ViewerScopedResource,
        entity::{Category, Course, Transaction, UserStats},
    },
    query::{CourseListParams, PaginationParams, TransactionListParams},
};

/// Totals read from list metadata with the smallest possible page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminDashboard {
    pub total_courses: u64,
    pub total_categories: u64,
}

impl AdminDashboard {
    pub async fn load(client: &ApiClient) -> AppResult<Self> {
        let courses = CourseListParams {
            pagination: PaginationParams::with_limit(1),
            ..CourseListParams::default()
        };
        let categories = PaginationParams::with_limit(1);

        let (courses, categories) = tokio::try_join!(
            Course::page(client, &courses),
            Category::page(client, &categories)
        )?;

        Ok(Self {
            total_courses: courses.meta.total,
            total_categories: categories.meta.total,
        })
    }
}

const RECENT_COURSES: u32 = 3;
const RECENT_TRANSACTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct UserDashboard {
    pub stats: UserStats,
    pub recent_courses: Vec<Course>,
    pub recent_transactions: Vec<Transaction>,
}

impl UserDashboard {
    pub async fn load(client: &ApiClient) -> AppResult<Self> {
        let courses = CourseListParams {
            pagination: PaginationParams::with_limit(RECENT_COURSES),
            ..CourseListParams::default()
        };
        let transactions = TransactionListParams {
            pagination: PaginationParams::with_limit(RECENT_TRANSACTIONS),
            ..TransactionListParams::default()
        };

        let (stats, courses, transactions) = tokio::try_join!(
            Course::stats(client),
            Course::page_for_viewer(client, &courses),
            Transaction::page_for_viewer(client, &transactions)
        )?;

        Ok(Self {
            stats,
            recent_courses: courses.data,
            recent_transactions: transactions.data,
        })
    }
}
