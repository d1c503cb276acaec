pub mod codec;
pub use codec::{FieldKind, FieldSpec, QsMap, QsSchema, QsValue};

mod params;
pub use params::{
    CategoryListParams, CourseListParams, HasPagination, LessonListParams, PaginationOptions,
    PaginationParams, QueryParams, SortDirection, TransactionListParams, pagination_schema,
};
