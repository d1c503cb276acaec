mod client;
pub use client::{ApiClient, REQUEST_ID_HEADER};

mod error;
pub use error::{ApiError, ApiResult, ErrorBody};
