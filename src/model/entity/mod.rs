mod user;
pub use user::{LoginRequest, User};

mod category;
pub use category::{Category, CategoryCreate, CategoryUpdate};

mod course;
pub use course::{CategoryRef, Course, CourseCreate, UserStats};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonUpdate, sort_by_order};

mod progress;
pub use progress::{CourseProgress, LessonProgress};

mod transaction;
pub use transaction::{
    DEFAULT_PAYMENT_METHOD, Transaction, TransactionCreate, TransactionStatus,
    TransactionStatusUpdate,
};
