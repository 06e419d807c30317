//! Core type definitions used across the workspace.

pub mod expression;
pub mod pagination;
pub mod sorting;
pub mod timestamp;
pub mod value;

pub use expression::{FilterExpr, Predicate, SortKey, SqlFragment, and, build_equals, build_sort_key, or};
pub use pagination::{PaginationQuery, PaginationResult};
pub use sorting::{SortDirection, SortField};
pub use timestamp::now_unix;
pub use value::FieldValue;
