//! Value types shared by every kernel.

mod value;

pub use value::{ColumnType, Scalar, SortOrder};
