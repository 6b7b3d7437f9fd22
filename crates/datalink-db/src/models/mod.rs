//! Values and rows exchanged with callers

mod value;

pub use value::{RowData, SqlRow, SqlValue};
