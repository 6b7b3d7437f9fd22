//! Postgres row -> [`SqlRow`](crate::SqlRow) decoding

mod row;

pub use row::decode_row;
