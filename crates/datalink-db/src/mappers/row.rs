//! Decode rows by the database type of each column

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Decimal;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};
use uuid::Uuid;

use crate::models::{SqlRow, SqlValue};
use crate::repositories::{DbError, DbResult};

/// How a column is read, chosen from its Postgres type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Char,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Text,
    Bytes,
    Json,
    Timestamptz,
    Timestamp,
    Date,
    Time,
    Uuid,
    BoolArray,
    Int2Array,
    Int4Array,
    Int8Array,
    Float8Array,
    NumericArray,
    TextArray,
    UuidArray,
}

impl ColumnKind {
    fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "BOOL" => Self::Bool,
            "\"CHAR\"" => Self::Char,
            "INT2" => Self::Int2,
            "INT4" => Self::Int4,
            "INT8" => Self::Int8,
            "OID" => Self::Oid,
            "FLOAT4" => Self::Float4,
            "FLOAT8" => Self::Float8,
            "NUMERIC" => Self::Numeric,
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => Self::Text,
            "BYTEA" => Self::Bytes,
            "JSON" | "JSONB" => Self::Json,
            "TIMESTAMPTZ" => Self::Timestamptz,
            "TIMESTAMP" => Self::Timestamp,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "UUID" => Self::Uuid,
            "BOOL[]" => Self::BoolArray,
            "INT2[]" => Self::Int2Array,
            "INT4[]" => Self::Int4Array,
            "INT8[]" => Self::Int8Array,
            "FLOAT8[]" => Self::Float8Array,
            "NUMERIC[]" => Self::NumericArray,
            "TEXT[]" | "VARCHAR[]" => Self::TextArray,
            "UUID[]" => Self::UuidArray,
            _ => return None,
        };
        Some(kind)
    }
}

/// Convert every column of a row into a [`SqlValue`]
///
/// A column whose type has no decoder fails the whole row with
/// [`DbError::UnsupportedType`]; cast it to `text` in the statement instead.
pub fn decode_row(row: &PgRow) -> DbResult<SqlRow> {
    row.columns()
        .iter()
        .map(|column| {
            let type_name = column.type_info().name();
            let Some(kind) = ColumnKind::from_type_name(type_name) else {
                tracing::error!(column = column.name(), type_name, "No decoder for column type");
                return Err(DbError::UnsupportedType {
                    column: column.name().to_string(),
                    type_name: type_name.to_string(),
                });
            };
            decode_column(row, column.ordinal(), kind)
        })
        .collect()
}

fn decode_column(row: &PgRow, index: usize, kind: ColumnKind) -> DbResult<SqlValue> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }

    let value = match kind {
        ColumnKind::Bool => SqlValue::Bool(get(row, index)?),
        ColumnKind::Char => SqlValue::Int(i64::from(get::<i8>(row, index)?)),
        ColumnKind::Int2 => SqlValue::from(get::<i16>(row, index)?),
        ColumnKind::Int4 => SqlValue::from(get::<i32>(row, index)?),
        ColumnKind::Int8 => SqlValue::Int(get(row, index)?),
        ColumnKind::Oid => SqlValue::Int(i64::from(get::<sqlx::postgres::types::Oid>(row, index)?.0)),
        ColumnKind::Float4 => SqlValue::from(get::<f32>(row, index)?),
        ColumnKind::Float8 => SqlValue::Float(get(row, index)?),
        ColumnKind::Numeric => SqlValue::Numeric(get(row, index)?),
        ColumnKind::Text => SqlValue::Text(get(row, index)?),
        ColumnKind::Bytes => SqlValue::Bytes(get(row, index)?),
        ColumnKind::Json => SqlValue::Json(get(row, index)?),
        ColumnKind::Timestamptz => SqlValue::Timestamp(get::<DateTime<Utc>>(row, index)?),
        ColumnKind::Timestamp => SqlValue::DateTime(get::<NaiveDateTime>(row, index)?),
        ColumnKind::Date => SqlValue::Date(get::<NaiveDate>(row, index)?),
        ColumnKind::Time => SqlValue::Time(get::<NaiveTime>(row, index)?),
        ColumnKind::Uuid => SqlValue::Uuid(get(row, index)?),
        ColumnKind::BoolArray => SqlValue::from(get::<Vec<Option<bool>>>(row, index)?),
        ColumnKind::Int2Array => SqlValue::from(get::<Vec<Option<i16>>>(row, index)?),
        ColumnKind::Int4Array => SqlValue::from(get::<Vec<Option<i32>>>(row, index)?),
        ColumnKind::Int8Array => SqlValue::from(get::<Vec<Option<i64>>>(row, index)?),
        ColumnKind::Float8Array => SqlValue::from(get::<Vec<Option<f64>>>(row, index)?),
        ColumnKind::NumericArray => SqlValue::from(get::<Vec<Option<Decimal>>>(row, index)?),
        ColumnKind::TextArray => SqlValue::from(get::<Vec<Option<String>>>(row, index)?),
        ColumnKind::UuidArray => SqlValue::from(get::<Vec<Option<Uuid>>>(row, index)?),
    };
    Ok(value)
}

fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<T, sqlx::Error>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(index)
}
