//! Identifier checks and statement building

use crate::models::SqlValue;

/// Whether `name` is safe to splice into SQL as a table or column name
///
/// Accepts exactly `^[A-Za-z_][A-Za-z0-9_]*$`.
pub fn validate_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Build a parameterized insert for `table`
///
/// Identifiers must already be validated. The table name is quoted, column
/// names are not. Null values are written as a literal `NULL` and every other
/// value gets the next placeholder, so the parameters to bind are the
/// non-null values in column order. An empty column list inserts a row of
/// defaults.
pub fn build_insert_sql<'a, I>(table: &str, columns: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a SqlValue)>,
{
    let mut names = Vec::new();
    let mut values = Vec::new();
    let mut placeholders = 0;
    for (name, value) in columns {
        names.push(name);
        if value.is_null() {
            values.push("NULL".to_string());
        } else {
            placeholders += 1;
            values.push(format!("${placeholders}"));
        }
    }

    if names.is_empty() {
        return format!("INSERT INTO \"{table}\" DEFAULT VALUES");
    }
    format!(
        "INSERT INTO \"{table}\" ({}) VALUES ({})",
        names.join(", "),
        values.join(", ")
    )
}
