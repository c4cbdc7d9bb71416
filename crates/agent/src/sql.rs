//! SQL branch helpers.
//!
//! Schema introspection, extraction of a SQL statement from model output,
//! table-existence validation, and read-only query execution against the
//! configured SQLite database.

use clerk_core::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub datatype: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaTable {
    pub table: String,
    pub columns: Vec<SchemaColumn>,
}

/// The schema document handed to the SQL generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub database: String,
    pub tables: Vec<SchemaTable>,
}

impl DatabaseSchema {
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn open_read_only(db_path: &Path) -> AppResult<Connection> {
    Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Sql(format!("Failed to open database {:?}: {}", db_path, e)))
}

/// Read table and column metadata from a SQLite database.
pub fn introspect_schema(db_path: &Path) -> AppResult<DatabaseSchema> {
    if !db_path.exists() {
        return Err(AppError::Sql(format!(
            "Database file {:?} does not exist",
            db_path
        )));
    }

    let conn = open_read_only(db_path)?;
    let table_names = list_tables(&conn)?;
    if table_names.is_empty() {
        return Err(AppError::Sql("No tables found in the database".to_string()));
    }

    let mut tables = Vec::with_capacity(table_names.len());
    for name in table_names {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info(\"{}\")", name))
            .map_err(|e| AppError::Sql(format!("Failed to inspect table {}: {}", name, e)))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(SchemaColumn {
                    name: row.get(1)?,
                    datatype: row.get(2)?,
                })
            })
            .map_err(|e| AppError::Sql(format!("Failed to read columns of {}: {}", name, e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Sql(format!("Failed to read columns of {}: {}", name, e)))?;

        tables.push(SchemaTable {
            table: name,
            columns,
        });
    }

    Ok(DatabaseSchema {
        database: db_path.display().to_string(),
        tables,
    })
}

fn list_tables(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .map_err(|e| AppError::Sql(format!("Failed to list tables: {}", e)))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| AppError::Sql(format!("Failed to list tables: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Sql(format!("Failed to list tables: {}", e)))?;
    Ok(names)
}

/// Extract the first `SELECT ... ;` statement from model output, if any.
///
/// Models occasionally pad the statement with prose or code fences despite
/// the prompt contract; this keeps only the statement itself.
pub fn extract_sql_query(text: &str) -> Option<String> {
    // Byte-window scan: "select" is pure ASCII, so a match can only start
    // on a char boundary even in non-ASCII surroundings.
    let start = text
        .as_bytes()
        .windows(6)
        .position(|w| w.eq_ignore_ascii_case(b"select"))?;
    let end = text[start..].find(';')?;
    Some(text[start..start + end + 1].trim().to_string())
}

/// Whether the input already looks like a SQL statement.
///
/// Deliberately strict: plain English questions share words like "where"
/// and "from" with SQL, so only a leading statement verb counts.
pub fn looks_like_sql(input: &str) -> bool {
    const VERBS: [&str; 4] = ["select", "insert", "update", "delete"];
    let lower = input.trim_start().to_lowercase();
    VERBS.iter().any(|v| lower.starts_with(v))
}

/// Table names referenced after FROM/JOIN/INTO/UPDATE keywords.
///
/// A token scan, not a parser; sufficient for the single-statement SELECT
/// queries the generation prompt produces.
pub fn tables_in_query(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let mut tables = Vec::new();
    for pair in words.windows(2) {
        let keyword = pair[0].to_lowercase();
        if matches!(keyword.as_str(), "from" | "join" | "into" | "update") {
            let table = pair[1].trim_matches(|c| c == ';' || c == ',' || c == '"');
            if !table.is_empty() && !tables.iter().any(|t| t == table) {
                tables.push(table.to_string());
            }
        }
    }
    tables
}

/// Whether every table referenced by `query` exists in the database.
pub fn tables_exist(db_path: &Path, query: &str) -> AppResult<bool> {
    let conn = open_read_only(db_path)?;
    let known = list_tables(&conn)?;
    Ok(tables_in_query(query)
        .iter()
        .all(|table| known.iter().any(|k| k == table)))
}

/// Run a read-only query and render the result set as aligned text rows.
pub fn execute_query(db_path: &Path, query: &str) -> AppResult<String> {
    let conn = open_read_only(db_path)?;
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| AppError::Sql(format!("Failed to prepare query: {}", e)))?;

    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let column_count = column_names.len();

    let rows = stmt
        .query_map([], |row| {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value: rusqlite::types::Value = row.get(i)?;
                values.push(render_value(value));
            }
            Ok(values)
        })
        .map_err(|e| AppError::Sql(format!("Failed to execute query: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Sql(format!("Failed to read result rows: {}", e)))?;

    let mut output = column_names.join(" | ");
    for row in &rows {
        output.push('\n');
        output.push_str(&row.join(" | "));
    }
    if rows.is_empty() {
        output.push_str("\n(no rows)");
    }
    Ok(output)
}

fn render_value(value: rusqlite::types::Value) -> String {
    use rusqlite::types::Value;
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
