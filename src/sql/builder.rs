//! Builds parameterized statements for the document and relational backends.
//! Identifiers come from entity type names and serialized field names only; values are parameters.

use super::params::PgParam;
use uuid::Uuid;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// JSON key holding the soft-delete timestamp inside stored documents.
const DELETION_KEY: &str = "deletion_date";

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgParam>,
}

impl QueryBuf {
    fn new(sql: String) -> Self {
        QueryBuf { sql, params: Vec::new() }
    }

    fn push_param(&mut self, v: PgParam) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }

    /// Narrow a filtered SELECT to one id. Callers build on the active-records query
    /// so every filter applied there also applies here.
    pub fn and_id_eq(mut self, id: Uuid) -> Self {
        let n = self.push_param(PgParam::Uuid(id));
        self.sql.push_str(&format!(" AND {} = ${}", quoted("id"), n));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.sql.push_str(&format!(" LIMIT {}", n));
        self
    }

    fn for_update(mut self) -> Self {
        self.sql.push_str(" FOR UPDATE");
        self
    }
}

// Document collections: (id UUID, document JSONB).

pub fn create_collection(schema: &str, collection: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (id UUID PRIMARY KEY, document JSONB NOT NULL)",
        qualified_table(schema, collection)
    )
}

/// SELECT every active document. `->>` yields SQL NULL for both a missing key and JSON null.
pub fn active_documents(schema: &str, collection: &str) -> QueryBuf {
    QueryBuf::new(format!(
        "SELECT document FROM {} WHERE document->>'{}' IS NULL",
        qualified_table(schema, collection),
        DELETION_KEY
    ))
}

pub fn insert_document(schema: &str, collection: &str, id: Uuid, document: serde_json::Value) -> QueryBuf {
    let mut q = QueryBuf::new(format!(
        "INSERT INTO {} (id, document) VALUES ($1, $2)",
        qualified_table(schema, collection)
    ));
    q.push_param(PgParam::Uuid(id));
    q.push_param(PgParam::Json(document));
    q
}

/// Replace the active document at `id` in one statement, keeping its stored creation date.
/// Returns the new document, or no row when nothing active matched.
pub fn replace_document(schema: &str, collection: &str, id: Uuid, document: serde_json::Value) -> QueryBuf {
    let mut q = QueryBuf::new(format!(
        "UPDATE {} SET document = $2 || jsonb_build_object('creation_date', document->'creation_date') \
         WHERE id = $1 AND document->>'{}' IS NULL RETURNING document",
        qualified_table(schema, collection),
        DELETION_KEY
    ));
    q.push_param(PgParam::Uuid(id));
    q.push_param(PgParam::Json(document));
    q
}

// Relational tables: one column per serialized field.

/// SELECT every active row as a JSON object.
pub fn active_rows(schema: &str, table: &str) -> QueryBuf {
    QueryBuf::new(format!(
        "SELECT row_to_json(t) AS row FROM {} t WHERE t.{} IS NULL",
        qualified_table(schema, table),
        quoted(DELETION_KEY)
    ))
}

/// Existence probe: COUNT over at most one active row.
pub fn count_active_by_id(schema: &str, table: &str, id: Uuid) -> QueryBuf {
    let mut q = QueryBuf::new(format!(
        "SELECT COUNT(*) FROM (SELECT 1 FROM {} WHERE {} = $1 AND {} IS NULL LIMIT 1) AS probe",
        qualified_table(schema, table),
        quoted("id"),
        quoted(DELETION_KEY)
    ));
    q.push_param(PgParam::Uuid(id));
    q
}

/// Lock the active row at `id` for the rest of the transaction.
pub fn lock_active_row(schema: &str, table: &str, id: Uuid) -> QueryBuf {
    active_rows(schema, table)
        .and_id_eq(id)
        .for_update()
}

/// INSERT one row; the database maps JSON keys to typed columns.
pub fn insert_row(schema: &str, table: &str, row: serde_json::Value) -> QueryBuf {
    let table = qualified_table(schema, table);
    let mut q = QueryBuf::new(format!(
        "INSERT INTO {} SELECT * FROM jsonb_populate_record(NULL::{}, $1)",
        table, table
    ));
    q.push_param(PgParam::Json(row));
    q
}

/// UPDATE every listed column at `id` from the incoming row. Returns the stored row.
pub fn update_row(schema: &str, table: &str, id: Uuid, columns: &[&str], row: serde_json::Value) -> QueryBuf {
    let table = qualified_table(schema, table);
    let sets = columns
        .iter()
        .map(|c| format!("{} = src.{}", quoted(c), quoted(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut q = QueryBuf::new(format!(
        "UPDATE {} AS t SET {} FROM jsonb_populate_record(NULL::{}, $2) AS src \
         WHERE t.{} = $1 RETURNING row_to_json(t) AS row",
        table,
        sets,
        table,
        quoted("id")
    ));
    q.push_param(PgParam::Uuid(id));
    q.push_param(PgParam::Json(row));
    q
}
