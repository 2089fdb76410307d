//! Typed statement parameters and binding onto sqlx queries.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use uuid::Uuid;

/// A value that can be bound to a PostgreSQL query.
#[derive(Clone, Debug)]
pub enum PgParam {
    Uuid(Uuid),
    /// Bound as JSONB.
    Json(serde_json::Value),
}

/// Bind every parameter, in order, onto `query`.
pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[PgParam],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            PgParam::Uuid(u) => query.bind(*u),
            PgParam::Json(v) => query.bind(v.clone()),
        };
    }
    query
}
