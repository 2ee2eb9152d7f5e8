use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::mapper::{self, FieldKind};

/// Insert an encoded (storage-shape) record. The column list comes
/// from the mapper's allow-list table, never from the input map.
pub async fn create(pool: &PgPool, encoded: &Map<String, Value>) -> Result<(), sqlx::Error> {
    let columns: Vec<&str> = mapper::FIELDS.iter().map(|f| f.column).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    let sql = format!(
        "INSERT INTO submissions ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut query = sqlx::query(&sql);
    for field in mapper::FIELDS {
        query = match field.kind {
            FieldKind::Flag => query.bind(
                encoded
                    .get(field.column)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            ),
            FieldKind::Text | FieldKind::TriState => query.bind(
                encoded
                    .get(field.column)
                    .and_then(Value::as_str)
                    .map(str::to_string),
            ),
        };
    }

    query.execute(pool).await?;
    Ok(())
}

pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
    pub sort_by: String,
    pub sort_order: String,
    pub search: Option<String>,
}

const SEARCH_CLAUSE: &str = "(workername ILIKE $3 OR employeeid ILIKE $3
         OR incidentdate ILIKE $3 OR coordinatorname ILIKE $3)";

fn sort_column(requested: &str) -> &'static str {
    match requested {
        "workername" => "workername",
        "employeeid" => "employeeid",
        "incidentdate" => "incidentdate",
        "excessminutes" => "excessminutes",
        "coordinatorname" => "coordinatorname",
        _ => "submissiontimestamp",
    }
}

/// List storage rows as JSON objects (one per row, all columns).
pub async fn list(pool: &PgPool, params: &ListParams) -> Result<Vec<Value>, sqlx::Error> {
    let order = if params.sort_order == "asc" { "ASC" } else { "DESC" };
    let sort_col = sort_column(&params.sort_by);

    if let Some(search) = &params.search {
        let pattern = format!("%{search}%");
        sqlx::query_scalar::<_, Value>(&format!(
            "SELECT row_to_json(s) FROM submissions s
             WHERE {SEARCH_CLAUSE}
             ORDER BY {sort_col} {order} LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit)
        .bind(params.offset)
        .bind(pattern)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_scalar::<_, Value>(&format!(
            "SELECT row_to_json(s) FROM submissions s
             ORDER BY {sort_col} {order} LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(pool)
        .await
    }
}

pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = if let Some(search) = search {
        let pattern = format!("%{search}%");
        sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM submissions s WHERE {}",
            SEARCH_CLAUSE.replace("$3", "$1")
        ))
        .bind(pattern)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as("SELECT COUNT(*) FROM submissions")
            .fetch_one(pool)
            .await?
    };
    Ok(row.0)
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Value>, sqlx::Error> {
    sqlx::query_scalar::<_, Value>("SELECT row_to_json(s) FROM submissions s WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Full dump, newest first. Used by export and the stats endpoint.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Value>, sqlx::Error> {
    sqlx::query_scalar::<_, Value>(
        "SELECT row_to_json(s) FROM submissions s ORDER BY submissiontimestamp DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
