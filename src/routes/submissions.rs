use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AdminUser;
use crate::db;
use crate::error::AppError;
use crate::mapper;
use crate::state::SharedState;
use crate::submission::{parse_intake, pipeline};

pub async fn create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let intake = parse_intake(&headers, body).await?;
    let id = pipeline::run(&state, intake).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "created", "id": id })),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

pub async fn list(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let params = db::submissions::ListParams {
        limit: per_page,
        offset: (page - 1) * per_page,
        sort_by: query.sort_by.unwrap_or_default(),
        sort_order: query.sort_order.unwrap_or_default(),
        search: search.clone(),
    };

    let rows = db::submissions::list(&state.pool, &params).await?;
    let total = db::submissions::count(&state.pool, search.as_deref()).await?;

    let submissions: Vec<Value> = rows.iter().map(mapper::decode).collect();
    Ok(Json(json!({
        "submissions": submissions,
        "total": total,
        "page": page,
        "per_page": per_page,
    })))
}

pub async fn get_one(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let row = db::submissions::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
    Ok(Json(mapper::decode(&row)))
}

pub async fn delete(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let affected = db::submissions::delete(&state.pool, &id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("Submission not found".to_string()));
    }
    tracing::info!(%id, "submission deleted");
    Ok(Json(json!({ "message": "Deleted" })))
}

pub async fn export(
    _admin: AdminUser,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    let rows = db::submissions::list_all(&state.pool).await?;
    let submissions: Vec<Value> = rows.iter().map(mapper::decode).collect();
    Ok(Json(Value::Array(submissions)))
}

fn parse_timestamp(record: &Value) -> Option<DateTime<Utc>> {
    record
        .get("submissionTimestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn excess_minutes(record: &Value) -> i64 {
    record
        .get("excessMinutes")
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Tally a yes/no free-text answer. Anything other than a non-empty
/// string counts as unspecified.
fn tri_state_tally(records: &[Value], key: &str) -> Value {
    let mut yes = 0u64;
    let mut no = 0u64;
    let mut unspecified = 0u64;
    for record in records {
        match record.get(key).and_then(Value::as_str).map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("sí") || s.eq_ignore_ascii_case("si") || s.eq_ignore_ascii_case("yes") => yes += 1,
            Some(s) if s.eq_ignore_ascii_case("no") => no += 1,
            _ => unspecified += 1,
        }
    }
    json!({ "yes": yes, "no": no, "unspecified": unspecified })
}

pub async fn stats(
    _admin: AdminUser,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    let rows = db::submissions::list_all(&state.pool).await?;
    let records: Vec<Value> = rows.iter().map(mapper::decode).collect();

    let now = Utc::now();
    let week_ago = now - Duration::days(7);

    let total = records.len() as u64;
    let mut this_month = 0u64;
    let mut this_week = 0u64;
    let mut excess_sum = 0i64;
    let mut coordinators: HashMap<String, u64> = HashMap::new();

    for record in &records {
        if let Some(ts) = parse_timestamp(record) {
            if ts.year() == now.year() && ts.month() == now.month() {
                this_month += 1;
            }
            if ts >= week_ago {
                this_week += 1;
            }
        }
        excess_sum += excess_minutes(record);
        if let Some(name) = record.get("coordinatorName").and_then(Value::as_str) {
            let name = name.trim();
            if !name.is_empty() {
                *coordinators.entry(name.to_string()).or_default() += 1;
            }
        }
    }

    let mut top: Vec<(String, u64)> = coordinators.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(5);
    let top_coordinators: Vec<Value> = top
        .into_iter()
        .map(|(name, count)| json!({ "name": name, "count": count }))
        .collect();

    let average_excess_minutes = if total > 0 {
        excess_sum as f64 / total as f64
    } else {
        0.0
    };

    Ok(Json(json!({
        "total": total,
        "this_month": this_month,
        "this_week": this_week,
        "average_excess_minutes": average_excess_minutes,
        "top_coordinators": top_coordinators,
        "road_risk": tri_state_tally(&records, "generatedRoadRisk"),
        "legal_action": tri_state_tally(&records, "registerForLegalAction"),
        "personal_life": tri_state_tally(&records, "affectedPersonalLife"),
        "assignment_pattern": tri_state_tally(&records, "assignmentPattern"),
        "personal_intent": tri_state_tally(&records, "personalIntent"),
        "labor_inspectorate": tri_state_tally(&records, "notifyLaborInspectorate"),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_split_yes_no_unspecified() {
        let records = vec![
            json!({ "generatedRoadRisk": "Sí" }),
            json!({ "generatedRoadRisk": "no" }),
            json!({ "generatedRoadRisk": "" }),
            json!({}),
        ];
        let tally = tri_state_tally(&records, "generatedRoadRisk");
        assert_eq!(tally["yes"], 1);
        assert_eq!(tally["no"], 1);
        assert_eq!(tally["unspecified"], 2);
    }

    #[test]
    fn excess_minutes_defaults_to_zero() {
        assert_eq!(excess_minutes(&json!({ "excessMinutes": "45" })), 45);
        assert_eq!(excess_minutes(&json!({ "excessMinutes": "n/a" })), 0);
        assert_eq!(excess_minutes(&json!({})), 0);
    }
}
