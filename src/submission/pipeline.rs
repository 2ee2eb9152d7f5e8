use chrono::Utc;
use serde_json::Value;

use crate::db;
use crate::error::AppError;
use crate::mapper;
use crate::state::SharedState;
use crate::storage::content_type_for;
use crate::submission::Intake;

const REQUIRED_FIELDS: [&str; 9] = [
    "workerName",
    "employeeId",
    "incidentDate",
    "travelTimeToOrigin",
    "travelTimeOriginToDestination",
    "travelTimeDestinationToBase",
    "estimatedWorkTimeOrigin",
    "estimatedWorkTimeDestination",
    "totalEstimatedServiceTime",
];

fn field_present(record: &Value, key: &str) -> bool {
    match record.get(key) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn validate(intake: &Intake) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !field_present(&intake.record, f))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if intake.screenshots.iter().any(Option::is_none) {
        return Err(AppError::Validation(
            "All three screenshots are required".to_string(),
        ));
    }

    Ok(())
}

fn submission_id(record: &Value, epoch_millis: i64) -> String {
    let employee_id = record["employeeId"].as_str().unwrap_or_default();
    let worker_name: String = record["workerName"]
        .as_str()
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{employee_id}-{worker_name}-{epoch_millis}")
}

fn extension(file_name: Option<&str>) -> Option<String> {
    let name = file_name?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Run the full intake: validate, upload screenshots, encode to the
/// storage shape, persist, and send the submitter a copy when mail is
/// configured. Returns the generated submission id.
///
/// Uploads happen before the insert; if one fails mid-way the earlier
/// objects are left behind rather than compensated.
pub async fn run(state: &SharedState, intake: Intake) -> Result<String, AppError> {
    validate(&intake)?;

    let now = Utc::now();
    let millis = now.timestamp_millis();
    let id = submission_id(&intake.record, millis);

    let mut record = intake.record;
    record["id"] = Value::String(id.clone());
    record["submissionTimestamp"] = Value::String(now.to_rfc3339());

    for (slot, upload) in intake.screenshots.iter().enumerate() {
        // validate() guarantees all three slots are filled
        let Some(upload) = upload else { continue };
        let n = slot + 1;
        let key = match extension(upload.file_name.as_deref()) {
            Some(ext) => format!("{id}/screenshot{n}_{millis}.{ext}"),
            None => format!("{id}/screenshot{n}_{millis}"),
        };
        let content_type = content_type_for(&key);
        state
            .screenshots
            .upload(&key, content_type, upload.data.clone())
            .await
            .map_err(|e| AppError::Backend(format!("Screenshot upload failed: {e}")))?;
        record[format!("screenshot{n}_url")] =
            Value::String(state.screenshots.public_url(&key));
    }

    let encoded = mapper::encode(&record);
    db::submissions::create(&state.pool, &encoded).await?;
    tracing::info!(%id, "submission stored");

    // The submitter copy is best-effort; a mail failure never fails
    // the intake.
    if let Some(mailer) = &state.mailer {
        if let Some(email) = record.get("email").and_then(Value::as_str) {
            if !email.trim().is_empty() {
                if let Err(e) = mailer.send_submission_copy(email, &record).await {
                    tracing::warn!(%id, error = %e, "failed to send submission copy");
                }
            }
        }
    }

    Ok(id)
}
