use axum::http::{header, HeaderMap};
use bytes::Bytes;
use futures_util::stream;
use serde_json::Value;

use crate::error::AppError;

/// One uploaded screenshot from the multipart body.
#[derive(Debug)]
pub struct IntakeUpload {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// The parsed multipart payload: the JSON record plus up to three
/// screenshot files, in slot order.
#[derive(Debug)]
pub struct Intake {
    pub record: Value,
    pub screenshots: [Option<IntakeUpload>; 3],
}

const SCREENSHOT_PARTS: [&str; 3] = ["screenshot1", "screenshot2", "screenshot3"];

/// Parse a `multipart/form-data` body into an [`Intake`]. Expects a
/// `data` part carrying the record as JSON and optional
/// `screenshot1..3` file parts. Unknown parts are ignored.
pub async fn parse_intake(headers: &HeaderMap, body: Bytes) -> Result<Intake, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("Missing Content-Type header".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| AppError::Validation("Expected multipart/form-data".to_string()))?;

    let body_stream = stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(body_stream, boundary);

    let mut record: Option<Value> = None;
    let mut screenshots: [Option<IntakeUpload>; 3] = [None, None, None];

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "data" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Unreadable data part: {e}")))?;
            let parsed: Value = serde_json::from_str(&text)
                .map_err(|_| AppError::Validation("Form data is not valid JSON".to_string()))?;
            if !parsed.is_object() {
                return Err(AppError::Validation(
                    "Form data must be a JSON object".to_string(),
                ));
            }
            record = Some(parsed);
        } else if let Some(slot) = SCREENSHOT_PARTS.iter().position(|p| *p == name) {
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Unreadable screenshot part: {e}")))?;
            if !data.is_empty() {
                screenshots[slot] = Some(IntakeUpload { file_name, data });
            }
        }
    }

    let record =
        record.ok_or_else(|| AppError::Validation("Missing data part".to_string()))?;

    Ok(Intake { record, screenshots })
}
