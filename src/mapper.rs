//! Bidirectional mapping between the application-level incident record
//! (nested, camelCase) and the flat lowercase column layout of the
//! `submissions` table.
//!
//! The table below is the single source of truth for both directions.
//! Storage columns are fully lowercased without word separators
//! (`workername`, not `worker_name`), so the reverse mapping cannot be
//! derived mechanically; columns mixing digits and words
//! (`screenshot1_url`) would additionally get their digit treated as a
//! word boundary. Unknown storage keys still fall back to a generic
//! snake_case to camelCase rewrite.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, stored as nullable TEXT.
    Text,
    /// Tri-state answer: `"yes"`, `"no"`, or null.
    TriState,
    /// Boolean flag inside the `serviceType` group, stored NOT NULL.
    Flag,
}

pub struct Field {
    /// Application key; `serviceType` members use a dotted path.
    pub app: &'static str,
    /// Storage column name.
    pub column: &'static str,
    pub kind: FieldKind,
}

const fn field(app: &'static str, column: &'static str, kind: FieldKind) -> Field {
    Field { app, column, kind }
}

/// The storage allow-list. Encode never emits a column outside this
/// table; anything else (notably the submitter `email`, which is used
/// for the copy relay but must never be persisted) is dropped.
pub const FIELDS: &[Field] = &[
    field("id", "id", FieldKind::Text),
    field("submissionTimestamp", "submissiontimestamp", FieldKind::Text),
    field("workerName", "workername", FieldKind::Text),
    field("employeeId", "employeeid", FieldKind::Text),
    field("incidentDate", "incidentdate", FieldKind::Text),
    field("shiftStartTime", "shiftstarttime", FieldKind::Text),
    field("shiftEndTime", "shiftendtime", FieldKind::Text),
    field("locationOnReceipt", "locationonreceipt", FieldKind::Text),
    field("serviceType.hospitalDischarge", "servicetype_hospitaldischarge", FieldKind::Flag),
    field("serviceType.nonUrgentTransfer", "servicetype_nonurgenttransfer", FieldKind::Flag),
    field("serviceType.other", "servicetype_other", FieldKind::Flag),
    field("serviceType.otherText", "servicetype_othertext", FieldKind::Text),
    field("assignmentTime", "assignmenttime", FieldKind::Text),
    field("remainingShiftTime", "remainingshifttime", FieldKind::Text),
    field("pickupAddress", "pickupaddress", FieldKind::Text),
    field("destinationAddress", "destinationaddress", FieldKind::Text),
    field("travelTimeToOrigin", "traveltimetoorigin", FieldKind::Text),
    field("travelTimeOriginToDestination", "traveltimeorigintodestination", FieldKind::Text),
    field("travelTimeDestinationToBase", "traveltimedestinationtobase", FieldKind::Text),
    field("estimatedWorkTimeOrigin", "estimatedworktimeorigin", FieldKind::Text),
    field("estimatedWorkTimeDestination", "estimatedworktimedestination", FieldKind::Text),
    field("totalEstimatedServiceTime", "totalestimatedservicetime", FieldKind::Text),
    field("complications", "complications", FieldKind::Text),
    field("exceedsRemainingTime", "exceedsremainingtime", FieldKind::TriState),
    field("unforeseenComplications", "unforeseencomplications", FieldKind::TriState),
    field("affectedPersonalLife", "affectedpersonallife", FieldKind::TriState),
    field("exceededOverOneHour", "exceededoveronehour", FieldKind::TriState),
    field("excessMinutes", "excessminutes", FieldKind::Text),
    field("impactExplanation", "impactexplanation", FieldKind::Text),
    field("generatedRoadRisk", "generatedroadrisk", FieldKind::TriState),
    field("additionalHoursWorked", "additionalhoursworked", FieldKind::Text),
    field("riskDetails", "riskdetails", FieldKind::Text),
    field("coordinatorName", "coordinatorname", FieldKind::Text),
    field("timesLast30Days", "timeslast30days", FieldKind::Text),
    field("assignmentPattern", "assignmentpattern", FieldKind::TriState),
    field("personalIntent", "personalintent", FieldKind::TriState),
    field("patternDescription", "patterndescription", FieldKind::Text),
    field("registerForLegalAction", "registerforlegalaction", FieldKind::TriState),
    field("notifyLaborInspectorate", "notifylaborinspectorate", FieldKind::TriState),
    field("screenshot1_url", "screenshot1_url", FieldKind::Text),
    field("screenshot2_url", "screenshot2_url", FieldKind::Text),
    field("screenshot3_url", "screenshot3_url", FieldKind::Text),
];

const SERVICE_TYPE: &str = "serviceType";

/// Flatten an application record into the storage column layout.
///
/// Fields absent from the input are omitted, except that a present
/// `serviceType` group always emits all four of its columns (flags
/// default to `false`, the free text to `""`). Values are coerced to
/// the storage value space: booleans, strings and null pass through,
/// numbers become their string representation, anything else is
/// stringified.
pub fn encode(record: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(obj) = record.as_object() else {
        return out;
    };

    for field in FIELDS {
        match field.app.split_once('.') {
            Some((group, sub)) => {
                debug_assert_eq!(group, SERVICE_TYPE);
                if let Some(g) = obj.get(group).and_then(Value::as_object) {
                    let value = match field.kind {
                        FieldKind::Flag => {
                            Value::Bool(g.get(sub).and_then(Value::as_bool).unwrap_or(false))
                        }
                        _ => coerce(
                            g.get(sub).cloned().unwrap_or_else(|| Value::String(String::new())),
                        ),
                    };
                    out.insert(field.column.to_string(), value);
                }
            }
            None => {
                if let Some(value) = obj.get(field.app) {
                    out.insert(field.column.to_string(), coerce(value.clone()));
                }
            }
        }
    }

    out
}

/// Rebuild an application record from a storage row. Array inputs map
/// element-wise. The `servicetype_*` columns always reassemble into a
/// single nested `serviceType` object, never stay flattened.
pub fn decode(row: &Value) -> Value {
    match row {
        Value::Array(items) => Value::Array(items.iter().map(decode).collect()),
        Value::Object(obj) => {
            let mut out = Map::new();
            let mut service_type = Map::new();

            for (key, value) in obj {
                match column_field(key) {
                    Some(field) => match field.app.split_once('.') {
                        Some((_, sub)) => {
                            service_type.insert(sub.to_string(), value.clone());
                        }
                        None => {
                            out.insert(field.app.to_string(), value.clone());
                        }
                    },
                    None => {
                        out.insert(snake_to_camel(key), decode(value));
                    }
                }
            }

            if !service_type.is_empty() {
                out.insert(SERVICE_TYPE.to_string(), Value::Object(service_type));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Authoritative lookup for a storage column.
pub fn column_field(column: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|f| f.column == column)
}

fn coerce(value: Value) -> Value {
    match value {
        Value::Bool(_) | Value::String(_) | Value::Null => value,
        Value::Number(n) => Value::String(n.to_string()),
        other => Value::String(other.to_string()),
    }
}

/// Generic fallback: rewrite `_x` sequences to uppercase `x`.
fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
