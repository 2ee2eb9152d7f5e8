use serde_json::Value;

/// Human-readable (Spanish) labels, keyed by normalized field name so
/// both the camelCase application keys and the flattened storage
/// columns resolve to the same label.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("workername", "Nombre"),
    ("employeeid", "Nº Empleado"),
    ("email", "Correo electrónico"),
    ("incidentdate", "Fecha del incidente"),
    ("shiftstarttime", "Hora inicio jornada"),
    ("shiftendtime", "Hora prevista finalización"),
    ("locationonreceipt", "Ubicación al recibir servicio"),
    ("assignmenttime", "Hora asignación"),
    ("remainingshifttime", "Tiempo restante jornada (minutos)"),
    ("pickupaddress", "Dirección recogida"),
    ("destinationaddress", "Dirección destino"),
    ("traveltimetoorigin", "Tiempo desplazamiento a origen (min)"),
    ("traveltimeorigintodestination", "Tiempo origen-destino (min)"),
    ("traveltimedestinationtobase", "Tiempo destino a base (min)"),
    ("estimatedworktimeorigin", "Tiempo trabajo en origen (min)"),
    ("estimatedworktimedestination", "Tiempo trabajo en destino (min)"),
    ("totalestimatedservicetime", "Tiempo completo estimado del servicio (min)"),
    ("complications", "Complicaciones en la ejecución"),
    ("exceedsremainingtime", "¿Excede tiempo restante de jornada?"),
    ("unforeseencomplications", "¿Complicaciones imprevistas?"),
    ("affectedpersonallife", "¿Afectó vida personal?"),
    ("exceededoveronehour", "¿Exceso > 1 hora?"),
    ("excessminutes", "Exceso total en minutos"),
    ("impactexplanation", "Explicación del impacto"),
    ("generatedroadrisk", "¿Se generó un peligro o riesgo vial?"),
    ("additionalhoursworked", "Horas adicionales trabajadas"),
    ("riskdetails", "Detallar riesgo"),
    ("coordinatorname", "Coordinador que asignó el servicio"),
    ("timeslast30days", "Veces que ha ocurrido en los últimos 30 días"),
    ("assignmentpattern", "¿Cree que existe un patrón de asignación?"),
    ("personalintent", "¿Cree que hubo intencionalidad personal?"),
    ("patterndescription", "Descripción del patrón o comportamiento"),
    ("registerforlegalaction", "¿Registrar para acciones legales?"),
    ("notifylaborinspectorate", "¿Notificar a Inspección de Trabajo?"),
    ("servicetypehospitaldischarge", "Alta hospitalaria"),
    ("servicetypenonurgenttransfer", "Traslado no urgente"),
    ("servicetypeother", "Otro tipo de servicio"),
    ("servicetypeothertext", "Descripción otro servicio"),
];

const SCREENSHOT_PLACEHOLDER: &str = "Captura de pantalla disponible";

/// Lowercase and strip underscores, so `shiftStartTime` and
/// `shiftstarttime` normalize to the same key.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn label_for(key: &str) -> Option<&'static str> {
    let normalized = normalize_key(key);
    FIELD_LABELS
        .iter()
        .find(|(k, _)| *k == normalized)
        .map(|(_, label)| *label)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(true) => "Sí".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| format!("{k}: {}", format_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn service_type_row(form_data: &Value) -> String {
    let Some(group) = form_data.get("serviceType").and_then(Value::as_object) else {
        return String::new();
    };

    let mut kinds = Vec::new();
    if group.get("hospitalDischarge").and_then(Value::as_bool) == Some(true) {
        kinds.push("Alta hospitalaria".to_string());
    }
    if group.get("nonUrgentTransfer").and_then(Value::as_bool) == Some(true) {
        kinds.push("Traslado no urgente".to_string());
    }
    if group.get("other").and_then(Value::as_bool) == Some(true) {
        match group.get("otherText").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => kinds.push(format!("Otro: {text}")),
            _ => kinds.push("Otro".to_string()),
        }
    }

    let joined = if kinds.is_empty() { "-".to_string() } else { kinds.join(", ") };
    format!(
        "<tr><th align=\"left\" style=\"background:#f3f4f6;\">Tipo de servicio</th><td>{joined}</td></tr>"
    )
}

fn is_excluded(key: &str) -> bool {
    let normalized = normalize_key(key);
    normalized == "id"
        || normalized == "submissiontimestamp"
        || normalized.starts_with("screenshot")
        || key == "serviceType"
}

/// Render the submission as a label-translated HTML table. Raw
/// screenshot URLs never appear; a placeholder row signals that
/// evidence exists in the internal system.
pub fn render_table(form_data: &Value) -> String {
    let mut rows = service_type_row(form_data);

    if let Some(obj) = form_data.as_object() {
        for (key, value) in obj {
            if is_excluded(key) {
                continue;
            }
            let label = label_for(key)
                .map(str::to_string)
                .unwrap_or_else(|| format!("<span style=\"color:#e11d48;\">{key}</span>"));
            rows.push_str(&format!(
                "<tr><th align=\"left\" style=\"background:#f3f4f6;\">{label}</th><td>{}</td></tr>",
                format_value(value)
            ));
        }

        let screenshots = ["screenshot1_url", "screenshot2_url", "screenshot3_url"]
            .iter()
            .filter(|k| {
                obj.get(**k)
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty())
            })
            .count();
        if screenshots > 0 {
            let placeholders = vec![SCREENSHOT_PLACEHOLDER; screenshots].join(", ");
            rows.push_str(&format!(
                "<tr><th align=\"left\" style=\"background:#f3f4f6;\">Capturas de pantalla</th><td>{placeholders}</td></tr>"
            ));
        }
    }

    format!(
        "<table border=\"1\" cellpadding=\"6\" cellspacing=\"0\" style=\"border-collapse:collapse;font-size:15px;\">{rows}</table>"
    )
}

pub fn render_submission_copy(form_data: &Value) -> String {
    let table = render_table(form_data);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color:#1e293b;">Registro de Exceso de Jornada</h2>
    <p>Gracias por rellenar el formulario. Aquí tienes una copia completa de tu registro:</p>
    {table}
    <p style="font-size:13px;color:#64748b;">
        <strong>Nota de seguridad:</strong> Este email contiene solo la información del formulario.
        Las capturas de pantalla están disponibles en el sistema interno para el personal autorizado.
    </p>
    <p style="font-size:13px;color:#64748b;">
        Este email es una copia automática para tu registro personal y para la sección de RRHH del comité de empresa.
    </p>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_lookup_accepts_both_shapes() {
        assert_eq!(label_for("shiftStartTime"), Some("Hora inicio jornada"));
        assert_eq!(label_for("shiftstarttime"), Some("Hora inicio jornada"));
        assert_eq!(label_for("servicetype_othertext"), Some("Descripción otro servicio"));
        assert_eq!(label_for("totallyUnknown"), None);
    }

    #[test]
    fn table_excludes_raw_screenshot_urls() {
        let data = json!({
            "workerName": "Ana",
            "screenshot1_url": "https://cdn.example.com/screenshots/abc/img1.png"
        });
        let html = render_table(&data);
        assert!(!html.contains("cdn.example.com"));
        assert!(html.contains(SCREENSHOT_PLACEHOLDER));
        assert!(html.contains("Nombre"));
    }

    #[test]
    fn table_joins_service_types() {
        let data = json!({
            "serviceType": {
                "hospitalDischarge": true,
                "nonUrgentTransfer": false,
                "other": true,
                "otherText": "Evento deportivo"
            }
        });
        let html = render_table(&data);
        assert!(html.contains("Alta hospitalaria, Otro: Evento deportivo"));
        // The group renders once, as the joined row.
        assert!(!html.contains("hospitalDischarge"));
    }

    #[test]
    fn copy_wraps_table() {
        let html = render_submission_copy(&json!({ "workerName": "Ana" }));
        assert!(html.contains("Registro de Exceso de Jornada"));
        assert!(html.contains("<table"));
    }
}
