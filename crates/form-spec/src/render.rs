use serde_json::{Map, Value, json};

use crate::spec::field::{Field, FieldOption, FieldType};
use crate::spec::validation::ValidationType;
use crate::visibility::should_show;

/// Describes a single visible field for preview outputs.
#[derive(Debug, Clone)]
pub struct PreviewField {
    pub id: String,
    pub kind: FieldType,
    pub label: String,
    pub required: bool,
    pub input_type: &'static str,
    pub pattern: Option<String>,
    pub accept: Option<String>,
    pub placeholder: Option<&'static str>,
    pub options: Vec<FieldOption>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct PreviewPayload {
    pub total: usize,
    pub fields: Vec<PreviewField>,
}

/// Build the preview payload from the fields that are currently visible.
pub fn build_preview(fields: &[Field]) -> PreviewPayload {
    let visible = fields
        .iter()
        .filter(|field| should_show(field, fields))
        .map(preview_field)
        .collect();

    PreviewPayload {
        total: fields.len(),
        fields: visible,
    }
}

fn preview_field(field: &Field) -> PreviewField {
    let rules = &field.validation;
    let (input_type, pattern, placeholder) = match field.kind {
        FieldType::Text => (rules.input_type(), rules.pattern(), Some(placeholder(field))),
        FieldType::Textarea => ("textarea", rules.pattern(), Some(placeholder(field))),
        FieldType::File => ("file", None, None),
        FieldType::Dropdown => ("select", None, None),
        FieldType::Checkbox => ("checkbox", None, None),
        FieldType::Radio => ("radio", None, None),
    };
    let accept = match field.kind {
        FieldType::File => rules.accept(),
        _ => None,
    };

    PreviewField {
        id: field.id.to_string(),
        kind: field.kind,
        label: field.label.clone(),
        required: rules.required,
        input_type,
        pattern,
        accept,
        placeholder,
        options: field.options.clone(),
    }
}

fn placeholder(field: &Field) -> &'static str {
    if field.validation.kind == ValidationType::Phone {
        "Enter your phone number"
    } else {
        "Enter your text"
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &PreviewPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(field.id.clone()));
            map.insert("type".into(), Value::String(field.kind.as_str().into()));
            map.insert("label".into(), Value::String(field.label.clone()));
            map.insert("required".into(), Value::Bool(field.required));
            map.insert("inputType".into(), Value::String(field.input_type.into()));
            if let Some(pattern) = &field.pattern {
                map.insert("pattern".into(), Value::String(pattern.clone()));
            }
            if let Some(accept) = &field.accept {
                map.insert("accept".into(), Value::String(accept.clone()));
            }
            if let Some(placeholder) = field.placeholder {
                map.insert("placeholder".into(), Value::String(placeholder.into()));
            }
            if field.kind.is_choice() {
                map.insert(
                    "options".into(),
                    Value::Array(
                        field
                            .options
                            .iter()
                            .map(|option| json!({ "label": option.label, "subLabel": option.sub_label }))
                            .collect(),
                    ),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "visible": payload.fields.len(),
        "total": payload.total,
        "fields": fields,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &PreviewPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Form preview ({}/{} fields visible)",
        payload.fields.len(),
        payload.total
    ));

    if payload.fields.is_empty() {
        lines.push("No visible fields.".to_string());
    }

    for field in &payload.fields {
        let label = if field.label.is_empty() {
            "<unlabeled>"
        } else {
            field.label.as_str()
        };
        let mut entry = format!(" - {} [{}] {}", field.id, field.kind, label);
        if field.required {
            entry.push_str(" *");
        }
        lines.push(entry);

        if let Some(pattern) = &field.pattern {
            lines.push(format!("   pattern: {}", pattern));
        }
        if let Some(accept) = &field.accept {
            lines.push(format!("   accept: {}", accept));
        }
        for option in &field.options {
            match field.kind {
                FieldType::Dropdown => lines.push(format!("   * {}", option.label)),
                _ => lines.push(format!("   * {} - {}", option.label, option.sub_label)),
            }
        }
    }

    lines.join("\n")
}
