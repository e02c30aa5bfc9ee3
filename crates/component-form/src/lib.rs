use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use form_spec::{
    CodecError, FieldId, FieldStore, FieldType, Submission, build_preview, check_file_size,
    persisted_schema as form_persisted_schema, render_json_ui, render_text as form_render_text,
    resolve_visibility, validate,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("invalid form schema: {0}")]
    Schema(#[from] CodecError),
    #[error("failed to parse submission: {0}")]
    SubmissionParse(#[source] serde_json::Error),
    #[error("field '{0}' is not available")]
    FieldUnavailable(String),
    #[error("field '{0}' is not a file field")]
    NotAFileField(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    schema_json: Option<String>,
}

fn load_store(config_json: &str) -> Result<FieldStore, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    match config.schema_json.as_deref() {
        Some(schema_json) if !schema_json.trim().is_empty() => {
            Ok(form_spec::deserialize(schema_json)?)
        }
        _ => Ok(FieldStore::new()),
    }
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

/// The configured schema in its persisted form.
pub fn describe(config_json: &str) -> String {
    respond(load_store(config_json).and_then(|store| {
        serde_json::to_value(store.fields()).map_err(ComponentError::JsonEncode)
    }))
}

pub fn persisted_schema() -> String {
    respond(Ok(form_persisted_schema()))
}

/// Ids of the fields a renderer should draw, and of those it should skip.
pub fn visible_fields(config_json: &str) -> String {
    respond(load_store(config_json).map(|store| {
        let visibility = resolve_visibility(store.fields());
        let (visible, hidden): (Vec<&FieldId>, Vec<&FieldId>) = store
            .fields()
            .iter()
            .map(|field| &field.id)
            .partition(|id| visibility.get(*id).copied().unwrap_or(true));
        json!({ "visible": visible, "hidden": hidden })
    }))
}

pub fn render_preview(config_json: &str) -> String {
    respond(load_store(config_json).map(|store| render_json_ui(&build_preview(store.fields()))))
}

pub fn render_text(config_json: &str) -> String {
    respond_string(
        load_store(config_json).map(|store| form_render_text(&build_preview(store.fields()))),
    )
}

/// Checks a submission (`{ "<field id>": value }`) against the schema.
pub fn validate_submission(config_json: &str, submission_json: &str) -> String {
    respond(load_store(config_json).and_then(|store| {
        let submission: Submission =
            serde_json::from_str(submission_json).map_err(ComponentError::SubmissionParse)?;
        serde_json::to_value(validate(store.fields(), &submission))
            .map_err(ComponentError::JsonEncode)
    }))
}

/// Size check a renderer runs when a file is picked.
pub fn check_file(config_json: &str, field_id: &str, size_bytes: u64) -> String {
    respond(load_store(config_json).and_then(|store| {
        let field = store
            .get(&FieldId::from(field_id))
            .ok_or_else(|| ComponentError::FieldUnavailable(field_id.to_string()))?;
        if field.kind != FieldType::File {
            return Err(ComponentError::NotAFileField(field_id.to_string()));
        }
        let violations: Vec<_> = check_file_size(&field.validation, size_bytes)
            .into_iter()
            .collect();
        Ok(json!({
            "valid": violations.is_empty(),
            "violations": violations,
        }))
    }))
}
