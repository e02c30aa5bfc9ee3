use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::spec::field::{Field, FieldId, FieldType};
use crate::spec::validation::{PHONE_PATTERN, ValidationSpec, ValidationType};
use crate::visibility::resolve_visibility;

/// HTML email-address grammar, as enforced by `email` inputs.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One broken rule. Violations are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub message: String,
}

impl Violation {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Violation {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Metadata of an uploaded file as reported by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Value submitted for one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedValue {
    #[default]
    Empty,
    Text(String),
    Choices(Vec<String>),
    File(FileUpload),
}

impl SubmittedValue {
    pub fn is_empty(&self) -> bool {
        match self {
            SubmittedValue::Empty => true,
            SubmittedValue::Text(text) => text.is_empty(),
            SubmittedValue::Choices(choices) => choices.is_empty(),
            SubmittedValue::File(_) => false,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            SubmittedValue::Empty => Some(""),
            SubmittedValue::Text(text) => Some(text),
            SubmittedValue::Choices(_) | SubmittedValue::File(_) => None,
        }
    }
}

impl From<&str> for SubmittedValue {
    fn from(value: &str) -> Self {
        SubmittedValue::Text(value.to_string())
    }
}

/// Submitted values keyed by field id.
pub type Submission = BTreeMap<FieldId, SubmittedValue>;

/// Outcome of checking a whole submission.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<FieldId, Vec<Violation>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<FieldId>,
}

/// Checks one submitted value against the field's rules.
///
/// Every rule runs; violations come back in rule order.
pub fn evaluate(field: &Field, value: &SubmittedValue) -> Vec<Violation> {
    let rules = &field.validation;
    let mut violations = Vec::new();

    if rules.required && value.is_empty() {
        violations.push(Violation::new("required", "This field is required."));
    }

    if let Some(min_length) = rules.min_length
        && let Some(text) = value.text()
        && utf16_len(text) < min_length
    {
        violations.push(Violation::new(
            "min_length",
            format!("Minimum length is {}.", min_length),
        ));
    }

    if let Some(text) = value.text()
        && !text.is_empty()
        && let Some(violation) = check_format(rules, text)
    {
        violations.push(violation);
    }

    if field.kind == FieldType::File
        && let SubmittedValue::File(upload) = value
        && let Some(violation) = check_file_size(rules, upload.size_bytes)
    {
        violations.push(violation);
    }

    violations
}

/// Checks a submission field by field, skipping hidden fields.
pub fn validate(fields: &[Field], submission: &Submission) -> ValidationResult {
    let visibility = resolve_visibility(fields);
    let empty = SubmittedValue::Empty;

    let mut errors = BTreeMap::new();
    for field in fields {
        if !visibility.get(&field.id).copied().unwrap_or(true) {
            continue;
        }
        let value = submission.get(&field.id).unwrap_or(&empty);
        let violations = evaluate(field, value);
        if !violations.is_empty() {
            errors.insert(field.id.clone(), violations);
        }
    }

    let unknown_fields: Vec<FieldId> = submission
        .keys()
        .filter(|id| !fields.iter().any(|field| &field.id == *id))
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty() && unknown_fields.is_empty(),
        errors,
        unknown_fields,
    }
}

/// Size check run when a file is selected: strictly greater than the limit
/// fails.
pub fn check_file_size(rules: &ValidationSpec, size_bytes: u64) -> Option<Violation> {
    let limit = rules.file_size_limit();
    if bytes_to_mb(size_bytes) > limit {
        Some(Violation::new(
            "file_size",
            format!("File size exceeds the {} MB limit.", limit),
        ))
    } else {
        None
    }
}

/// Length as a browser counts it, in UTF-16 code units.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

fn check_format(rules: &ValidationSpec, text: &str) -> Option<Violation> {
    match rules.kind {
        ValidationType::None | ValidationType::Number => None,
        ValidationType::Phone => (!PHONE_REGEX.is_match(text)).then(|| {
            Violation::new(
                "pattern_mismatch",
                "Please enter a valid 10-digit phone number.",
            )
        }),
        ValidationType::Email => (!EMAIL_REGEX.is_match(text))
            .then(|| Violation::new("email_format", "Please enter a valid email address.")),
    }
}

/// Whole-value match, the way an HTML `pattern` attribute applies. Used for
/// patterns built at runtime, such as the digit-count template.
pub fn matches_pattern(pattern: &str, text: &str) -> bool {
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(regex) => regex.is_match(text),
        Err(error) => {
            warn!(pattern, %error, "skipping check for invalid pattern");
            true
        }
    }
}
