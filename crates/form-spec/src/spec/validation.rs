use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::store::StoreError;

/// Upload limit applied when a file field carries no explicit size.
pub const DEFAULT_FILE_SIZE_MB: f64 = 5.0;

/// Ten digits, leading digit 6-9.
pub const PHONE_PATTERN: &str = r"^(9|8|6|7)\d{9}$";

/// Input format selected for a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidationType {
    #[default]
    #[serde(alias = "")]
    None,
    Number,
    Email,
    Phone,
}

impl ValidationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationType::None => "none",
            ValidationType::Number => "number",
            ValidationType::Email => "email",
            ValidationType::Phone => "phone",
        }
    }

    /// HTML input type a renderer should use for this format.
    pub fn input_type(&self) -> &'static str {
        match self {
            ValidationType::Email => "email",
            ValidationType::Phone => "tel",
            ValidationType::Number | ValidationType::None => "text",
        }
    }
}

impl FromStr for ValidationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" => Ok(ValidationType::None),
            "number" | "numbers" => Ok(ValidationType::Number),
            "email" => Ok(ValidationType::Email),
            "phone" | "tel" => Ok(ValidationType::Phone),
            other => Err(format!("unknown validation type '{}'", other)),
        }
    }
}

/// File category token accepted by an upload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileCategory {
    Pdf,
    Jpg,
    Jpeg,
    Png,
    Other(String),
}

impl FileCategory {
    pub fn as_str(&self) -> &str {
        match self {
            FileCategory::Pdf => "pdf",
            FileCategory::Jpg => "jpg",
            FileCategory::Jpeg => "jpeg",
            FileCategory::Png => "png",
            FileCategory::Other(token) => token,
        }
    }

    /// MIME filter for client-side pickers. Advisory only: uploads are never
    /// checked against it.
    pub fn accept(&self) -> Option<String> {
        match self {
            FileCategory::Pdf => Some("application/pdf".into()),
            FileCategory::Jpg | FileCategory::Jpeg | FileCategory::Png => {
                Some(format!("image/{}", self.as_str()))
            }
            FileCategory::Other(_) => None,
        }
    }

    /// Whether this category survives a save and load unchanged.
    fn check(&self) -> Result<(), StoreError> {
        if self.as_str().is_empty() {
            return Err(StoreError::InvalidInput("file type cannot be blank".into()));
        }
        if FileCategory::from(self.as_str()) != *self {
            return Err(StoreError::InvalidInput(format!(
                "file type '{}' must be a lowercase token",
                self.as_str()
            )));
        }
        Ok(())
    }
}

impl From<String> for FileCategory {
    fn from(token: String) -> Self {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "pdf" => FileCategory::Pdf,
            "jpg" => FileCategory::Jpg,
            "jpeg" => FileCategory::Jpeg,
            "png" => FileCategory::Png,
            _ => FileCategory::Other(token),
        }
    }
}

impl From<&str> for FileCategory {
    fn from(token: &str) -> Self {
        FileCategory::from(token.to_string())
    }
}

impl From<FileCategory> for String {
    fn from(category: FileCategory) -> Self {
        category.as_str().to_string()
    }
}

/// Declarative rules attached to a field.
///
/// `pattern`, `inputType` and `accept` are never stored: they are derived from
/// the selected [`ValidationType`] and [`FileCategory`] each time they are read,
/// and written alongside the authored values when the schema is persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ValidationRecord", into = "ValidationRecord")]
pub struct ValidationSpec {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub kind: ValidationType,
    pub file_type: Option<FileCategory>,
    pub file_size: Option<f64>,
}

impl ValidationSpec {
    pub fn input_type(&self) -> &'static str {
        self.kind.input_type()
    }

    /// Pattern a renderer attaches to the input.
    ///
    /// Phone selects the fixed phone pattern; email and number carry none.
    /// Without a format, a length bound yields a digit-count template.
    pub fn pattern(&self) -> Option<String> {
        match self.kind {
            ValidationType::Phone => Some(PHONE_PATTERN.to_string()),
            ValidationType::Email | ValidationType::Number => None,
            ValidationType::None => match (self.min_length, self.max_length) {
                (None, None) => None,
                (Some(min), Some(max)) => Some(format!(r"\d{{{},{}}}", min, max)),
                (Some(min), None) => Some(format!(r"\d{{{},}}", min)),
                (None, Some(max)) => Some(format!(r"\d{{0,{}}}", max)),
            },
        }
    }

    pub fn accept(&self) -> Option<String> {
        self.file_type.as_ref().and_then(FileCategory::accept)
    }

    /// Effective upload limit in megabytes.
    pub fn file_size_limit(&self) -> f64 {
        self.file_size.unwrap_or(DEFAULT_FILE_SIZE_MB)
    }

    pub fn set_file_size(&mut self, megabytes: Option<f64>) -> Result<(), StoreError> {
        if let Some(size) = megabytes {
            ensure_positive_size(size)?;
        }
        self.file_size = megabytes;
        Ok(())
    }

    pub fn set_file_type(&mut self, category: Option<FileCategory>) -> Result<(), StoreError> {
        if let Some(category) = &category {
            category.check()?;
        }
        self.file_type = category;
        Ok(())
    }

    /// Rejects values that loading would drop or rewrite.
    pub fn check(&self) -> Result<(), StoreError> {
        if let Some(size) = self.file_size {
            ensure_positive_size(size)?;
        }
        if let Some(category) = &self.file_type {
            category.check()?;
        }
        Ok(())
    }
}

fn ensure_positive_size(size: f64) -> Result<(), StoreError> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(StoreError::InvalidInput(format!(
            "file size must be a positive number of megabytes, got {}",
            size
        )))
    }
}

/// Persisted shape of [`ValidationSpec`], including the derived attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidationRecord {
    #[serde(default, skip_serializing_if = "is_false")]
    required: bool,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<usize>")]
    min_length: Option<usize>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<usize>")]
    max_length: Option<usize>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<ValidationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    file_type: Option<FileCategory>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<f64>")]
    file_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accept: Option<String>,
}

impl From<ValidationRecord> for ValidationSpec {
    fn from(record: ValidationRecord) -> Self {
        ValidationSpec {
            required: record.required,
            min_length: record.min_length,
            max_length: record.max_length,
            kind: record.kind.unwrap_or_default(),
            file_type: record
                .file_type
                .filter(|category| !category.as_str().trim().is_empty()),
            file_size: record
                .file_size
                .filter(|size| size.is_finite() && *size > 0.0),
        }
    }
}

impl From<ValidationSpec> for ValidationRecord {
    fn from(spec: ValidationSpec) -> Self {
        let kind = (spec.kind != ValidationType::None).then_some(spec.kind);
        ValidationRecord {
            required: spec.required,
            min_length: spec.min_length,
            max_length: spec.max_length,
            kind,
            input_type: kind.map(|kind| kind.input_type().to_string()),
            pattern: spec.pattern(),
            accept: spec.accept(),
            file_type: spec.file_type,
            file_size: spec.file_size,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
}

/// Accepts numbers written either as JSON numbers or as numeric strings.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Value(value)) => Ok(Some(value)),
        Some(Lenient::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Lenient::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}
