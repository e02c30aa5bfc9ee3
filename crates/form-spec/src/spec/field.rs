use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::spec::condition::VisibilityCondition;
use crate::spec::validation::{FileCategory, ValidationRecord, ValidationSpec, ValidationType};
use crate::store::StoreError;

/// Stable identifier of a field within a store.
///
/// Persisted schemas may carry numeric ids; they load as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Fresh random identifier, unique across rapid successive calls.
    pub fn generate() -> Self {
        FieldId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        FieldId(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        FieldId(value)
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err("field id cannot be empty".into())
        } else {
            Ok(FieldId(trimmed.to_string()))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldId {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawFieldId::deserialize(deserializer)? {
            RawFieldId::Text(text) => FieldId(text),
            RawFieldId::Number(number) => FieldId(number.to_string()),
        })
    }
}

/// Supported field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Dropdown,
    Checkbox,
    Radio,
    File,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Dropdown,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::File,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::File => "file",
        }
    }

    /// Kinds that carry a list of options.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Dropdown | FieldType::Checkbox | FieldType::Radio
        )
    }

    /// Kinds that cannot be created without an option count.
    pub fn requires_option_count(&self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Radio)
    }

    /// Kinds whose value is free text.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::Textarea)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "textarea" | "text-area" => Ok(FieldType::Textarea),
            "dropdown" | "select" => Ok(FieldType::Dropdown),
            "checkbox" => Ok(FieldType::Checkbox),
            "radio" => Ok(FieldType::Radio),
            "file" | "upload" => Ok(FieldType::File),
            other => Err(format!("unknown field type '{}'", other)),
        }
    }
}

/// One selectable choice of a dropdown, checkbox or radio field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub sub_label: String,
}

/// A single form element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    #[schemars(with = "ValidationRecord")]
    pub validation: ValidationSpec,
    #[serde(default)]
    pub condition: VisibilityCondition,
}

impl Field {
    /// Blank field with `option_count` independent empty options.
    pub(crate) fn blank(kind: FieldType, option_count: usize) -> Self {
        Field {
            id: FieldId::generate(),
            kind,
            label: String::new(),
            options: vec![FieldOption::default(); option_count],
            validation: ValidationSpec::default(),
            condition: VisibilityCondition::default(),
        }
    }

    /// Value other fields compare against in their visibility conditions.
    ///
    /// This is the label: a field has no separate runtime value in the schema.
    pub fn current_value(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn add_option(&mut self) -> Result<usize, StoreError> {
        self.ensure_choice()?;
        self.options.push(FieldOption::default());
        Ok(self.options.len() - 1)
    }

    pub fn remove_option(&mut self, index: usize) -> Result<FieldOption, StoreError> {
        self.ensure_choice()?;
        self.ensure_option_index(index)?;
        Ok(self.options.remove(index))
    }

    pub fn set_option_label(
        &mut self,
        index: usize,
        label: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_choice()?;
        self.ensure_option_index(index)?;
        self.options[index].label = label.into();
        Ok(())
    }

    pub fn set_option_sub_label(
        &mut self,
        index: usize,
        sub_label: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_choice()?;
        self.ensure_option_index(index)?;
        self.options[index].sub_label = sub_label.into();
        Ok(())
    }

    pub fn set_required(&mut self, required: bool) {
        self.validation.required = required;
    }

    pub fn set_length_bounds(
        &mut self,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Result<(), StoreError> {
        if let (Some(min), Some(max)) = (min_length, max_length)
            && min > max
        {
            return Err(StoreError::InvalidInput(format!(
                "min length {} cannot exceed max length {}",
                min, max
            )));
        }
        self.validation.min_length = min_length;
        self.validation.max_length = max_length;
        Ok(())
    }

    pub fn set_validation_type(&mut self, kind: ValidationType) {
        self.validation.kind = kind;
    }

    pub fn set_file_type(&mut self, category: Option<FileCategory>) -> Result<(), StoreError> {
        self.ensure_kind(FieldType::File, "file type")?;
        self.validation.set_file_type(category)
    }

    pub fn set_file_size(&mut self, megabytes: Option<f64>) -> Result<(), StoreError> {
        self.ensure_kind(FieldType::File, "file size")?;
        self.validation.set_file_size(megabytes)
    }

    pub fn set_condition(&mut self, dependent_field: FieldId, dependent_value: impl Into<String>) {
        self.condition = VisibilityCondition {
            dependent_field: Some(dependent_field),
            dependent_value: dependent_value.into(),
        };
    }

    pub fn clear_condition(&mut self) {
        self.condition = VisibilityCondition::default();
    }

    fn ensure_choice(&self) -> Result<(), StoreError> {
        if self.kind.is_choice() {
            Ok(())
        } else {
            Err(StoreError::InvalidInput(format!(
                "{} fields do not carry options",
                self.kind
            )))
        }
    }

    fn ensure_option_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.options.len() {
            Ok(())
        } else {
            Err(StoreError::InvalidInput(format!(
                "option index {} out of range (field has {} options)",
                index,
                self.options.len()
            )))
        }
    }

    fn ensure_kind(&self, kind: FieldType, attribute: &str) -> Result<(), StoreError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(StoreError::InvalidInput(format!(
                "{} only applies to {} fields, not {}",
                attribute, kind, self.kind
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_load_as_text() {
        let id: FieldId = serde_json::from_str("1712345678901").expect("numeric id");
        assert_eq!(id.as_str(), "1712345678901");
        let id: FieldId = serde_json::from_str(r#""abc""#).expect("text id");
        assert_eq!(id, FieldId::from("abc"));
    }

    #[test]
    fn option_edits_touch_a_single_option() {
        let mut field = Field::blank(FieldType::Radio, 3);
        field.set_option_label(1, "Yes").expect("label");
        field.set_option_sub_label(1, "recommended").expect("sub label");
        assert_eq!(field.options[0], FieldOption::default());
        assert_eq!(field.options[1].label, "Yes");
        assert_eq!(field.options[2], FieldOption::default());
    }

    #[test]
    fn option_edits_reject_bad_targets() {
        let mut text = Field::blank(FieldType::Text, 0);
        assert!(text.add_option().is_err());

        let mut checkbox = Field::blank(FieldType::Checkbox, 1);
        assert!(checkbox.set_option_label(4, "nope").is_err());
        assert!(checkbox.remove_option(1).is_err());
        assert_eq!(checkbox.add_option().expect("append"), 1);
        assert_eq!(checkbox.remove_option(0).expect("remove"), FieldOption::default());
        assert_eq!(checkbox.options.len(), 1);
    }

    #[test]
    fn file_attributes_only_apply_to_file_fields() {
        let mut text = Field::blank(FieldType::Text, 0);
        assert!(text.set_file_size(Some(1.0)).is_err());
        assert!(text.set_file_type(Some(FileCategory::Pdf)).is_err());

        let mut upload = Field::blank(FieldType::File, 0);
        upload.set_file_type(Some(FileCategory::Png)).expect("type");
        upload.set_file_size(Some(2.0)).expect("size");
        assert_eq!(upload.validation.accept().as_deref(), Some("image/png"));
    }

    #[test]
    fn length_bounds_must_be_ordered() {
        let mut field = Field::blank(FieldType::Text, 0);
        assert!(field.set_length_bounds(Some(5), Some(2)).is_err());
        field.set_length_bounds(Some(2), Some(5)).expect("bounds");
        assert_eq!(field.validation.min_length, Some(2));
    }
}
