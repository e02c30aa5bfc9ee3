use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::spec::field::FieldId;

/// Makes a field's rendering depend on another field's current value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityCondition {
    #[serde(
        default,
        deserialize_with = "optional_field_id",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<FieldId>")]
    pub dependent_field: Option<FieldId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dependent_value: String,
}

impl VisibilityCondition {
    pub fn is_set(&self) -> bool {
        self.dependent_field.is_some()
    }
}

/// An empty id (an unselected dependency) loads as no dependency.
fn optional_field_id<'de, D>(deserializer: D) -> Result<Option<FieldId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<FieldId>::deserialize(deserializer)?.filter(|id| !id.as_str().is_empty()))
}
