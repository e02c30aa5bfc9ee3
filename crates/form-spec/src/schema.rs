use schemars::schema_for;
use serde_json::Value;

use crate::spec::field::Field;

/// JSON Schema of the persisted format: an array of fields.
pub fn generate() -> Value {
    schema_for!(Vec<Field>).to_value()
}
