use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{info, warn};

use crate::spec::field::{Field, FieldId};
use crate::storage::{SchemaStorage, StorageError};
use crate::store::FieldStore;

/// Storage key the assembled schema is persisted under.
pub const SCHEMA_STORAGE_KEY: &str = "formConfig";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to parse form schema: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("form schema repeats field id '{0}'")]
    DuplicateId(FieldId),
    #[error("failed to encode form schema: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CodecError {
    /// Whether the persisted text itself was rejected.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, CodecError::Parse(_) | CodecError::DuplicateId(_))
    }
}

/// Encodes the store as a JSON array of fields in store order.
pub fn serialize(store: &FieldStore) -> Result<String, CodecError> {
    serde_json::to_string(store.fields()).map_err(CodecError::Encode)
}

/// Decodes a JSON array of fields into a fresh store.
///
/// Conditions naming absent fields or forming cycles are accepted: evaluation
/// tolerates both.
pub fn deserialize(text: &str) -> Result<FieldStore, CodecError> {
    let fields: Vec<Field> = serde_json::from_str(text).map_err(CodecError::Parse)?;

    let mut seen = BTreeSet::new();
    for field in &fields {
        if !seen.insert(&field.id) {
            return Err(CodecError::DuplicateId(field.id.clone()));
        }
    }

    for field in &fields {
        if let Some(dependency) = &field.condition.dependent_field
            && !seen.contains(dependency)
        {
            warn!(id = %field.id, dependency = %dependency, "visibility condition names an absent field");
        }
    }

    Ok(FieldStore::from_unique(fields))
}

/// Serializes the store into `storage` under [`SCHEMA_STORAGE_KEY`].
pub fn save<S: SchemaStorage + ?Sized>(store: &FieldStore, storage: &mut S) -> Result<(), CodecError> {
    let text = serialize(store)?;
    storage.set(SCHEMA_STORAGE_KEY, &text)?;
    info!(fields = store.len(), "form schema saved");
    Ok(())
}

/// Restores the store saved in `storage`, or `None` when nothing was saved.
pub fn load<S: SchemaStorage + ?Sized>(storage: &S) -> Result<Option<FieldStore>, CodecError> {
    let Some(text) = storage.get(SCHEMA_STORAGE_KEY)? else {
        return Ok(None);
    };
    let store = deserialize(&text)?;
    info!(fields = store.len(), "form schema loaded");
    Ok(Some(store))
}
