use tracing::{debug, warn};

use crate::codec::{self, CodecError};
use crate::host::{Host, NoticeKind};
use crate::spec::field::{Field, FieldId, FieldType};
use crate::storage::SchemaStorage;
use crate::store::{FieldStore, StoreError};
use crate::validate::{Submission, ValidationResult, Violation, check_file_size, validate};
use crate::visibility::visible_fields;

pub const REMOVE_PROMPT: &str = "Do you want to remove this field?";

/// Outcome of [`FormBuilder::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NotFound,
}

/// One editing session: the store plus the capabilities it talks to.
pub struct FormBuilder<S, H> {
    store: FieldStore,
    storage: S,
    host: H,
}

impl<S: SchemaStorage, H: Host> FormBuilder<S, H> {
    pub fn new(storage: S, host: H) -> Self {
        Self::with_store(FieldStore::new(), storage, host)
    }

    /// Resumes a session on an existing store.
    pub fn with_store(store: FieldStore, storage: S, host: H) -> Self {
        FormBuilder {
            store,
            storage,
            host,
        }
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn add_field(
        &mut self,
        kind: FieldType,
        option_count: Option<usize>,
    ) -> Result<Field, StoreError> {
        self.store.add(kind, option_count)
    }

    pub fn update_field(&mut self, id: &FieldId, field: Field) -> Result<(), StoreError> {
        self.store.update(id, field)
    }

    /// Removes `id` once the host confirms. Returns whether a field was removed.
    pub fn remove_field(&mut self, id: &FieldId) -> Result<bool, StoreError> {
        if !self.store.contains(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !self.host.confirm(REMOVE_PROMPT) {
            debug!(id = %id, "field removal declined");
            return Ok(false);
        }
        self.store.remove(id)?;
        self.host
            .notify("Field removed successfully!", NoticeKind::Success);
        Ok(true)
    }

    pub fn save(&mut self) -> Result<(), CodecError> {
        codec::save(&self.store, &mut self.storage)?;
        self.host
            .notify("Form configuration saved successfully!", NoticeKind::Success);
        Ok(())
    }

    /// Replaces the store with the saved schema. On any failure the current
    /// store is kept.
    pub fn load(&mut self) -> Result<LoadOutcome, CodecError> {
        match codec::load(&self.storage) {
            Ok(Some(store)) => {
                self.store = store;
                self.host
                    .notify("Form configuration loaded successfully!", NoticeKind::Success);
                Ok(LoadOutcome::Loaded)
            }
            Ok(None) => {
                self.host
                    .notify("No saved form configuration found.", NoticeKind::Error);
                Ok(LoadOutcome::NotFound)
            }
            Err(error) => {
                warn!(%error, "saved form configuration rejected");
                self.host.notify(
                    &format!("Failed to load form configuration: {}", error),
                    NoticeKind::Error,
                );
                Err(error)
            }
        }
    }

    pub fn visible_fields(&self) -> Vec<&Field> {
        visible_fields(self.store.fields())
    }

    pub fn submit(&mut self, submission: &Submission) -> ValidationResult {
        let result = validate(self.store.fields(), submission);
        if result.valid {
            self.host
                .notify("Form submitted successfully!", NoticeKind::Success);
        }
        result
    }

    /// File-size check run when the user picks a file for `id`.
    pub fn check_file(&self, id: &FieldId, size_bytes: u64) -> Result<Option<Violation>, StoreError> {
        let field = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if field.kind != FieldType::File {
            return Err(StoreError::InvalidInput(format!(
                "field '{}' is a {} field, not a file field",
                id, field.kind
            )));
        }
        Ok(check_file_size(&field.validation, size_bytes))
    }
}
