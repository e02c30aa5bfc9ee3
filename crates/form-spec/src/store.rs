use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::spec::field::{Field, FieldId, FieldType};

/// Failures of store mutations. A failed call leaves the store unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("field '{0}' not found")]
    NotFound(FieldId),
}

/// Ordered collection of the fields assembled in one editing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStore {
    fields: Vec<Field>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps fields whose ids are already known to be unique.
    pub(crate) fn from_unique(fields: Vec<Field>) -> Self {
        FieldStore { fields }
    }

    /// Appends a blank field of `kind`.
    ///
    /// Checkbox and radio fields need a positive `option_count`; dropdowns take
    /// an optional one and otherwise start without options. Other kinds take
    /// no count at all.
    pub fn add(&mut self, kind: FieldType, option_count: Option<usize>) -> Result<Field, StoreError> {
        let option_count = match option_count {
            Some(0) if kind.is_choice() => {
                return Err(StoreError::InvalidInput(
                    "option count must be a positive integer".into(),
                ));
            }
            Some(count) if kind.is_choice() => count,
            Some(_) => {
                return Err(StoreError::InvalidInput(format!(
                    "{} fields do not take an option count",
                    kind
                )));
            }
            None if kind.requires_option_count() => {
                return Err(StoreError::InvalidInput(format!(
                    "{} fields require a positive option count",
                    kind
                )));
            }
            None => 0,
        };

        let field = Field::blank(kind, option_count);
        debug!(id = %field.id, kind = %kind, options = option_count, "field added");
        self.fields.push(field.clone());
        Ok(field)
    }

    /// Replaces the field with `id` in place, keeping its id and position.
    ///
    /// A visibility condition must name another field of this store and may not
    /// close a dependency cycle. File rules must be ones the schema can persist.
    pub fn update(&mut self, id: &FieldId, mut field: Field) -> Result<(), StoreError> {
        let position = self.position(id)?;
        field.id = id.clone();
        field.validation.check()?;

        if let Some(dependency) = &field.condition.dependent_field {
            if dependency == id {
                return Err(StoreError::InvalidInput(format!(
                    "field '{}' cannot depend on itself",
                    id
                )));
            }
            if !self.contains(dependency) {
                return Err(StoreError::InvalidInput(format!(
                    "condition references unknown field '{}'",
                    dependency
                )));
            }
            if self.closes_cycle(id, dependency) {
                return Err(StoreError::InvalidInput(format!(
                    "condition on '{}' would create a dependency cycle through '{}'",
                    id, dependency
                )));
            }
        }

        debug!(id = %id, position, "field updated");
        self.fields[position] = field;
        Ok(())
    }

    /// Deletes the field with `id`. Confirmation is the caller's concern.
    pub fn remove(&mut self, id: &FieldId) -> Result<Field, StoreError> {
        let position = self.position(id)?;
        let removed = self.fields.remove(position);
        let dependents = self.dependents_of(id).count();
        if dependents > 0 {
            warn!(id = %id, dependents, "removed field is still referenced by visibility conditions");
        }
        debug!(id = %id, position, "field removed");
        Ok(removed)
    }

    /// Snapshot of the fields in order. Changes to it never reach the store.
    pub fn list(&self) -> Vec<Field> {
        self.fields.clone()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| &field.id == id)
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose condition names `id`.
    pub fn dependents_of<'a>(&'a self, id: &'a FieldId) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.condition.dependent_field.as_ref() == Some(id))
    }

    fn position(&self, id: &FieldId) -> Result<usize, StoreError> {
        self.fields
            .iter()
            .position(|field| &field.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Follows the dependency chain starting at `dependency` and reports
    /// whether it leads back to `id`.
    fn closes_cycle(&self, id: &FieldId, dependency: &FieldId) -> bool {
        let mut seen = BTreeSet::new();
        let mut cursor = Some(dependency);
        while let Some(current) = cursor {
            if current == id {
                return true;
            }
            if !seen.insert(current) {
                return false;
            }
            cursor = self
                .get(current)
                .and_then(|field| field.condition.dependent_field.as_ref());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_fields_validate_option_count() {
        let mut store = FieldStore::new();
        assert!(matches!(
            store.add(FieldType::Checkbox, None),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.add(FieldType::Radio, Some(0)),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.add(FieldType::Text, Some(2)),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(store.is_empty());

        let dropdown = store.add(FieldType::Dropdown, None).expect("dropdown");
        assert!(dropdown.options.is_empty());
        let dropdown = store.add(FieldType::Dropdown, Some(2)).expect("dropdown");
        assert_eq!(dropdown.options.len(), 2);
    }

    #[test]
    fn update_preserves_id_and_position() {
        let mut store = FieldStore::new();
        let first = store.add(FieldType::Text, None).expect("first");
        let second = store.add(FieldType::Textarea, None).expect("second");

        let mut replacement = second.clone();
        replacement.id = FieldId::from("ignored");
        replacement.set_label("Comments");
        store.update(&second.id, replacement).expect("update");

        let fields = store.list();
        assert_eq!(fields[0].id, first.id);
        assert_eq!(fields[1].id, second.id);
        assert_eq!(fields[1].label, "Comments");
    }

    #[test]
    fn update_and_remove_report_unknown_ids() {
        let mut store = FieldStore::new();
        let field = store.add(FieldType::Text, None).expect("field");
        let missing = FieldId::from("missing");
        assert_eq!(
            store.update(&missing, field.clone()),
            Err(StoreError::NotFound(missing.clone()))
        );
        assert_eq!(store.remove(&missing), Err(StoreError::NotFound(missing)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn conditions_reject_self_unknown_and_cycles() {
        let mut store = FieldStore::new();
        let a = store.add(FieldType::Text, None).expect("a");
        let b = store.add(FieldType::Text, None).expect("b");
        let c = store.add(FieldType::Text, None).expect("c");

        let mut self_ref = a.clone();
        self_ref.set_condition(a.id.clone(), "x");
        assert!(store.update(&a.id, self_ref).is_err());

        let mut dangling = a.clone();
        dangling.set_condition(FieldId::from("nope"), "x");
        assert!(store.update(&a.id, dangling).is_err());

        let mut b_on_a = b.clone();
        b_on_a.set_condition(a.id.clone(), "yes");
        store.update(&b.id, b_on_a).expect("b depends on a");
        let mut c_on_b = c.clone();
        c_on_b.set_condition(b.id.clone(), "yes");
        store.update(&c.id, c_on_b).expect("c depends on b");

        let mut a_on_c = a.clone();
        a_on_c.set_condition(c.id.clone(), "yes");
        assert!(matches!(
            store.update(&a.id, a_on_c),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(!store.get(&a.id).expect("a").condition.is_set());
    }

    #[test]
    fn list_is_a_detached_snapshot() {
        let mut store = FieldStore::new();
        store.add(FieldType::Checkbox, Some(2)).expect("checkbox");
        let mut snapshot = store.list();
        snapshot[0].options[0].label = "changed".into();
        snapshot.clear();
        assert_eq!(store.len(), 1);
        assert_eq!(store.fields()[0].options[0].label, "");
    }

    #[test]
    fn remove_leaves_dependents_dangling() {
        let mut store = FieldStore::new();
        let a = store.add(FieldType::Text, None).expect("a");
        let b = store.add(FieldType::Text, None).expect("b");
        let mut b_on_a = b.clone();
        b_on_a.set_condition(a.id.clone(), "yes");
        store.update(&b.id, b_on_a).expect("update");

        let removed = store.remove(&a.id).expect("remove");
        assert_eq!(removed.id, a.id);
        assert_eq!(store.dependents_of(&a.id).count(), 1);
    }
}
