use std::collections::BTreeMap;

use crate::spec::field::{Field, FieldId};

pub type VisibilityMap = BTreeMap<FieldId, bool>;

/// Whether `field` should be rendered given the other fields' current values.
///
/// Without a dependency the field is always shown. A dependency that names no
/// field in `all_fields` compares as an empty value. The check looks at the
/// dependency's value only, never at whether the dependency is itself visible.
pub fn should_show(field: &Field, all_fields: &[Field]) -> bool {
    let Some(dependency) = &field.condition.dependent_field else {
        return true;
    };

    let current = all_fields
        .iter()
        .find(|candidate| &candidate.id == dependency)
        .map(Field::current_value)
        .unwrap_or("");

    current == field.condition.dependent_value
}

pub fn resolve_visibility(fields: &[Field]) -> VisibilityMap {
    fields
        .iter()
        .map(|field| (field.id.clone(), should_show(field, fields)))
        .collect()
}

pub fn visible_fields(fields: &[Field]) -> Vec<&Field> {
    fields
        .iter()
        .filter(|field| should_show(field, fields))
        .collect()
}
