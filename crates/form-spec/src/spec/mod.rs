pub mod condition;
pub mod field;
pub mod validation;

pub use condition::VisibilityCondition;
pub use field::{Field, FieldId, FieldOption, FieldType};
pub use validation::{
    DEFAULT_FILE_SIZE_MB, FileCategory, PHONE_PATTERN, ValidationSpec, ValidationType,
};
