#![allow(missing_docs)]

pub mod codec;
pub mod host;
pub mod render;
pub mod schema;
pub mod session;
pub mod spec;
pub mod storage;
pub mod store;
pub mod validate;
pub mod visibility;

pub use codec::{CodecError, SCHEMA_STORAGE_KEY, deserialize, load, save, serialize};
pub use host::{Host, NoticeKind};
pub use render::{PreviewField, PreviewPayload, build_preview, render_json_ui, render_text};
pub use schema::generate as persisted_schema;
pub use session::{FormBuilder, LoadOutcome};
pub use spec::{
    Field, FieldId, FieldOption, FieldType, FileCategory, ValidationSpec, ValidationType,
    VisibilityCondition,
};
pub use storage::{MemoryStorage, SchemaStorage, StorageError};
pub use store::{FieldStore, StoreError};
pub use validate::{
    FileUpload, Submission, SubmittedValue, ValidationResult, Violation, bytes_to_mb, check_file_size,
    evaluate, matches_pattern, validate,
};
pub use visibility::{VisibilityMap, resolve_visibility, should_show, visible_fields};
