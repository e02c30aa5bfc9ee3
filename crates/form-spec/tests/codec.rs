use serde_json::Value;

use form_spec::{
    CodecError, FieldStore, FieldType, FileCategory, MemoryStorage, SCHEMA_STORAGE_KEY,
    SchemaStorage, StoreError, ValidationType, deserialize, load, save, serialize,
};

fn populated_store() -> FieldStore {
    let mut store = FieldStore::new();

    let mut name = store.add(FieldType::Text, None).expect("text");
    name.set_label("yes");
    name.set_required(true);
    name.set_length_bounds(Some(2), Some(10)).expect("bounds");
    store.update(&name.id, name.clone()).expect("name");

    let mut notes = store.add(FieldType::Textarea, None).expect("textarea");
    notes.set_validation_type(ValidationType::Phone);
    notes.set_condition(name.id.clone(), "yes");
    store.update(&notes.id.clone(), notes).expect("notes");

    store.add(FieldType::Dropdown, None).expect("empty dropdown");

    let mut choices = store.add(FieldType::Checkbox, Some(3)).expect("checkbox");
    choices.set_option_label(0, "Red").expect("label");
    choices.set_option_sub_label(2, "warm").expect("sub label");
    store.update(&choices.id.clone(), choices).expect("choices");

    store.add(FieldType::Radio, Some(1)).expect("radio");

    let mut upload = store.add(FieldType::File, None).expect("file");
    upload.set_file_type(Some(FileCategory::Jpeg)).expect("type");
    upload.set_file_size(Some(1.5)).expect("size");
    store.update(&upload.id.clone(), upload).expect("upload");

    store.add(FieldType::File, None).expect("bare file");
    store
}

#[test]
fn round_trip_is_lossless() {
    let store = populated_store();
    let text = serialize(&store).expect("serialize");
    let restored = deserialize(&text).expect("deserialize");
    assert_eq!(restored, store);
    assert_eq!(serialize(&restored).expect("serialize again"), text);
}

#[test]
fn update_rejects_file_rules_that_would_not_load_back() {
    let mut store = FieldStore::new();
    let upload = store.add(FieldType::File, None).expect("file");

    for size in [0.0, -2.0, f64::NAN] {
        let mut edited = upload.clone();
        edited.validation.file_size = Some(size);
        assert!(matches!(
            store.update(&upload.id, edited),
            Err(StoreError::InvalidInput(_))
        ));
    }
    for category in [FileCategory::from(""), FileCategory::Other("PDF".into())] {
        let mut edited = upload.clone();
        edited.validation.file_type = Some(category);
        assert!(matches!(
            store.update(&upload.id, edited),
            Err(StoreError::InvalidInput(_))
        ));
    }

    assert_eq!(store.get(&upload.id), Some(&upload));
    let restored = deserialize(&serialize(&store).expect("serialize")).expect("deserialize");
    assert_eq!(restored, store);
}

#[test]
fn custom_file_types_round_trip() {
    let mut store = FieldStore::new();
    let mut upload = store.add(FieldType::File, None).expect("file");
    upload
        .set_file_type(Some(FileCategory::from(" DOCX")))
        .expect("type");
    store.update(&upload.id.clone(), upload).expect("upload");

    let restored = deserialize(&serialize(&store).expect("serialize")).expect("deserialize");
    assert_eq!(restored, store);
}

#[test]
fn empty_store_round_trips() {
    let store = FieldStore::new();
    let text = serialize(&store).expect("serialize");
    assert_eq!(text, "[]");
    assert_eq!(deserialize(&text).expect("deserialize"), store);
}

#[test]
fn persisted_format_is_a_field_array_with_derived_attributes() {
    let store = populated_store();
    let value: Value = serde_json::from_str(&serialize(&store).expect("serialize")).expect("json");
    let fields = value.as_array().expect("array");
    assert_eq!(fields.len(), store.len());

    assert_eq!(fields[0]["type"], "text");
    assert_eq!(fields[0]["validation"]["pattern"], r"\d{2,10}");
    assert_eq!(fields[1]["validation"]["inputType"], "tel");
    assert_eq!(fields[1]["condition"]["dependentValue"], "yes");
    assert_eq!(fields[3]["options"][2]["subLabel"], "warm");
    assert_eq!(fields[5]["validation"]["accept"], "image/jpeg");
    assert_eq!(fields[5]["validation"]["fileSize"], 1.5);
}

#[test]
fn malformed_input_is_a_parse_error() {
    for text in ["", "{", r#"{"id": "a"}"#, r#"[{"id": "a", "type": "slider"}]"#] {
        let error = deserialize(text).expect_err("malformed");
        assert!(matches!(error, CodecError::Parse(_)), "{text}: {error}");
    }
}

#[test]
fn storage_round_trip_uses_schema_key() {
    let store = populated_store();
    let mut storage = MemoryStorage::new();
    save(&store, &mut storage).expect("save");
    assert!(storage.get(SCHEMA_STORAGE_KEY).expect("get").is_some());

    let restored = load(&storage).expect("load").expect("saved schema");
    assert_eq!(restored, store);
}

#[test]
fn failed_load_leaves_storage_contents_alone() {
    let mut storage = MemoryStorage::new();
    storage.set(SCHEMA_STORAGE_KEY, "not json").expect("set");
    assert!(load(&storage).is_err());
    assert_eq!(
        storage.get(SCHEMA_STORAGE_KEY).expect("get").as_deref(),
        Some("not json")
    );
}
