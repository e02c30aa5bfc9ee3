mod file_storage;
mod terminal;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use component_form::{render_preview, render_text, validate_submission};
use file_storage::FileStorage;
use form_spec::{
    Field, FieldId, FieldStore, FieldType, FileCategory, FormBuilder, ValidationResult,
    ValidationType, persisted_schema,
};
use serde_json::{Value, json};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use terminal::TerminalHost;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;
type Session = FormBuilder<FileStorage, TerminalHost>;

const STORE_DIR_ENV: &str = "GREENTIC_FORM_STORE_DIR";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form builder CLI",
    long_about = "Assembles a form from reusable field types, previews it and validates submissions against it"
)]
struct Cli {
    /// Directory holding the saved form schema (defaults to GREENTIC_FORM_STORE_DIR or the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PreviewFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Append a blank field and print its id.
    Add {
        /// text, textarea, dropdown, checkbox, radio or file.
        #[arg(long = "type", value_name = "TYPE")]
        kind: FieldType,
        /// Number of options for dropdown, checkbox and radio fields.
        #[arg(long, value_name = "COUNT")]
        options: Option<usize>,
    },
    /// List the fields in order.
    List {
        /// Print the persisted JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Change attributes of an existing field.
    Edit(EditArgs),
    /// Remove a field after confirmation.
    Remove {
        #[arg(long, value_name = "ID")]
        id: FieldId,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Show the fields that are currently visible.
    Preview {
        #[arg(long, value_enum, default_value_t = PreviewFormat::Text)]
        format: PreviewFormat,
    },
    /// Validate a submission (JSON object keyed by field id).
    Validate {
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print the JSON Schema of the saved form format.
    Schema,
}

#[derive(Args)]
struct EditArgs {
    #[arg(long, value_name = "ID")]
    id: FieldId,
    #[arg(long)]
    label: Option<String>,
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    required: Option<bool>,
    #[arg(long, value_name = "N")]
    min_length: Option<usize>,
    #[arg(long, value_name = "N")]
    max_length: Option<usize>,
    /// none, number, email or phone.
    #[arg(long, value_name = "TYPE")]
    validation_type: Option<ValidationType>,
    /// pdf, jpg, jpeg, png or any other token.
    #[arg(long, value_name = "CATEGORY")]
    file_type: Option<String>,
    /// Maximum upload size in megabytes.
    #[arg(long, value_name = "MB")]
    file_size: Option<f64>,
    /// Show the field only when this field's value matches --depends-value.
    #[arg(long, value_name = "ID", requires = "depends_value")]
    depends_on: Option<FieldId>,
    #[arg(long, value_name = "VALUE", requires = "depends_on")]
    depends_value: Option<String>,
    #[arg(long, conflicts_with = "depends_on")]
    clear_condition: bool,
    /// Append an empty option.
    #[arg(long)]
    add_option: bool,
    /// Remove the option at this index.
    #[arg(long, value_name = "INDEX")]
    remove_option: Option<usize>,
    /// Option targeted by --option-label / --option-sub-label.
    #[arg(long, value_name = "INDEX")]
    option: Option<usize>,
    #[arg(long, value_name = "LABEL", requires = "option")]
    option_label: Option<String>,
    #[arg(long, value_name = "LABEL", requires = "option")]
    option_sub_label: Option<String>,
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    let store_dir = resolve_store_dir(cli.store)?;
    match cli.command {
        Command::Add { kind, options } => run_add(&store_dir, kind, options),
        Command::List { json } => run_list(&store_dir, json),
        Command::Edit(args) => run_edit(&store_dir, args),
        Command::Remove { id, yes } => run_remove(&store_dir, id, yes),
        Command::Preview { format } => run_preview(&store_dir, format),
        Command::Validate { answers } => run_validate(&store_dir, answers),
        Command::Schema => run_schema(),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_store_dir(store: Option<PathBuf>) -> CliResult<PathBuf> {
    match store {
        Some(path) => Ok(path),
        None => match env::var_os(STORE_DIR_ENV) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(env::current_dir()?),
        },
    }
}

fn open_session(store_dir: &Path, assume_yes: bool) -> CliResult<Session> {
    let storage = FileStorage::new(store_dir);
    let store = form_spec::load(&storage)?.unwrap_or_default();
    debug!(root = %storage.root().display(), fields = store.len(), "session opened");
    Ok(FormBuilder::with_store(
        store,
        storage,
        TerminalHost::new(assume_yes),
    ))
}

fn component_config(store_dir: &Path) -> CliResult<String> {
    let storage = FileStorage::new(store_dir);
    let store = form_spec::load(&storage)?.unwrap_or_default();
    let schema_json = form_spec::serialize(&store)?;
    Ok(json!({ "schema_json": schema_json }).to_string())
}

fn run_add(store_dir: &Path, kind: FieldType, options: Option<usize>) -> CliResult<()> {
    let mut session = open_session(store_dir, true)?;
    let field = session.add_field(kind, options)?;
    session.save()?;
    println!("{}", field.id);
    Ok(())
}

fn run_list(store_dir: &Path, as_json: bool) -> CliResult<()> {
    let session = open_session(store_dir, true)?;
    let store = session.store();
    if as_json {
        let value = serde_json::to_value(store.fields())?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    if store.is_empty() {
        println!("No fields defined.");
        return Ok(());
    }
    for field in store.fields() {
        println!("{}", describe_field(field, store));
    }
    Ok(())
}

fn describe_field(field: &Field, store: &FieldStore) -> String {
    let mut entry = format!("{} [{}] {:?}", field.id, field.kind, field.label);
    if field.validation.required {
        entry.push_str(" required");
    }
    if field.kind.is_choice() {
        entry.push_str(&format!(" options={}", field.options.len()));
    }
    if let Some(dependency) = &field.condition.dependent_field {
        let marker = if store.contains(dependency) {
            ""
        } else {
            " (missing)"
        };
        entry.push_str(&format!(
            " when {}{} = {:?}",
            dependency, marker, field.condition.dependent_value
        ));
    }
    entry
}

fn run_edit(store_dir: &Path, args: EditArgs) -> CliResult<()> {
    let mut session = open_session(store_dir, true)?;
    let mut field = session
        .store()
        .get(&args.id)
        .cloned()
        .ok_or_else(|| format!("field '{}' not found", args.id))?;

    apply_edits(&mut field, &args)?;
    session.update_field(&args.id, field)?;
    session.save()?;
    Ok(())
}

fn apply_edits(field: &mut Field, args: &EditArgs) -> CliResult<()> {
    if let Some(label) = &args.label {
        field.set_label(label.clone());
    }
    if let Some(required) = args.required {
        field.set_required(required);
    }
    if args.min_length.is_some() || args.max_length.is_some() {
        let min_length = args.min_length.or(field.validation.min_length);
        let max_length = args.max_length.or(field.validation.max_length);
        field.set_length_bounds(min_length, max_length)?;
    }
    if let Some(kind) = args.validation_type {
        field.set_validation_type(kind);
    }
    if let Some(file_type) = &args.file_type {
        let category = (!file_type.trim().is_empty()).then(|| FileCategory::from(file_type.as_str()));
        field.set_file_type(category)?;
    }
    if let Some(file_size) = args.file_size {
        field.set_file_size(Some(file_size))?;
    }
    if args.clear_condition {
        field.clear_condition();
    }
    if let (Some(dependency), Some(value)) = (&args.depends_on, &args.depends_value) {
        field.set_condition(dependency.clone(), value.clone());
    }
    if args.add_option {
        field.add_option()?;
    }
    if let Some(index) = args.remove_option {
        field.remove_option(index)?;
    }
    if let Some(index) = args.option {
        if let Some(label) = &args.option_label {
            field.set_option_label(index, label.clone())?;
        }
        if let Some(sub_label) = &args.option_sub_label {
            field.set_option_sub_label(index, sub_label.clone())?;
        }
    }
    Ok(())
}

fn run_remove(store_dir: &Path, id: FieldId, yes: bool) -> CliResult<()> {
    let mut session = open_session(store_dir, yes)?;
    if session.remove_field(&id)? {
        session.save()?;
    } else {
        println!("Field {} kept.", id);
    }
    Ok(())
}

fn run_preview(store_dir: &Path, format: PreviewFormat) -> CliResult<()> {
    let config = component_config(store_dir)?;
    match format {
        PreviewFormat::Text => {
            let output = render_text(&config);
            fail_on_component_error(&output)?;
            println!("{}", output);
        }
        PreviewFormat::Json => {
            let value = parse_component_result(&render_preview(&config))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn run_validate(store_dir: &Path, answers_path: PathBuf) -> CliResult<()> {
    let config = component_config(store_dir)?;
    let answers_json = fs::read_to_string(answers_path)?;
    let response = parse_component_result(&validate_submission(&config, &answers_json))?;
    let result: ValidationResult = serde_json::from_value(response)?;

    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for (id, violations) in &result.errors {
            for violation in violations {
                println!("  {} - {}", id, violation.message);
            }
        }
    }
    if !result.unknown_fields.is_empty() {
        let unknown = result
            .unknown_fields
            .iter()
            .map(FieldId::as_str)
            .collect::<Vec<_>>();
        println!("Unknown answer fields: {}", unknown.join(", "));
    }
}

fn run_schema() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&persisted_schema())?);
    Ok(())
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    Ok(value)
}

fn fail_on_component_error(output: &str) -> CliResult<()> {
    if output.starts_with('{') {
        parse_component_result(output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_args_apply_to_field() {
        let mut store = FieldStore::new();
        let mut field = store.add(FieldType::Checkbox, Some(2)).expect("checkbox");
        let cli = Cli::try_parse_from([
            "greentic-form",
            "edit",
            "--id",
            field.id.as_str(),
            "--label",
            "Colours",
            "--required",
            "true",
            "--option",
            "1",
            "--option-label",
            "Blue",
            "--add-option",
        ])
        .expect("parse");
        let super::Command::Edit(args) = cli.command else {
            panic!("expected edit command");
        };

        apply_edits(&mut field, &args).expect("apply");
        assert_eq!(field.label, "Colours");
        assert!(field.validation.required);
        assert_eq!(field.options.len(), 3);
        assert_eq!(field.options[1].label, "Blue");
    }
}
