//! Subcommand implementations
//!
//! Each command returns the process exit code: 0 on success, 1 when the
//! document is invalid. Anything else is an `Err`.

use anyhow::Context;
use formtree_blocks::{Form, LayoutSpec};
use formtree_crud::{CrudConfig, CrudError, CrudForm, FileStore};
use formtree_node::{DataNode, DataValue, ValidationContext, ValidationError};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Validation outcome printed by `check` and failed `save` runs
#[derive(Debug, Serialize)]
pub(crate) struct Report {
    pub(crate) valid: bool,
    pub(crate) error: Option<ValidationError>,
    pub(crate) messages: Vec<String>,
}

impl Report {
    pub(crate) fn new(error: Option<ValidationError>) -> Self {
        let messages = error
            .as_ref()
            .map(|error| {
                error
                    .flatten()
                    .into_iter()
                    .map(|cause| match &cause.field_name {
                        Some(name) => format!("{name}: {}", cause.message),
                        None => format!("{}: {}", cause.title, cause.message),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            valid: error.is_none(),
            error,
            messages,
        }
    }

    fn exit_code(&self) -> i32 {
        i32::from(!self.valid)
    }
}

fn load_form(layout: &Path) -> anyhow::Result<Form> {
    let spec = LayoutSpec::from_path(layout)
        .with_context(|| format!("loading layout {}", layout.display()))?;
    spec.build()
        .with_context(|| format!("building layout {}", layout.display()))
}

fn load_data(data: &Path) -> anyhow::Result<DataValue> {
    let text = std::fs::read_to_string(data)
        .with_context(|| format!("reading {}", data.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", data.display()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Distribute `data` into the layout and validate it
pub(crate) fn check(layout: &Path, data: &Path, scope: Option<&str>) -> anyhow::Result<i32> {
    let mut form = load_form(layout)?;
    form.set_value(load_data(data)?);

    let error = form
        .validate(&ValidationContext::default(), scope, false)
        .context("validating document")?;
    tracing::info!(valid = error.is_none(), "checked document");

    let report = Report::new(error);
    print_json(&report)?;
    Ok(report.exit_code())
}

/// Distribute `data` and print the re-collected value
pub(crate) fn roundtrip(layout: &Path, data: &Path) -> anyhow::Result<i32> {
    let mut form = load_form(layout)?;
    form.set_value(load_data(data)?);
    print_json(&form.value())?;
    Ok(0)
}

/// Options for [`save`]
#[derive(Debug)]
pub(crate) struct SaveOptions<'a> {
    pub(crate) layout: &'a Path,
    pub(crate) store: &'a Path,
    pub(crate) data: &'a Path,
    pub(crate) config: Option<&'a Path>,
    pub(crate) update: bool,
}

/// Run New (or Refresh + Edit) and Save against a file store
pub(crate) async fn save(options: SaveOptions<'_>) -> anyhow::Result<i32> {
    let config = match options.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            CrudConfig::from_toml_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => CrudConfig::default(),
    };
    let data = load_data(options.data)?;

    let crud = CrudForm::new(
        load_form(options.layout)?,
        Arc::new(FileStore::new(options.store)),
    )
    .with_config(config);

    if options.update {
        crud.refresh().await?;
        crud.edit()?;
    } else {
        crud.new_record()?;
    }
    crud.with_form_mut(|form| form.set_value(data))?;

    match crud.save().await {
        Ok(result) => {
            print_json(&result)?;
            Ok(0)
        }
        Err(CrudError::Invalid(error)) => {
            let report = Report::new(Some(error));
            print_json(&report)?;
            Ok(report.exit_code())
        }
        Err(err) => Err(err.into()),
    }
}
