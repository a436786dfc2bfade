//! Testing utilities for the formtree workspace
//!
//! Shared fixtures, in-memory collaborators and lookup helpers.

#![allow(missing_docs)]

use formtree_binding::walker;
use formtree_blocks::{Bit, Field, FieldKind, Form, LayoutSpec, ListBit, Rule, Wrapper};
use formtree_crud::{CrudHandler, SaveRequest};
use formtree_node::{strip_tag, DataMode, DataValue, Node, NodeId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub const PERSON_LAYOUT: &str = r#"
title: Person
schema: people
children:
  - type: field
    name: FirstName
    required: true
  - type: wrapper
    label: row
    children:
      - type: field
        name: LastName
      - type: field
        name: Age
        kind: integer
        min: 0
  - type: list
    name: Phones
    max_items: 3
    item:
      - type: field
        name: Number
        pattern: "^[0-9 ]+$"
"#;

/// Person form built in code: names, an address bit and a phone list
pub fn person_form() -> Form {
    Form::new()
        .with_title("Person")
        .with_schema("people")
        .with_child(Field::new("FirstName").required())
        .with_child(
            Wrapper::new()
                .with_label("row")
                .with_child(Field::new("LastName"))
                .with_child(
                    Field::new("Age")
                        .with_kind(FieldKind::Integer)
                        .with_rule(Rule::Min(0.0)),
                ),
        )
        .with_child(
            Bit::named("Address")
                .with_title("Address")
                .with_detail(Field::new("City")),
        )
        .with_child(ListBit::new("Phones", || -> Box<dyn Node> {
            Box::new(Field::new("Number"))
        }))
}

/// Person form built from [`PERSON_LAYOUT`]
pub fn person_layout_form() -> Form {
    LayoutSpec::from_yaml(PERSON_LAYOUT)
        .and_then(|spec| spec.build())
        .unwrap()
}

/// Id of the first data node bound to `name`
pub fn field_id(root: &dyn Node, name: &str) -> NodeId {
    walker::descendants(root)
        .into_iter()
        .find(|node| node.as_data().and_then(|data| data.name()) == Some(name))
        .map(|node| node.id())
        .unwrap_or_else(|| panic!("no data node named {name}"))
}

/// In-memory store that records every save request
#[derive(Debug, Default)]
pub struct RecordingHandler {
    record: Mutex<DataValue>,
    requests: Mutex<Vec<SaveRequest>>,
    loads: AtomicUsize,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: DataValue) -> Self {
        Self {
            record: Mutex::new(record),
            ..Self::default()
        }
    }

    pub fn record(&self) -> DataValue {
        self.record.lock().clone()
    }

    pub fn requests(&self) -> Vec<SaveRequest> {
        self.requests.lock().clone()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CrudHandler for RecordingHandler {
    async fn load(&self) -> anyhow::Result<DataValue> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.record())
    }

    async fn save(&self, request: &SaveRequest) -> anyhow::Result<DataValue> {
        self.requests.lock().push(request.clone());
        let stored = strip_tag(request.value.clone());
        *self.record.lock() = stored.clone();
        Ok(stored)
    }
}

/// Handler whose calls wait until [`GatedHandler::release`] is called
#[derive(Debug, Default)]
pub struct GatedHandler {
    gate: Notify,
    saves: AtomicUsize,
}

impl GatedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let one waiting (or the next) call complete
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CrudHandler for GatedHandler {
    async fn load(&self) -> anyhow::Result<DataValue> {
        self.gate.notified().await;
        Ok(DataValue::Null)
    }

    async fn save(&self, request: &SaveRequest) -> anyhow::Result<DataValue> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(serde_json::json!({ "saved": request.mode == DataMode::Insert }))
    }
}

/// Handler failing every call with `message`
#[derive(Debug, Clone)]
pub struct FailingHandler {
    pub message: String,
}

impl FailingHandler {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
impl CrudHandler for FailingHandler {
    async fn load(&self) -> anyhow::Result<DataValue> {
        anyhow::bail!("{}", self.message)
    }

    async fn save(&self, _request: &SaveRequest) -> anyhow::Result<DataValue> {
        anyhow::bail!("{}", self.message)
    }
}
