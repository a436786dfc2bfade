use formtree_crud::{CountingBusy, CrudConfig, CrudError, CrudForm, FileStore, FixedPrompt};
use formtree_node::{DataMode, DataNode, DataValue};
use formtree_test_utils::{
    field_id, person_form, person_layout_form, FailingHandler, GatedHandler, RecordingHandler,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn id_of(crud: &CrudForm, name: &str) -> formtree_node::NodeId {
    crud.with_form(|form| field_id(form, name))
}

#[tokio::test]
async fn second_save_while_in_flight_is_rejected() {
    let handler = Arc::new(GatedHandler::new());
    let crud = CrudForm::new(person_form(), handler.clone());
    crud.new_record().unwrap();
    crud.input(id_of(&crud, "FirstName"), json!("Ada")).unwrap();

    let (first, (second, edit, flags)) = tokio::join!(crud.save(), async {
        while !crud.is_busy() {
            tokio::task::yield_now().await;
        }
        let second = crud.save().await;
        let edit = crud.input(id_of(&crud, "LastName"), json!("King"));
        let flags = crud.affordances();
        handler.release();
        (second, edit, flags)
    });

    assert_eq!(first.unwrap(), json!({"saved": true}));
    assert!(matches!(second, Err(CrudError::Busy)));
    assert!(matches!(edit, Err(CrudError::Busy)));
    assert!(flags.busy && flags.none());
    assert_eq!(handler.saves(), 1);

    assert!(!crud.is_busy());
    assert_eq!(crud.mode(), DataMode::Unspecified);
    assert!(!crud.affordances().busy);
}

#[tokio::test]
async fn refresh_is_guarded_too() {
    let handler = Arc::new(GatedHandler::new());
    let crud = CrudForm::new(person_form(), handler.clone());

    let (first, (second, new)) = tokio::join!(crud.refresh(), async {
        while !crud.is_busy() {
            tokio::task::yield_now().await;
        }
        let second = crud.refresh().await;
        let new = crud.new_record();
        handler.release();
        (second, new)
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(CrudError::Busy)));
    assert!(matches!(new, Err(CrudError::Busy)));
    assert_eq!(crud.baseline(), None);
}

#[tokio::test]
async fn mode_tag_follows_the_session() {
    let handler = Arc::new(RecordingHandler::with_record(json!({
        "FirstName": "Ada",
        "LastName": "Lovelace",
        "Age": 36,
        "Address": {"City": "London"},
        "Phones": ["1 23"]
    })));
    let crud = CrudForm::new(person_form(), handler.clone());

    crud.refresh().await.unwrap();
    assert!(crud.with_form(|form| form.value().get("$mode").is_none()));

    crud.edit().unwrap();
    assert_eq!(crud.with_form(|form| form.value()["$mode"].clone()), json!("update"));

    crud.input(id_of(&crud, "City"), json!("Paris")).unwrap();
    crud.save().await.unwrap();

    let requests = handler.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].mode, DataMode::Update);
    assert_eq!(requests[0].value["$mode"], json!("update"));
    assert_eq!(requests[0].value["Address"], json!({"City": "Paris"}));

    assert_eq!(handler.record()["Address"]["City"], json!("Paris"));
    assert!(handler.record().get("$mode").is_none());
    assert!(crud.with_form(|form| form.value().get("$mode").is_none()));
}

#[tokio::test]
async fn layout_form_round_trips_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("person.json");
    let busy = Arc::new(CountingBusy::new());

    let crud = CrudForm::new(person_layout_form(), Arc::new(FileStore::new(&path)))
        .with_busy(busy.clone())
        .with_config(CrudConfig::new().with_apply_save_result(true));

    crud.refresh().await.unwrap();
    assert_eq!(crud.baseline(), None);
    assert!(!crud.affordances().can_edit);

    crud.new_record().unwrap();
    crud.input(id_of(&crud, "FirstName"), json!("Ada")).unwrap();
    crud.input(id_of(&crud, "Age"), json!("36")).unwrap();
    crud.save().await.unwrap();

    let stored: DataValue = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        stored,
        json!({"FirstName": "Ada", "LastName": null, "Age": "36", "Phones": []})
    );

    let reopened = CrudForm::new(person_layout_form(), Arc::new(FileStore::new(&path)));
    reopened.refresh().await.unwrap();
    assert_eq!(reopened.baseline(), Some(stored));
    reopened.edit().unwrap();
    reopened.cancel().unwrap();

    assert_eq!(busy.begun(), 2);
    assert!(!busy.is_active());
}

#[tokio::test]
async fn file_store_insert_conflict_keeps_editing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("person.json");
    std::fs::write(&path, r#"{"FirstName": "Grace"}"#).unwrap();

    let crud = CrudForm::new(person_form(), Arc::new(FileStore::new(&path)));
    crud.new_record().unwrap();
    crud.input(id_of(&crud, "FirstName"), json!("Ada")).unwrap();

    let err = crud.save().await.unwrap_err();
    assert!(matches!(err, CrudError::Save(_)));
    assert_eq!(crud.mode(), DataMode::Insert);
    assert_eq!(crud.with_form(|form| form.untagged_value()["FirstName"].clone()), json!("Ada"));
}

#[tokio::test]
async fn failures_surface_without_state_changes() {
    let crud = CrudForm::new(person_form(), Arc::new(FailingHandler::new("offline")));

    let err = crud.refresh().await.unwrap_err();
    assert_eq!(err.to_string(), "load failed: offline");
    assert_eq!(crud.mode(), DataMode::Unspecified);

    crud.new_record().unwrap();
    crud.input(id_of(&crud, "FirstName"), json!("Ada")).unwrap();
    assert!(crud.can_submit());
    assert!(matches!(crud.save().await, Err(CrudError::Save(_))));
    assert_eq!(crud.mode(), DataMode::Insert);
    assert!(crud.affordances().can_cancel);
}

#[tokio::test]
async fn close_query_tracks_unsaved_edits() {
    let handler = Arc::new(RecordingHandler::with_record(json!({"FirstName": "Ada"})));
    let crud = CrudForm::new(person_form(), handler).with_prompt(Arc::new(FixedPrompt(false)));

    crud.refresh().await.unwrap();
    assert!(crud.query_close().await);

    crud.edit().unwrap();
    crud.input(id_of(&crud, "LastName"), json!("Byron")).unwrap();
    assert!(!crud.query_close().await);

    crud.save().await.unwrap();
    assert!(crud.query_close().await);
}

#[tokio::test]
async fn programmatic_edits_recompute_affordances() {
    let crud = CrudForm::new(person_form(), Arc::new(RecordingHandler::new()));
    crud.new_record().unwrap();
    assert!(!crud.can_submit());

    crud.with_form_mut(|form| form.set_value(json!({"FirstName": "Ada"})))
        .unwrap();
    assert!(crud.can_submit());
    assert!(crud.affordances().can_save);
}
