//! Integration tests for SoftDelete over the in-memory backend.


use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{json, Value};
use soft_delete::{
    CallOptions, CompletionExt, FieldDescriptor, FieldType, InMemoryModel, InstancesExt,
    ModelBackend, ModelDefinition, ModelError, Query, Record, SoftDelete, SoftDeleteOptions,
    Where,
};
use support::{init_tracing, people, record, timestamp};

async fn seed(model: &impl ModelBackend, rows: &[Value]) {
    for row in rows {
        model.create(record(row.clone()), &CallOptions::new()).await.unwrap();
    }
}

fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().filter_map(|r| r["id"].as_u64()).collect()
}

/// Fields of every record except the deletion timestamp, for comparing runs.
fn without_timestamps(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut r| {
            r.remove("deletedAt");
            r
        })
        .collect()
}

#[tokio::test]
async fn deleted_records_leave_default_reads() {
    init_tracing();
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(
        &model,
        &[json!({ "name": "ada" }), json!({ "name": "grace" }), json!({ "name": "linus" })],
    )
    .await;

    let summary = model.destroy_by_id(json!(2), &opts).await.unwrap();
    assert_eq!(summary.count, 1);

    let visible = model.find(Query::new(), &opts).await.unwrap();
    assert_eq!(ids(&visible), [1, 3]);

    let everything = model.find(Query::new().with_deleted(), &opts).await.unwrap();
    assert_eq!(ids(&everything), [1, 2, 3]);

    assert!(model.find_by_id(json!(2), &opts).await.unwrap().is_none());
    assert_eq!(model.inner().len().unwrap(), 3);
}

#[tokio::test]
async fn deleted_records_carry_markers() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({ "name": "ada" })]).await;

    let fresh = model.find_by_id(json!(1), &opts).await.unwrap().unwrap();
    assert_eq!(fresh["_isDeleted"], json!(false));
    assert_eq!(fresh["deletedAt"], Value::Null);

    let before = Utc::now();
    model.destroy_by_id(json!(1), &opts).await.unwrap();

    let stored = model
        .find_one(Query::new().with_deleted(), &opts)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["_isDeleted"], json!(true));
    assert!(timestamp(&stored["deletedAt"]) >= before);
    assert_eq!(stored["name"], json!("ada"));
}

#[tokio::test]
async fn count_drops_by_number_deleted() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(
        &model,
        &[
            json!({ "status": "x" }),
            json!({ "status": "x" }),
            json!({ "status": "y" }),
            json!({ "status": "x" }),
        ],
    )
    .await;

    let by_status = Where::eq("status", "x");
    assert_eq!(model.count(by_status.clone(), &opts).await.unwrap(), 3);
    assert_eq!(model.count(Where::all(), &opts).await.unwrap(), 4);

    let first_two = Where::Or(vec![Where::eq("id", 1), Where::eq("id", 2)]);
    let summary = model.destroy_all(first_two, &opts).await.unwrap();
    assert_eq!(summary.count, 2);

    assert_eq!(model.count(by_status, &opts).await.unwrap(), 1);
    assert_eq!(model.count(Where::all(), &opts).await.unwrap(), 2);
}

#[tokio::test]
async fn scrub_all_nulls_everything_but_identity_and_markers() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::new().scrub_all()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({ "name": "ada", "ssn": "123-45-6789", "status": "x" })]).await;

    let stored = model.find_by_id(json!(1), &opts).await.unwrap().unwrap();
    let mut instance = model.instance(stored);
    let deleted = instance.destroy(&opts).await.unwrap();

    assert_eq!(deleted["id"], json!(1));
    assert_eq!(deleted["name"], Value::Null);
    assert_eq!(deleted["ssn"], Value::Null);
    assert_eq!(deleted["status"], Value::Null);
    assert_eq!(deleted["_isDeleted"], json!(true));
    assert!(deleted["deletedAt"].is_string());
}

#[tokio::test]
async fn bulk_aliases_have_identical_effects() {
    let rows = [
        json!({ "name": "a", "status": "x" }),
        json!({ "name": "b", "status": "y" }),
        json!({ "name": "c", "status": "x" }),
    ];
    let opts = CallOptions::new();
    let options = SoftDeleteOptions::new().scrub_fields(["name"]);

    let mut results = Vec::new();
    for alias in ["destroy_all", "remove", "delete_all"] {
        let model = SoftDelete::attach(people(), options.clone()).unwrap();
        seed(&model, &rows).await;

        let filter = Where::eq("status", "x");
        let summary = match alias {
            "destroy_all" => model.destroy_all(filter, &opts).await,
            "remove" => model.remove(filter, &opts).await,
            _ => model.delete_all(filter, &opts).await,
        }
        .unwrap();
        assert_eq!(summary.count, 2);

        let all = model.find(Query::new().with_deleted(), &opts).await.unwrap();
        results.push(without_timestamps(all));
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[tokio::test]
async fn by_id_aliases_have_identical_effects() {
    let opts = CallOptions::new();
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    seed(&model, &[json!({}), json!({}), json!({})]).await;

    model.destroy_by_id(json!(1), &opts).await.unwrap();
    model.remove_by_id(json!(2), &opts).await.unwrap();
    model.delete_by_id(json!(3), &opts).await.unwrap();

    assert_eq!(model.count(Where::all(), &opts).await.unwrap(), 0);
    let all = model.find(Query::new().with_deleted(), &opts).await.unwrap();
    assert!(all.iter().all(|r| r["_isDeleted"] == json!(true)));
}

#[tokio::test]
async fn callback_receives_result_or_error() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({ "name": "ada" })]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    model
        .destroy_by_id(json!(1), &opts)
        .on_complete(move |result| sink.lock().unwrap().push(result.map(|s| s.count)))
        .await;

    // Scrubbing a field the backend does not know fails at delete time.
    let broken =
        SoftDelete::attach(people(), SoftDeleteOptions::new().scrub_fields(["nickname"])).unwrap();
    seed(&broken, &[json!({ "name": "ada" })]).await;
    let sink = seen.clone();
    broken
        .destroy_by_id(json!(1), &opts)
        .on_complete(move |result| sink.lock().unwrap().push(result.map(|s| s.count)))
        .await;

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            Ok(1),
            Err(ModelError::UnknownProperty {
                model: "Person".into(),
                property: "nickname".into()
            })
        ]
    );
}

#[tokio::test]
async fn updates_never_touch_deleted_records() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({ "status": "x" }), json!({ "status": "x" })]).await;
    model.destroy_by_id(json!(1), &opts).await.unwrap();

    let patch = record(json!({ "status": "z" }));
    let summary = model
        .update_all(Where::eq("status", "x"), patch.clone(), &opts)
        .await
        .unwrap();
    assert_eq!(summary.count, 1);
    let summary = model.update(Where::all(), patch, &opts).await.unwrap();
    assert_eq!(summary.count, 1);

    let deleted = model.inner().find_by_id(json!(1), &opts).await.unwrap().unwrap();
    assert_eq!(deleted["status"], json!("x"));
    let live = model.find_by_id(json!(2), &opts).await.unwrap().unwrap();
    assert_eq!(live["status"], json!("z"));
}

#[tokio::test]
async fn deleting_twice_keeps_first_deletion() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({})]).await;

    assert_eq!(model.destroy_by_id(json!(1), &opts).await.unwrap().count, 1);
    let first = model.inner().find_by_id(json!(1), &opts).await.unwrap().unwrap();

    assert_eq!(model.destroy_by_id(json!(1), &opts).await.unwrap().count, 0);
    let second = model.inner().find_by_id(json!(1), &opts).await.unwrap().unwrap();

    assert_eq!(first["deletedAt"], second["deletedAt"]);
}

#[tokio::test]
async fn find_or_create_ignores_deleted_matches() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({ "name": "ada" })]).await;
    model.destroy_by_id(json!(1), &opts).await.unwrap();

    let by_name = Query::new().filter(Where::eq("name", "ada"));
    let (found, created) = model
        .find_or_create(by_name.clone().with_deleted(), record(json!({ "name": "ada" })), &opts)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(found["id"], json!(1));

    let (fresh, created) = model
        .find_or_create(by_name, record(json!({ "name": "ada" })), &opts)
        .await
        .unwrap();
    assert!(created);
    assert_eq!(fresh["id"], json!(2));
    assert_eq!(fresh["_isDeleted"], json!(false));
}

#[tokio::test]
async fn instance_aliases_soft_delete() {
    let model = SoftDelete::attach(people(), SoftDeleteOptions::default()).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({}), json!({}), json!({})]).await;

    let rows = model.find(Query::new(), &opts).await.unwrap();
    let mut rows = rows.into_iter();
    model.instance(rows.next().unwrap()).destroy(&opts).await.unwrap();
    model.instance(rows.next().unwrap()).remove(&opts).await.unwrap();
    model.instance(rows.next().unwrap()).delete(&opts).await.unwrap();

    assert_eq!(model.count(Where::all(), &opts).await.unwrap(), 0);
    assert_eq!(model.inner().len().unwrap(), 3);
}

#[tokio::test]
async fn email_scrub_scenario() {
    let definition = ModelDefinition::new("Subscriber")
        .with_property("id", FieldDescriptor::id(FieldType::Number))
        .with_property("email", FieldDescriptor::new(FieldType::String))
        .with_property("deletedAt", FieldDescriptor::new(FieldType::Date))
        .with_property("_isDeleted", FieldDescriptor::new(FieldType::Boolean));
    let model = SoftDelete::attach(
        InMemoryModel::new(definition),
        SoftDeleteOptions::new().scrub_fields(["email"]),
    )
    .unwrap();
    let opts = CallOptions::new();
    seed(
        &model,
        &[json!({ "id": 1, "email": "a@example.com" }), json!({ "id": 2, "email": "b@example.com" })],
    )
    .await;

    model.destroy_by_id(json!(1), &opts).await.unwrap();

    let visible = model.find(Query::new(), &opts).await.unwrap();
    assert_eq!(ids(&visible), [2]);

    let all = model.find(Query::new().with_deleted(), &opts).await.unwrap();
    let gone = all.iter().find(|r| r["id"] == json!(1)).unwrap();
    assert_eq!(gone["email"], Value::Null);
    assert_eq!(gone["_isDeleted"], json!(true));
    assert!(gone["deletedAt"].is_string());
    assert_eq!(all.iter().find(|r| r["id"] == json!(2)).unwrap()["email"], json!("b@example.com"));
}

#[tokio::test]
async fn attach_from_model_config() {
    let config = json!({
        "name": "Person",
        "mixins": {
            "SoftDelete": { "deletedAt": "removedOn", "_isDeleted": "removed", "scrub": true }
        }
    });
    let options = SoftDeleteOptions::from_model_config(&config).unwrap().unwrap();
    let model = SoftDelete::attach(people(), options).unwrap();
    let opts = CallOptions::new();
    seed(&model, &[json!({ "name": "ada" })]).await;

    model.destroy_all(Where::eq("name", "ada"), &opts).await.unwrap();

    let stored = model.inner().find_by_id(json!(1), &opts).await.unwrap().unwrap();
    assert_eq!(stored["removed"], json!(true));
    assert!(stored["removedOn"].is_string());
    assert_eq!(stored["name"], Value::Null);
    assert!(!stored.contains_key("deletedAt"));
}

#[test]
fn attach_rejects_model_without_fields() {
    let err = SoftDelete::attach(
        InMemoryModel::new(ModelDefinition::new("Empty")),
        SoftDeleteOptions::default(),
    )
    .err()
    .unwrap();
    assert_eq!(err.to_string(), "model Empty defines no properties");
}
