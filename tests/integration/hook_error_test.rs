//! Integration tests for hook failure propagation across every family.

mod helpers;

use serde_json::json;

use docstore::{
    ErrorKind, FindOptions, InsertOneOptions, OpContext, RemoveOptions, UpdateOptions,
    UpsertOptions,
};
use helpers::{ErrorHook, Plain};

fn lucas() -> Plain {
    Plain {
        name: "Lucas".to_string(),
        age: 7,
    }
}

#[tokio::test]
async fn test_insert_hook_errors() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut hook = ErrorHook::default();

    let mut doc = lucas();
    let err = users
        .insert_one(&ctx, &mut doc, InsertOneOptions::new().insert_hook(&mut hook))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert!(!err.is_commit_unknown());
    assert_eq!(err.hook_error().map(|e| e.message.as_str()), Some("error"));
    assert_eq!((hook.before_insert, hook.after_insert), (1, 0));
    assert_eq!(driver.executes(), 0);

    let err = users
        .insert_one(&ctx, &mut doc, InsertOneOptions::new().insert_hook(&mut hook))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AfterHook);
    assert!(err.is_commit_unknown());
    assert_eq!((hook.before_insert, hook.after_insert), (2, 1));
    assert_eq!(driver.executes(), 1);

    // The write committed even though the after stage failed.
    let count = users
        .find(&ctx, json!({"name": "Lucas"}), FindOptions::new())
        .count()
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_update_hook_errors() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    users
        .insert_one(&ctx, &mut lucas(), InsertOneOptions::new())
        .await
        .unwrap();
    let seeded = driver.executes();

    let mut hook = ErrorHook::default();
    let err = users
        .update_one(
            &ctx,
            json!({"name": "Lucas"}),
            json!({"$set": {"age": 27}}),
            UpdateOptions::new().update_hook(&mut hook),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert_eq!(driver.executes(), seeded);

    let mut found = Plain::default();
    users
        .find(&ctx, json!({"name": "Lucas"}), FindOptions::new())
        .one(&mut found)
        .await
        .unwrap();
    assert_eq!(found.age, 7);

    let err = users
        .update_one(
            &ctx,
            json!({"name": "Lucas"}),
            json!({"$set": {"age": 27}}),
            UpdateOptions::new().update_hook(&mut hook),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AfterHook);
    assert_eq!((hook.before_update, hook.after_update), (2, 1));
    assert_eq!(driver.executes(), seeded + 1);

    users
        .find(&ctx, json!({"name": "Lucas"}), FindOptions::new())
        .one(&mut found)
        .await
        .unwrap();
    assert_eq!(found.age, 27);
}

#[tokio::test]
async fn test_remove_hook_errors() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    users
        .insert_one(&ctx, &mut lucas(), InsertOneOptions::new())
        .await
        .unwrap();

    let mut hook = ErrorHook::default();
    let err = users
        .remove(&ctx, json!({"name": "Lucas"}), RemoveOptions::new().remove_hook(&mut hook))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert_eq!(driver.executes(), 1);

    let err = users
        .remove(&ctx, json!({"name": "Lucas"}), RemoveOptions::new().remove_hook(&mut hook))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AfterHook);
    assert_eq!((hook.before_remove, hook.after_remove), (2, 1));
    assert_eq!(driver.executes(), 2);

    let count = users
        .find(&ctx, json!({}), FindOptions::new())
        .count()
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_upsert_hook_errors() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut hook = ErrorHook::default();
    let mut doc = lucas();

    let err = users
        .upsert(
            &ctx,
            json!({"name": "Lucas"}),
            &mut doc,
            UpsertOptions::new().upsert_hook(&mut hook),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert_eq!(driver.executes(), 0);

    let err = users
        .upsert(
            &ctx,
            json!({"name": "Lucas"}),
            &mut doc,
            UpsertOptions::new().upsert_hook(&mut hook),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AfterHook);
    assert_eq!((hook.before_upsert, hook.after_upsert), (2, 1));

    doc.age = 8;
    let result = users
        .upsert(
            &ctx,
            json!({"name": "Lucas"}),
            &mut doc,
            UpsertOptions::new().upsert_hook(&mut hook),
        )
        .await
        .unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!((hook.before_upsert, hook.after_upsert), (3, 2));
    assert_eq!(driver.executes(), 2);
}

#[tokio::test]
async fn test_upsert_id_hook_errors() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut hook = ErrorHook::default();
    let mut doc = lucas();

    let err = users
        .upsert_id(
            &ctx,
            json!("user-1"),
            &mut doc,
            UpsertOptions::new().upsert_hook(&mut hook),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert_eq!(err.message, "error");

    let err = users
        .upsert_id(
            &ctx,
            json!("user-1"),
            &mut doc,
            UpsertOptions::new().upsert_hook(&mut hook),
        )
        .await
        .unwrap_err();
    assert!(err.is_commit_unknown());

    let mut found = Plain::default();
    users
        .find(&ctx, json!({"_id": "user-1"}), FindOptions::new())
        .one(&mut found)
        .await
        .unwrap();
    assert_eq!(found, lucas());
}

#[tokio::test]
async fn test_query_hook_errors_on_all() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    users
        .insert_one(&ctx, &mut lucas(), InsertOneOptions::new())
        .await
        .unwrap();

    let mut hook = ErrorHook::default();
    let mut found: Vec<Plain> = Vec::new();
    let err = users
        .find(&ctx, json!({}), FindOptions::new().query_hook(&mut hook))
        .all(&mut found)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert!(found.is_empty());
    assert_eq!(driver.queries(), 0);

    let err = users
        .find(&ctx, json!({}), FindOptions::new().query_hook(&mut hook))
        .all(&mut found)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AfterHook);
    assert_eq!(found, vec![lucas()]);
}
