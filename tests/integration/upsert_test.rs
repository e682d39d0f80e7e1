//! Integration tests for upsert hooks.

mod helpers;

use serde_json::json;

use docstore::{ErrorKind, FindOptions, InsertOneOptions, OpContext, UpsertOptions};
use helpers::{Plain, UpdateCounter, UserHook};

#[tokio::test]
async fn test_upsert_fires_only_upsert_family_on_target() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("Lucas", 7);
    let inserted = users
        .insert_one(&ctx, &mut user, InsertOneOptions::new().hook_target())
        .await
        .unwrap();

    user.age = 18;
    let result = users
        .upsert(&ctx, json!({"name": "Lucas"}), &mut user, UpsertOptions::new())
        .await
        .unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.upserted_count, 0);
    assert_eq!((user.before_count, user.after_count), (1, 1));

    users
        .upsert_id(&ctx, inserted.inserted_id, &mut user, UpsertOptions::new())
        .await
        .unwrap();
    assert_eq!((user.before_count, user.after_count), (2, 2));
    assert_eq!(driver.executes(), 3);

    let mut found = Plain::default();
    users
        .find(&ctx, json!({"name": "Lucas"}), FindOptions::new())
        .one(&mut found)
        .await
        .unwrap();
    assert_eq!(found.age, 18);
}

#[tokio::test]
async fn test_upsert_ignores_update_only_hook() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut doc = Plain {
        name: "Lucas".to_string(),
        age: 7,
    };
    let mut counter = UpdateCounter::default();
    let result = users
        .upsert(
            &ctx,
            json!({"name": "Lucas"}),
            &mut doc,
            UpsertOptions::new().upsert_hook(&mut counter),
        )
        .await
        .unwrap();

    assert_eq!(result.upserted_count, 1);
    assert_eq!((counter.before, counter.after), (0, 0));
    assert_eq!(driver.executes(), 1);
}

#[tokio::test]
async fn test_upsert_id_inserts_under_given_key() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("xm", 7);
    let result = users
        .upsert_id(&ctx, json!("user-42"), &mut user, UpsertOptions::new())
        .await
        .unwrap();

    assert_eq!(result.upserted_id, Some(json!("user-42")));
    assert_eq!((user.before_count, user.after_count), (1, 1));

    let mut found = Plain::default();
    users
        .find(&ctx, json!({"_id": "user-42"}), FindOptions::new())
        .one(&mut found)
        .await
        .unwrap();
    assert_eq!(found.name, "xm");
}

#[tokio::test]
async fn test_upsert_without_hooks() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("zp", 7);
    users
        .upsert(
            &ctx,
            json!({"name": "zp"}),
            &mut user,
            UpsertOptions::new().without_hooks(),
        )
        .await
        .unwrap();

    assert_eq!((user.before_count, user.after_count), (0, 0));
}

#[tokio::test]
async fn test_driver_failure_skips_after_upsert() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    driver.fail();

    let mut user = UserHook::new("Lucas", 7);
    let err = users
        .upsert(&ctx, json!({"name": "Lucas"}), &mut user, UpsertOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(err.message, "injected driver failure");
    assert_eq!((user.before_count, user.after_count), (1, 0));
    assert_eq!(driver.executes(), 1);
}
