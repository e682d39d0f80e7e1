//! Integration tests for update and replace hooks.

mod helpers;

use serde_json::json;

use docstore::{
    ErrorKind, FindOptions, InsertManyOptions, InsertOneOptions, OpContext, ReplaceOptions,
    UpdateOptions,
};
use helpers::{Plain, UpdateCounter, UserHook};

#[tokio::test]
async fn test_update_family_hooks() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("Lucas", 7);
    let inserted = users
        .insert_one(&ctx, &mut user, InsertOneOptions::new())
        .await
        .unwrap();

    let mut counter = UpdateCounter::default();
    let result = users
        .update_one(
            &ctx,
            json!({"name": "Lucas"}),
            json!({"$set": {"age": 27}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap();
    assert_eq!((result.matched_count, result.modified_count), (1, 1));
    assert_eq!((counter.before, counter.after), (1, 1));

    users
        .update_id(
            &ctx,
            inserted.inserted_id.clone(),
            json!({"$set": {"age": 27}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap();
    assert_eq!((counter.before, counter.after), (2, 2));

    // Replace defaults to the replacement document as the hook value.
    users
        .replace_one(&ctx, json!({"name": "Lucas"}), &mut user, ReplaceOptions::new())
        .await
        .unwrap();
    assert_eq!((user.before_count, user.after_count), (1, 1));

    users
        .replace_one(&ctx, json!({"name": "Lucas"}), &mut user, ReplaceOptions::new())
        .await
        .unwrap();
    assert_eq!((user.before_count, user.after_count), (2, 2));

    users
        .update_all(
            &ctx,
            json!({"name": "Lucas"}),
            json!({"$set": {"age": 27}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap();
    assert_eq!((counter.before, counter.after), (3, 3));
    assert_eq!(driver.executes(), 6);
}

#[tokio::test]
async fn test_explicit_replace_hook_takes_precedence() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("Lucas", 7);
    users
        .insert_one(&ctx, &mut user, InsertOneOptions::new())
        .await
        .unwrap();

    let mut counter = UpdateCounter::default();
    user.age = 30;
    users
        .replace_one(
            &ctx,
            json!({"name": "Lucas"}),
            &mut user,
            ReplaceOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap();

    assert_eq!((counter.before, counter.after), (1, 1));
    assert_eq!((user.before_count, user.after_count), (0, 0));

    let mut found = Plain::default();
    users
        .find(&ctx, json!({"name": "Lucas"}), FindOptions::new())
        .one(&mut found)
        .await
        .unwrap();
    assert_eq!(found.age, 30);
}

#[tokio::test]
async fn test_replace_without_hooks() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("Lucas", 7);
    users
        .insert_one(&ctx, &mut user, InsertOneOptions::new())
        .await
        .unwrap();
    users
        .replace_one(
            &ctx,
            json!({"name": "Lucas"}),
            &mut user,
            ReplaceOptions::new().without_hooks(),
        )
        .await
        .unwrap();

    assert_eq!((user.before_count, user.after_count), (0, 0));
}

#[tokio::test]
async fn test_update_all_fires_once_for_many_documents() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut batch: Vec<Plain> = (0..4)
        .map(|i| Plain {
            name: format!("user-{i}"),
            age: 7,
        })
        .collect();
    users
        .insert_many(&ctx, &mut batch, InsertManyOptions::new())
        .await
        .unwrap();

    let mut counter = UpdateCounter::default();
    let result = users
        .update_all(
            &ctx,
            json!({"age": 7}),
            json!({"$inc": {"age": 1}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap();

    assert_eq!(result.matched_count, 4);
    assert_eq!(result.modified_count, 4);
    assert_eq!((counter.before, counter.after), (1, 1));
}

#[tokio::test]
async fn test_update_zero_match_is_not_found() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut counter = UpdateCounter::default();

    let err = users
        .update_one(
            &ctx,
            json!({"name": "nobody"}),
            json!({"$set": {"age": 1}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!((counter.before, counter.after), (1, 0));
    assert_eq!(driver.executes(), 1);

    let result = users
        .update_all(
            &ctx,
            json!({"name": "nobody"}),
            json!({"$set": {"age": 1}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap();
    assert_eq!(result.matched_count, 0);
    assert_eq!((counter.before, counter.after), (2, 1));
}

#[tokio::test]
async fn test_replace_zero_match_is_not_found() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();

    let mut user = UserHook::new("Lucas", 7);
    let err = users
        .replace_one(&ctx, json!({"name": "Lucas"}), &mut user, ReplaceOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!((user.before_count, user.after_count), (1, 0));
}

#[tokio::test]
async fn test_malformed_update_rejected_before_hooks() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut counter = UpdateCounter::default();

    let err = users
        .update_one(
            &ctx,
            json!({"name": "Lucas"}),
            json!([{"$set": {"age": 1}}]),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(counter.before, 0);
    assert_eq!(driver.executes(), 0);
}

#[tokio::test]
async fn test_driver_failure_skips_after_update() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    driver.fail();

    let mut counter = UpdateCounter::default();
    let err = users
        .update_one(
            &ctx,
            json!({"name": "Lucas"}),
            json!({"$set": {"age": 1}}),
            UpdateOptions::new().update_hook(&mut counter),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!((counter.before, counter.after), (1, 0));

    let mut user = UserHook::new("Lucas", 7);
    let err = users
        .replace_one(&ctx, json!({"name": "Lucas"}), &mut user, ReplaceOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!((user.before_count, user.after_count), (1, 0));
}
