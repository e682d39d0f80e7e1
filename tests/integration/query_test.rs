//! Integration tests for query hooks and the query builder.

mod helpers;

use serde_json::json;

use docstore::{ErrorKind, FindOptions, InsertManyOptions, OpContext, QueryStage};
use helpers::{ErrorHook, Plain, QueryCounter};

async fn seed(users: &docstore::Collection, ctx: &OpContext) {
    let mut batch: Vec<Plain> = [("Lucas", 17), ("xm", 17), ("wxy", 7), ("zp", 9)]
        .into_iter()
        .map(|(name, age)| Plain {
            name: name.to_string(),
            age,
        })
        .collect();
    users
        .insert_many(ctx, &mut batch, InsertManyOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_one_without_match_is_not_found() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut counter = QueryCounter::default();
    let mut found = Plain::default();

    let err = users
        .find(&ctx, json!({"name": "nobody"}), FindOptions::new().query_hook(&mut counter))
        .one(&mut found)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!((counter.before, counter.after), (1, 0));
    assert_eq!(found, Plain::default());
    assert_eq!(driver.queries(), 1);
}

#[tokio::test]
async fn test_all_without_match_is_empty() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut counter = QueryCounter::default();
    let mut found = vec![Plain::default()];

    users
        .find(&ctx, json!({"name": "nobody"}), FindOptions::new().query_hook(&mut counter))
        .all(&mut found)
        .await
        .unwrap();

    assert!(found.is_empty());
    assert_eq!((counter.before, counter.after), (1, 1));
}

#[tokio::test]
async fn test_failing_after_query_leaves_target_populated() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    seed(&users, &ctx).await;

    let mut hook = ErrorHook::default();
    let mut found = Plain::default();

    let err = users
        .find(&ctx, json!({"age": 17}), FindOptions::new().query_hook(&mut hook))
        .one(&mut found)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert_eq!((hook.before_query, hook.after_query), (1, 0));
    assert_eq!(found, Plain::default());
    assert_eq!(driver.queries(), 0);

    let err = users
        .find(&ctx, json!({"age": 17}), FindOptions::new().query_hook(&mut hook))
        .one(&mut found)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AfterHook);
    assert_eq!((hook.before_query, hook.after_query), (2, 1));
    assert_eq!(found.age, 17);
    assert_eq!(driver.queries(), 1);
}

#[tokio::test]
async fn test_sort_skip_limit_select() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();
    seed(&users, &ctx).await;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Name {
        name: String,
        age: Option<u32>,
    }

    let mut page: Vec<Name> = Vec::new();
    users
        .find(&ctx, json!({"age": {"$gte": 9}}), FindOptions::new())
        .sort(&["-age", "name"])
        .skip(1)
        .limit(2)
        .select(json!({"name": 1}))
        .all(&mut page)
        .await
        .unwrap();

    assert_eq!(
        page,
        vec![
            Name {
                name: "xm".to_string(),
                age: None
            },
            Name {
                name: "zp".to_string(),
                age: None
            },
        ]
    );
}

#[tokio::test]
async fn test_count_fires_no_hooks() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();
    seed(&users, &ctx).await;

    let mut counter = QueryCounter::default();
    let mut query =
        users.find(&ctx, json!({"age": 17}), FindOptions::new().query_hook(&mut counter));
    assert_eq!(query.stage(), QueryStage::Built);

    assert_eq!(query.count().await.unwrap(), 2);
    assert_eq!(query.stage(), QueryStage::Done);
    drop(query);
    assert_eq!((counter.before, counter.after), (0, 0));
}

#[tokio::test]
async fn test_stage_reports_outcome() {
    let (_driver, users) = helpers::users();
    let ctx = OpContext::background();
    seed(&users, &ctx).await;

    let mut found = Plain::default();
    let mut query = users.find(&ctx, json!({"name": "wxy"}), FindOptions::new());
    query.one(&mut found).await.unwrap();
    assert_eq!(query.stage(), QueryStage::Done);
    assert_eq!(found.age, 7);

    let mut hook = ErrorHook::default();
    let mut query = users.find(
        &ctx,
        json!({"name": "wxy"}),
        FindOptions::new().query_hook(&mut hook),
    );
    let err = query.one(&mut found).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BeforeHook);
    assert_eq!(query.stage(), QueryStage::Errored);

    let mut missing = users.find(&ctx, json!({"name": "nobody"}), FindOptions::new());
    let err = missing.one(&mut found).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(missing.stage(), QueryStage::Errored);
}

#[tokio::test]
async fn test_query_cannot_be_consumed_twice() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    seed(&users, &ctx).await;

    let mut counter = QueryCounter::default();
    let mut found: Vec<Plain> = Vec::new();
    let mut query =
        users.find(&ctx, json!({"age": 17}), FindOptions::new().query_hook(&mut counter));
    query.all(&mut found).await.unwrap();
    assert_eq!(found.len(), 2);

    let err = query.all(&mut found).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(query.stage(), QueryStage::Done);
    assert_eq!(found.len(), 2);
    drop(query);

    assert_eq!((counter.before, counter.after), (1, 1));
    assert_eq!(driver.queries(), 1);
}

#[tokio::test]
async fn test_malformed_filter_surfaces_on_consume() {
    let (driver, users) = helpers::users();
    let ctx = OpContext::background();
    let mut counter = QueryCounter::default();
    let mut found: Vec<Plain> = Vec::new();

    let err = users
        .find(&ctx, json!("Lucas"), FindOptions::new().query_hook(&mut counter))
        .all(&mut found)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(counter.before, 0);
    assert_eq!(driver.queries(), 0);
}
