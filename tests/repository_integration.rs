//! Integration tests against a live MongoDB server.
//!
//! Compiled only with `--features integration`. The server is taken from
//! `MONGOWRAP_TEST_URI` (default `mongodb://localhost:27017`); every test
//! works in its own collection and drops it afterwards.

#![cfg(feature = "integration")]

use std::sync::atomic::{AtomicUsize, Ordering};

use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongowrap::prelude::*;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

static NEXT_COLLECTION: AtomicUsize = AtomicUsize::new(0);

fn test_uri() -> String {
    std::env::var("MONGOWRAP_TEST_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into())
}

async fn fresh_repo<T: Send + Sync>(name: &str) -> Repository<T> {
    let collection = format!(
        "{}_{}_{}",
        name,
        std::process::id(),
        NEXT_COLLECTION.fetch_add(1, Ordering::SeqCst)
    );
    let repo = Repository::connect(&collection, "mongowrap_it", &test_uri())
        .await
        .expect("failed to connect");
    repo.ping().await.expect("MongoDB not reachable");
    repo
}

async fn drop_repo<T: Send + Sync>(repo: Repository<T>) {
    repo.query_repo().drop(None).await.expect("failed to drop collection");
}

/// create followed by find on the returned id yields the same document
#[tokio::test]
async fn test_create_then_find_round_trip() {
    let repo: Repository = fresh_repo("round_trip").await;

    let document = doc! { "name": "Alice", "age": 31, "tags": ["admin", "ops"] };
    let id = repo.create(&document).await.unwrap();

    let found: Vec<Document> = repo
        .find(doc! { "_id": id.clone() })
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    let mut expected = doc! { "_id": id };
    expected.extend(document);
    assert_eq!(found[0], expected);

    drop_repo(repo).await;
}

/// delete followed by find with the same filter yields nothing
#[tokio::test]
async fn test_delete_then_find_is_empty() {
    let repo: Repository = fresh_repo("delete").await;

    repo.create_many(&[
        doc! { "kind": "temp", "n": 1 },
        doc! { "kind": "temp", "n": 2 },
        doc! { "kind": "keep", "n": 3 },
    ])
    .await
    .unwrap();

    let deleted = repo.delete(doc! { "kind": "temp" }).await.unwrap();
    assert_eq!(deleted, 2);

    let remaining: Vec<Document> = repo
        .find(doc! { "kind": "temp" })
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(remaining.is_empty());
    assert_eq!(repo.count(doc! {}).await.unwrap(), 1);

    drop_repo(repo).await;
}

/// update_many returns the modified count
#[tokio::test]
async fn test_update_counts_modified_documents() {
    let repo: Repository = fresh_repo("update").await;

    repo.create_many(&[
        doc! { "team": "core", "active": false },
        doc! { "team": "core", "active": true },
        doc! { "team": "web", "active": false },
    ])
    .await
    .unwrap();

    let modified = repo
        .update(doc! { "team": "core" }, doc! { "$set": { "active": true } })
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let err = repo
        .update(doc! { "team": "core" }, doc! { "$bogus": { "active": true } })
        .await
        .unwrap_err();
    assert!(err.is_store_error());

    drop_repo(repo).await;
}

/// upsert inserts once, then matches
#[tokio::test]
async fn test_upsert() {
    let repo: Repository = fresh_repo("upsert").await;

    let first = repo
        .upsert(doc! { "sku": "A-1" }, doc! { "$inc": { "stock": 5 } })
        .await
        .unwrap();
    assert!(first.is_some());

    let second = repo
        .upsert(doc! { "sku": "A-1" }, doc! { "$inc": { "stock": 5 } })
        .await
        .unwrap();
    assert_eq!(second, None);

    let item = repo.find_one(doc! { "sku": "A-1" }).await.unwrap().unwrap();
    assert_eq!(item.get_i32("stock").unwrap(), 10);

    drop_repo(repo).await;
}

/// Duplicate ids surface as store errors
#[tokio::test]
async fn test_duplicate_id_is_store_error() {
    let repo: Repository = fresh_repo("duplicate").await;

    repo.create(&doc! { "_id": "fixed" }).await.unwrap();
    let err = repo.create(&doc! { "_id": "fixed" }).await.unwrap_err();
    assert!(err.is_store_error());
    assert!(err.is_duplicate_key());

    let err = repo
        .create_many(&[doc! { "_id": "other" }, doc! { "_id": "fixed" }])
        .await
        .unwrap_err();
    assert!(err.is_duplicate_key());

    drop_repo(repo).await;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sale {
    region: String,
    amount: i32,
}

/// Typed repositories and aggregation through the built pipeline
#[tokio::test]
async fn test_typed_repository_aggregation() {
    let repo: Repository<Sale> = fresh_repo("sales").await;

    let sales = [("eu", 10), ("eu", 30), ("us", 5), ("apac", 50), ("us", 7)]
        .into_iter()
        .map(|(region, amount)| Sale {
            region: region.to_string(),
            amount,
        })
        .collect::<Vec<_>>();
    let ids = repo.create_many(&sales).await.unwrap();
    assert_eq!(ids.len(), 5);

    let mut builder = PipelineBuilder::new();
    builder
        .match_stage(doc! { "amount": { "$gt": 6 } })
        .group(["region"], doc! { "total": accumulators::sum("$amount") })
        .unwrap()
        .sort([("total", -1)])
        .unwrap()
        .limit(2)
        .unwrap();

    let top: Vec<Document> = repo
        .aggregate_with(&builder)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(
        top,
        vec![
            doc! { "_id": { "region": "apac" }, "total": 50 },
            doc! { "_id": { "region": "eu" }, "total": 40 },
        ]
    );

    let eu: Vec<Sale> = repo
        .find(doc! { "region": "eu" })
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(eu.len(), 2);

    let raw_total = repo
        .query_repo()
        .count_documents(doc! { "region": "us" }, None)
        .await
        .unwrap();
    assert_eq!(raw_total, 2);

    drop_repo(repo).await;
}

/// A repository can be built from the settings file format
#[tokio::test]
async fn test_repository_from_settings() {
    let settings = Settings::from_str(&format!(
        "[mongodb]\nuri = \"{}\"\ndatabase = \"mongowrap_it\"\napp_name = \"it\"\n",
        test_uri()
    ))
    .unwrap();

    let repo: Repository =
        Repository::from_config("settings_probe", settings.into_config().unwrap())
            .await
            .unwrap();
    repo.ping().await.unwrap();

    let id = repo.create(&doc! { "probe": true }).await.unwrap();
    assert!(matches!(id, Bson::ObjectId(_)));

    drop_repo(repo).await;
}
