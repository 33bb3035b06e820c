//! Tests against a running OpenSearch or Elasticsearch node.
//!
//! Run with `DOCSTORE_TEST_ADDRESS=http://localhost:9200 cargo test -- --ignored`.
//! Each test works in its own throwaway collection.

use std::env;

use docstore_repository::{
    CollectionSchema, ConnectionConfig, DocumentStoreClient, DocumentStoreError, FieldChanges,
    Person, RequestContext,
};
use futures::TryStreamExt;

fn live_client() -> DocumentStoreClient {
    let address =
        env::var("DOCSTORE_TEST_ADDRESS").unwrap_or_else(|_| "http://localhost:9200".to_string());
    let mut config = ConnectionConfig::new([address]);
    if let (Ok(username), Ok(password)) = (
        env::var("DOCSTORE_TEST_USERNAME"),
        env::var("DOCSTORE_TEST_PASSWORD"),
    ) {
        config = config.with_credentials(username, password);
    }
    DocumentStoreClient::connect(config).unwrap()
}

async fn fresh_collection(client: &DocumentStoreClient, name: &str) {
    let ctx = RequestContext::background();
    match client.delete_collection(&ctx, name).await {
        Ok(()) | Err(DocumentStoreError::CollectionNotFound(_)) => {}
        Err(e) => panic!("failed to clear {}: {}", name, e),
    }
    client
        .create_collection(&ctx, name, &CollectionSchema::person())
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn live_person_lifecycle() {
    let client = live_client();
    let ctx = RequestContext::background();
    let collection = "docstore-test-lifecycle";
    fresh_collection(&client, collection).await;

    client.ping(&ctx).await.unwrap();

    client
        .upsert_record(&ctx, collection, &Person::new("p1001", "张三"))
        .await
        .unwrap();
    let fetched: Option<Person> = client.get_record(&ctx, collection, "p1001").await.unwrap();
    assert_eq!(fetched, Some(Person::new("p1001", "张三")));

    client
        .patch_record(&ctx, collection, "p1001", &FieldChanges::new().set("name", "张三三"))
        .await
        .unwrap();
    let fetched: Option<Person> = client.get_record(&ctx, collection, "p1001").await.unwrap();
    assert_eq!(fetched, Some(Person::new("p1001", "张三三")));

    client.delete_record(&ctx, collection, "p1001").await.unwrap();
    let fetched: Option<Person> = client.get_record(&ctx, collection, "p1001").await.unwrap();
    assert!(fetched.is_none());

    let again = client.delete_record(&ctx, collection, "p1001").await;
    assert!(again.unwrap_err().is_record_not_found());

    client.delete_collection(&ctx, collection).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn live_create_twice_conflicts() {
    let client = live_client();
    let ctx = RequestContext::background();
    let collection = "docstore-test-conflict";
    fresh_collection(&client, collection).await;

    let second = client
        .create_collection(&ctx, collection, &CollectionSchema::person())
        .await;
    assert!(matches!(second, Err(DocumentStoreError::CollectionExists(_))));

    client.delete_collection(&ctx, collection).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn live_batch_search_and_scan() {
    let client = live_client();
    let ctx = RequestContext::background();
    let collection = "docstore-test-batch";
    fresh_collection(&client, collection).await;

    let people = vec![
        Person::new("p1001", "张三"),
        Person::new("p1002", "李四"),
        Person::new("", "无名"),
        Person::new("p1003", "王五"),
    ];
    let summary = client
        .upsert_records_batch(&ctx, collection, &people)
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures().next().unwrap().position, 2);

    let found: Vec<Person> = client
        .search_by_text(&ctx, collection, "name", "张")
        .await
        .unwrap();
    assert_eq!(found, vec![Person::new("p1001", "张三")]);

    let listed: Vec<Person> = client
        .list_all(&ctx, collection, 2)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);

    client.delete_collection(&ctx, collection).await.unwrap();
}
