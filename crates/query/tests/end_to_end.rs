//! End-to-end: records written to the store, change events projected into the
//! index, then read back through the gateway.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use common::Meow;
use event_feed::{ChangeEvent, ChannelFeed};
use meow_store::InMemoryMeowStore;
use projections::{MeowProjector, ProjectionProcessor};
use query::{Envelope, ListParams, QueryGateway, SearchParams, Status};
use search_index::InMemorySearchIndex;

fn meow(id: &str, body: &str, minute: i64) -> Meow {
    let base = Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap();
    Meow::new(id, body, base + Duration::minutes(minute))
}

async fn seeded_gateway() -> QueryGateway {
    let index = Arc::new(InMemorySearchIndex::new());
    let store = Arc::new(InMemoryMeowStore::new());
    let processor = ProjectionProcessor::new(Arc::new(MeowProjector::new(index.clone())));
    let (publisher, feed) = ChannelFeed::new(8);

    let records = [
        meow("a", "sunbeam on the carpet", 1),
        meow("b", "relevant text matching b and nothing else", 2),
        meow("c", "the red dot escaped again", 3),
    ];
    for record in records {
        store.insert(record.clone()).await;
        publisher.publish(ChangeEvent::created(record)).await.unwrap();
    }
    drop(publisher);

    let stats = processor.run_feed(&feed).await.unwrap();
    assert_eq!(stats.applied, 3);

    QueryGateway::new(index, store)
}

fn ids(envelope: Envelope<Vec<Meow>>) -> Vec<String> {
    match envelope {
        Envelope::Ok(meows) => meows.into_iter().map(|m| m.id.to_string()).collect(),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_ranks_best_match_first() {
    let gateway = seeded_gateway().await;

    let envelope = gateway
        .handle_search(&SearchParams {
            query: Some("relevant text matching b".into()),
            ..SearchParams::default()
        })
        .await;

    assert_eq!(ids(envelope).first().map(String::as_str), Some("b"));
}

#[tokio::test]
async fn test_list_returns_oldest_first() {
    let gateway = seeded_gateway().await;

    let envelope = gateway
        .handle_list(&ListParams {
            skip: Some("0".into()),
            take: Some("2".into()),
        })
        .await;
    assert_eq!(ids(envelope), vec!["a", "b"]);

    let envelope = gateway
        .handle_list(&ListParams {
            skip: Some("2".into()),
            take: None,
        })
        .await;
    assert_eq!(ids(envelope), vec!["c"]);
}

#[tokio::test]
async fn test_client_errors_are_bad_requests() {
    let gateway = seeded_gateway().await;

    let missing = gateway.handle_search(&SearchParams::default()).await;
    assert!(matches!(
        missing,
        Envelope::Error {
            status: Status::BadRequest,
            ..
        }
    ));

    let bad_take = gateway
        .handle_list(&ListParams {
            skip: None,
            take: Some("lots".into()),
        })
        .await;
    assert_eq!(bad_take, Envelope::bad_request("Invalid take parameter"));
}
