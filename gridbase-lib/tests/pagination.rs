mod common;

use std::collections::HashSet;

use futures::StreamExt;
use gridbase_lib::api::query::MAX_PAGE_LIMIT;
use gridbase_lib::error::Error;
use gridbase_lib::model::Table;
use gridbase_lib::store::TableStore;
use gridbase_lib::CacheStatus;
use uuid::Uuid;

use common::collect_all_rows;
use common::ground_truth;
use common::seeded_client;

#[tokio::test]
async fn cursor_chain_visits_every_row_exactly_once_in_order() {
    let (client, table_id, _) = seeded_client(25).await;
    let expected: Vec<Uuid> = ground_truth(&client, table_id)
        .await
        .iter()
        .map(|r| r.id())
        .collect();

    let mut collected = Vec::new();
    let mut cursor = None;
    let mut page_count = 0;
    loop {
        let mut query = client.pages(table_id).limit(4);
        if let Some(cursor) = cursor {
            query = query.cursor(cursor);
        }
        let page = query.fetch().await.expect("page fetch").into_inner();
        assert!(page.len() <= 4);
        collected.extend(page.rows().iter().map(|r| r.id()));
        page_count += 1;

        match page.next_cursor() {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(collected, expected, "chain yields the table in total order");
    assert_eq!(
        collected.iter().collect::<HashSet<_>>().len(),
        25,
        "no row is yielded twice"
    );
    assert_eq!(page_count, 7, "6 full pages and a final partial one");
}

#[tokio::test]
async fn exact_fit_has_no_phantom_extra_page() {
    let (client, table_id, _) = seeded_client(100).await;

    let page = client
        .pages(table_id)
        .limit(100)
        .fetch()
        .await
        .expect("page fetch")
        .into_inner();

    assert_eq!(page.len(), 100);
    assert_eq!(page.next_cursor(), None, "exact fit means no next page");
}

#[tokio::test]
async fn one_extra_row_yields_the_boundary_cursor() {
    let (client, table_id, _) = seeded_client(101).await;
    let expected: Vec<Uuid> = ground_truth(&client, table_id)
        .await
        .iter()
        .map(|r| r.id())
        .collect();

    let first = client
        .pages(table_id)
        .limit(100)
        .fetch()
        .await
        .expect("page fetch")
        .into_inner();
    assert_eq!(first.len(), 100);
    assert_eq!(
        first.next_cursor(),
        Some(expected[100]),
        "cursor names the 101st row"
    );

    let second = client
        .pages(table_id)
        .limit(100)
        .cursor(first.next_cursor().unwrap())
        .fetch()
        .await
        .expect("page fetch")
        .into_inner();
    assert_eq!(second.len(), 1);
    assert_eq!(second.next_cursor(), None);
}

#[tokio::test]
async fn identical_fetches_are_idempotent_and_cached() {
    let (client, table_id, _) = seeded_client(30).await;

    let first = client.pages(table_id).limit(10).fetch().await.unwrap();
    let second = client.pages(table_id).limit(10).fetch().await.unwrap();

    assert!(first.cache.is_miss());
    assert!(second.cache.is_hit());
    assert_eq!(first.data(), second.data(), "identical request, identical page");

    let bypassed = client
        .pages(table_id)
        .limit(10)
        .bypass_cache()
        .fetch()
        .await
        .unwrap();
    assert_eq!(bypassed.cache, CacheStatus::None);
    assert_eq!(bypassed.data(), first.data());
}

#[tokio::test]
async fn out_of_range_limits_fail_validation() {
    let (client, table_id, _) = seeded_client(5).await;

    let err = client.pages(table_id).limit(0).fetch().await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");

    let err = client
        .pages(table_id)
        .limit(MAX_PAGE_LIMIT + 1)
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");

    let page = client
        .pages(table_id)
        .limit(MAX_PAGE_LIMIT)
        .fetch()
        .await
        .expect("the maximum itself is accepted")
        .into_inner();
    assert_eq!(page.len(), 5);
}

#[tokio::test]
async fn unknown_table_and_foreign_cursor_are_not_found() {
    let (client, table_id, _) = seeded_client(5).await;

    let err = client.pages(Uuid::new_v4()).fetch().await.unwrap_err();
    assert!(err.is_not_found(), "{err}");

    // A cursor naming a row of another table does not resolve.
    let other = Table::new(Uuid::new_v4(), "Other");
    let other_id = other.id;
    client.store().create_table(other).await.unwrap();
    client.store().insert_rows(other_id, 1).await.unwrap();
    let foreign_row = client.store().recent_row_ids(other_id, 1).await.unwrap()[0];

    let err = client
        .pages(table_id)
        .cursor(foreign_row)
        .fetch()
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn row_stream_flattens_the_page_chain() {
    let (client, table_id, _) = seeded_client(25).await;
    let expected: Vec<Uuid> = ground_truth(&client, table_id)
        .await
        .iter()
        .map(|r| r.id())
        .collect();

    let stream = client.pages(table_id).limit(10).into_row_stream();
    futures::pin_mut!(stream);

    let mut streamed = Vec::new();
    while let Some(row) = stream.next().await {
        streamed.push(row.expect("stream row").id());
    }
    assert_eq!(streamed, expected);
}

#[tokio::test]
async fn pages_serialize_for_the_ui_boundary() {
    let (client, table_id, columns) = seeded_client(2).await;
    let rows = collect_all_rows(&client, table_id, 10).await;
    client
        .update_cell(rows[0].id(), columns[0].id, "Grace Hopper")
        .await
        .unwrap();

    let page = client
        .pages(table_id)
        .limit(10)
        .fetch()
        .await
        .unwrap()
        .into_inner();
    let json = serde_json::to_value(&page).expect("page serializes");

    assert_eq!(json["next_cursor"], serde_json::Value::Null);
    let first = &json["rows"][0];
    assert_eq!(
        first["row"]["id"].as_str().unwrap(),
        rows[0].id().to_string()
    );
    assert_eq!(
        first["cells"][columns[0].id.to_string()]["value"],
        "Grace Hopper"
    );
}
