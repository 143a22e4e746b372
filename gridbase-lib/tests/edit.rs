mod common;

use gridbase_lib::error::Error;
use gridbase_lib::model::ColumnType;
use gridbase_lib::model::Table;
use gridbase_lib::store::TableStore;
use uuid::Uuid;

use common::collect_all_rows;
use common::seeded_client;

#[tokio::test]
async fn update_changes_only_the_target_cell() {
    let (client, table_id, columns) = seeded_client(5).await;

    // Give every cell a known value first.
    let rows = collect_all_rows(&client, table_id, 100).await;
    for (i, row) in rows.iter().enumerate() {
        for (j, column) in columns.iter().enumerate() {
            client
                .update_cell(row.id(), column.id, format!("r{i}c{j}"))
                .await
                .unwrap();
        }
    }

    let before = collect_all_rows(&client, table_id, 100).await;
    let target_row = before[2].id();
    let target_column = columns[1].id;

    let updated = client
        .update_cell(target_row, target_column, "edited")
        .await
        .expect("update");
    assert_eq!(updated.value, "edited");

    let after = collect_all_rows(&client, table_id, 100).await;
    for (row_before, row_after) in before.iter().zip(&after) {
        for column in &columns {
            let expected = if row_before.id() == target_row && column.id == target_column {
                "edited"
            } else {
                row_before.value_for(column.id)
            };
            assert_eq!(row_after.value_for(column.id), expected);
        }
    }
}

#[tokio::test]
async fn update_upserts_a_missing_cell() {
    let (client, table_id, _) = seeded_client(3).await;

    let notes = client
        .add_column(table_id, "Notes", ColumnType::Text)
        .await
        .expect("add column");

    // Existing rows have no cell for the new column yet.
    let rows = collect_all_rows(&client, table_id, 100).await;
    assert!(rows.iter().all(|r| r.cell(notes.id).is_none()));
    assert!(rows.iter().all(|r| r.value_for(notes.id).is_empty()));

    client
        .update_cell(rows[0].id(), notes.id, "hello")
        .await
        .expect("upsert creates the missing cell");

    let rows = collect_all_rows(&client, table_id, 100).await;
    assert_eq!(rows[0].value_for(notes.id), "hello");
    assert!(rows[1..].iter().all(|r| r.value_for(notes.id).is_empty()));
}

#[tokio::test]
async fn unresolved_ids_are_not_found() {
    let (client, table_id, columns) = seeded_client(2).await;
    let rows = collect_all_rows(&client, table_id, 100).await;

    let err = client
        .update_cell(Uuid::new_v4(), columns[0].id, "x")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");

    let err = client
        .update_cell(rows[0].id(), Uuid::new_v4(), "x")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");

    // A column of a different table does not resolve for this row.
    let other = Table::new(Uuid::new_v4(), "Other");
    let other_id = other.id;
    client.store().create_table(other).await.unwrap();
    let foreign = client
        .add_column(other_id, "Name", ColumnType::Text)
        .await
        .unwrap();
    let err = client
        .update_cell(rows[0].id(), foreign.id, "x")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn edit_invalidates_cached_pages() {
    let (client, table_id, columns) = seeded_client(3).await;
    let rows = collect_all_rows(&client, table_id, 100).await;

    assert!(client.pages(table_id).fetch().await.unwrap().cache.is_miss());
    assert!(client.pages(table_id).fetch().await.unwrap().cache.is_hit());

    client
        .update_cell(rows[1].id(), columns[0].id, "fresh value")
        .await
        .unwrap();

    let after = client.pages(table_id).fetch().await.unwrap();
    assert!(after.cache.is_miss(), "the edit invalidated the page");
    let row = after
        .data()
        .rows()
        .iter()
        .find(|r| r.id() == rows[1].id())
        .unwrap();
    assert_eq!(
        row.value_for(columns[0].id),
        "fresh value",
        "stale data is never served after a successful edit"
    );
}

#[tokio::test]
async fn add_column_appends_in_creation_order_and_invalidates() {
    let (client, table_id, columns) = seeded_client(2).await;

    assert!(client.pages(table_id).fetch().await.unwrap().cache.is_miss());
    assert!(client.pages(table_id).fetch().await.unwrap().cache.is_hit());

    client
        .add_column(table_id, "Notes", ColumnType::Text)
        .await
        .unwrap();
    client
        .add_column(table_id, "Score", ColumnType::Number)
        .await
        .unwrap();

    let names: Vec<String> = client
        .list_columns(table_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Name", "Age", "Email", "Notes", "Score"]);
    assert_eq!(columns.len(), 3, "original column set is untouched");

    assert!(
        client.pages(table_id).fetch().await.unwrap().cache.is_miss(),
        "the row shape changed, so cached pages were dropped"
    );
}

#[tokio::test]
async fn blank_column_names_fail_validation() {
    let (client, table_id, _) = seeded_client(1).await;

    let err = client
        .add_column(table_id, "  ", ColumnType::Text)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
}
