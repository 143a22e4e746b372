#![allow(dead_code)]

use gridbase_lib::model::Column;
use gridbase_lib::model::ColumnType;
use gridbase_lib::model::RowData;
use gridbase_lib::model::Table;
use gridbase_lib::store::MemoryStore;
use gridbase_lib::store::TableStore;
use gridbase_lib::GridClient;
use uuid::Uuid;

/// Creates a table with the reference column set: Name (TEXT), Age
/// (NUMBER), Email (TEXT).
pub async fn create_people_table(store: &dyn TableStore) -> (Uuid, Vec<Column>) {
    let table = Table::new(Uuid::new_v4(), "People");
    let table_id = table.id;
    store.create_table(table).await.expect("create table");

    let mut columns = Vec::new();
    for (name, column_type) in [
        ("Name", ColumnType::Text),
        ("Age", ColumnType::Number),
        ("Email", ColumnType::Text),
    ] {
        let column = Column::new(table_id, name, column_type);
        store.insert_column(column.clone()).await.expect("insert column");
        columns.push(column);
    }
    (table_id, columns)
}

/// A client over a fresh in-memory store holding one People table with
/// `row_count` bare rows.
pub async fn seeded_client(row_count: usize) -> (GridClient, Uuid, Vec<Column>) {
    let store = MemoryStore::new();
    let (table_id, columns) = create_people_table(&store).await;
    if row_count > 0 {
        store.insert_rows(table_id, row_count).await.expect("insert rows");
    }
    let client = GridClient::builder().store(store).build();
    (client, table_id, columns)
}

/// The table's rows in total order, straight from the store.
pub async fn ground_truth(client: &GridClient, table_id: Uuid) -> Vec<RowData> {
    client
        .store()
        .list_rows(table_id, None, 1_000_000, None)
        .await
        .expect("list rows")
}

/// Collects every row by chaining pages of the given size, bypassing the
/// page cache.
pub async fn collect_all_rows(client: &GridClient, table_id: Uuid, limit: usize) -> Vec<RowData> {
    let mut pages = client
        .pages(table_id)
        .limit(limit)
        .bypass_cache()
        .into_pages();
    let mut rows = Vec::new();
    while let Some(page) = pages.next().await {
        rows.extend(page.expect("page fetch").into_rows());
    }
    rows
}
