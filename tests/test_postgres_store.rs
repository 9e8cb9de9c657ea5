//! Postgres store round trip. Needs a reachable `DATABASE_URL`; skipped otherwise.

use operix_inventory::domain::{Catalog, InventoryItem, ItemChanges, ItemStatus, NewItem, RawTable};
use operix_inventory::storage::{InventoryStore, PostgresInventoryStore};
use std::env;

async fn connect() -> Option<PostgresInventoryStore> {
    dotenv::dotenv().ok();
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres store test");
        return None;
    };
    let store = PostgresInventoryStore::connect(&url, 2).await.unwrap();
    store.ensure_schema().await.unwrap();
    store.seed_catalogs().await.unwrap();
    Some(store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_postgres_item_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let Some(store) = connect().await else {
        return Ok(());
    };
    store.ping().await?;

    let item_type = store.list_catalog(Catalog::ItemTypes).await?[0].id;
    let unit = store.list_catalog(Catalog::StockUnits).await?[0].id;
    let supplier = store.list_catalog(Catalog::Suppliers).await?[0].id;

    let variant = format!("pg-lifecycle-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
    let created = store
        .insert_item(&NewItem {
            item_type_id: item_type,
            item_variant: variant.clone(),
            stock: 12.5,
            stock_unit_id: unit,
            supplier_id: supplier,
            reorder_point: Some(4),
            status: ItemStatus::Available,
        })
        .await?;
    assert_eq!(created.item_variant, variant);
    assert!(created.item_type.is_some());

    let updated = store
        .update_item_with(
            created.id,
            Box::new(|current: &InventoryItem| ItemChanges {
                stock: Some(current.stock - 10.0),
                status: Some(ItemStatus::LowStock),
                ..ItemChanges::default()
            }),
        )
        .await?
        .expect("item exists");
    assert_eq!(updated.stock, 2.5);
    assert_eq!(updated.status, ItemStatus::LowStock);

    let cleared = store
        .update_item_with(
            created.id,
            Box::new(|_: &InventoryItem| ItemChanges {
                reorder_point: Some(None),
                ..ItemChanges::default()
            }),
        )
        .await?
        .expect("item exists");
    assert_eq!(cleared.reorder_point, None);

    let raw = store.raw_table(RawTable::InventoryItems).await?;
    assert!(raw.iter().any(|row| row["item_variant"] == variant.as_str()));

    let stats = store.dashboard_stats(10.0).await?;
    assert!(stats.total_items >= 1);

    assert!(store.delete_item(created.id).await?);
    assert!(store.get_item(created.id).await?.is_none());
    assert!(store.update_item_with(created.id, Box::new(|_: &InventoryItem| ItemChanges::default())).await?.is_none());
    Ok(())
}
