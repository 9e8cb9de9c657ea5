//! PostgreSQL-backed inventory store.
//!
//! Owns the connection pool, creates the schema on startup and maps joined rows into
//! [`InventoryItem`]s. Updates run as a single transaction that locks the item row before the
//! status is recomputed.

use crate::domain::{
    Catalog, CatalogEntry, DashboardStats, InventoryItem, ItemChanges, ItemStatus, NewItem,
    RawTable,
};
use crate::storage::store::{InventoryStore, StoreError, StoreResult, UpdatePlan};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const ITEM_SELECT: &str = "SELECT
        ii.id,
        it.name AS item_type,
        ii.item_type_id,
        ii.item_variant,
        ii.stock::DOUBLE PRECISION AS stock,
        su.name AS stock_unit,
        ii.stock_unit_id,
        sp.name AS supplier,
        ii.supplier_id,
        ii.reorder_point,
        ii.status,
        ii.updated_at
    FROM inventory_items ii
    LEFT JOIN item_types it ON it.id = ii.item_type_id
    LEFT JOIN stock_units su ON su.id = ii.stock_unit_id
    LEFT JOIN suppliers sp ON sp.id = ii.supplier_id";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS item_types (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS stock_units (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS suppliers (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS inventory_items (
        id SERIAL PRIMARY KEY,
        item_type_id INTEGER NOT NULL REFERENCES item_types(id),
        item_variant TEXT NOT NULL,
        stock DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (stock >= 0),
        stock_unit_id INTEGER NOT NULL REFERENCES stock_units(id),
        supplier_id INTEGER NOT NULL REFERENCES suppliers(id),
        reorder_point INTEGER CHECK (reorder_point >= 0),
        status TEXT NOT NULL DEFAULT 'Available',
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    // Databases created before reorder points and audit timestamps existed.
    "ALTER TABLE inventory_items ADD COLUMN IF NOT EXISTS reorder_point INTEGER",
    "ALTER TABLE inventory_items ADD COLUMN IF NOT EXISTS updated_at TIMESTAMPTZ NOT NULL DEFAULT now()",
];

#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Connects a new pool. The schema is not touched; call [`Self::ensure_schema`].
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "connected to database");
        Ok(Self { pool })
    }

    /// Creates the catalog and inventory tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("inventory schema ready");
        Ok(())
    }

    /// Inserts the default catalog rows into every catalog table that is still empty.
    pub async fn seed_catalogs(&self) -> StoreResult<()> {
        for catalog in Catalog::ALL {
            let table = catalog.table_name();
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&self.pool)
                .await?;
            if count > 0 {
                continue;
            }
            for name in catalog.default_entries() {
                sqlx::query(&format!(
                    "INSERT INTO {} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
                    table
                ))
                .bind(*name)
                .execute(&self.pool)
                .await?;
            }
            tracing::info!(table, "seeded empty catalog");
        }
        Ok(())
    }

    async fn fetch_item<'e, E>(executor: E, id: i32) -> StoreResult<Option<InventoryItem>>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} WHERE ii.id = $1", ITEM_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
        row.as_ref().map(item_from_row).transpose()
    }
}

fn item_from_row(row: &PgRow) -> StoreResult<InventoryItem> {
    let status_raw: String = row.try_get("status")?;
    let status: ItemStatus = status_raw
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("{}", e)))?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(InventoryItem {
        id: row.try_get("id")?,
        item_type: row.try_get("item_type")?,
        item_type_id: row.try_get("item_type_id")?,
        item_variant: row.try_get("item_variant")?,
        stock: row.try_get("stock")?,
        stock_unit: row.try_get("stock_unit")?,
        stock_unit_id: row.try_get("stock_unit_id")?,
        supplier: row.try_get("supplier")?,
        supplier_id: row.try_get("supplier_id")?,
        reorder_point: row.try_get("reorder_point")?,
        status,
        updated_at,
    })
}

fn push_changes(qb: &mut QueryBuilder<'_, Postgres>, changes: &ItemChanges) {
    if let Some(v) = changes.item_type_id {
        qb.push(", item_type_id = ").push_bind(v);
    }
    if let Some(v) = &changes.item_variant {
        qb.push(", item_variant = ").push_bind(v.clone());
    }
    if let Some(v) = changes.stock {
        qb.push(", stock = ").push_bind(v);
    }
    if let Some(v) = changes.stock_unit_id {
        qb.push(", stock_unit_id = ").push_bind(v);
    }
    if let Some(v) = changes.supplier_id {
        qb.push(", supplier_id = ").push_bind(v);
    }
    if let Some(v) = changes.reorder_point {
        qb.push(", reorder_point = ").push_bind(v);
    }
    if let Some(v) = changes.status {
        qb.push(", status = ").push_bind(v.as_str());
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    fn diagnostic_hint(&self) -> &'static str {
        "Database URL is set"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        let sql = format!("{} ORDER BY ii.id", ITEM_SELECT);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn get_item(&self, id: i32) -> StoreResult<Option<InventoryItem>> {
        Self::fetch_item(&self.pool, id).await
    }

    async fn insert_item(&self, item: &NewItem) -> StoreResult<InventoryItem> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO inventory_items
                (item_type_id, item_variant, stock, stock_unit_id, supplier_id, reorder_point, status, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, now())
             RETURNING id",
        )
        .bind(item.item_type_id)
        .bind(&item.item_variant)
        .bind(item.stock)
        .bind(item.stock_unit_id)
        .bind(item.supplier_id)
        .bind(item.reorder_point)
        .bind(item.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let created = Self::fetch_item(&mut *tx, id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("inserted item {} vanished", id)))?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_item_with(&self, id: i32, plan: UpdatePlan) -> StoreResult<Option<InventoryItem>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE ii.id = $1 FOR UPDATE OF ii", ITEM_SELECT);
        let current = match sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await? {
            Some(row) => item_from_row(&row)?,
            None => return Ok(None),
        };

        let changes = plan(&current);
        if changes.is_empty() {
            tx.commit().await?;
            return Ok(Some(current));
        }

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE inventory_items SET updated_at = now()");
        push_changes(&mut qb, &changes);
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&mut *tx).await?;

        let updated = Self::fetch_item(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_item(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_catalog(&self, catalog: Catalog) -> StoreResult<Vec<CatalogEntry>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name", catalog.table_name());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(CatalogEntry {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            });
        }
        Ok(entries)
    }

    async fn dashboard_stats(&self, low_stock_fallback: f64) -> StoreResult<DashboardStats> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) FILTER (WHERE status <> 'Phased Out') AS total_items,
                COUNT(*) FILTER (
                    WHERE status <> 'Phased Out'
                      AND CASE
                            WHEN reorder_point IS NULL THEN stock < $1
                            ELSE stock <= reorder_point
                          END
                ) AS low_stock,
                COALESCE(SUM(stock) FILTER (WHERE status <> 'Phased Out'), 0)::DOUBLE PRECISION AS total_stock,
                COUNT(*) FILTER (WHERE status = 'Phased Out') AS phased_out
             FROM inventory_items",
        )
        .bind(low_stock_fallback)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_items: row.try_get("total_items")?,
            low_stock: row.try_get("low_stock")?,
            total_stock: row.try_get("total_stock")?,
            phased_out: row.try_get("phased_out")?,
        })
    }

    async fn raw_table(&self, table: RawTable) -> StoreResult<Vec<JsonValue>> {
        let sql = format!(
            "SELECT row_to_json(t.*) AS record FROM {} t ORDER BY t.id",
            table.table_name()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.try_get::<JsonValue, _>("record")?);
        }
        Ok(records)
    }
}
