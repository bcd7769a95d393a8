//! Database Service
//!
//! Owns the embedded SurrealDB instance and runs the schema setup on
//! startup. Repositories clone the handle; SurrealDB connections are
//! cheap to clone.

pub mod models;
pub mod query;
pub mod repository;

use std::path::Path;

use anyhow::Context;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "storefront";

// The order table is called `orders`: `order` collides with the
// ORDER BY keyword in generated SurrealQL.
pub const CATEGORY_TABLE: &str = "category";
pub const PRODUCT_TABLE: &str = "product";
pub const ADDRESS_TABLE: &str = "address";
pub const ORDER_TABLE: &str = "orders";
pub const ORDER_ITEM_TABLE: &str = "order_item";
pub const USER_TABLE: &str = "user";

/// Random record key, always ident-safe.
///
/// Keys that start with a digit would be rendered in the escaped
/// `⟨...⟩` form by [`surrealdb::RecordId::to_string`], which does not
/// survive a round trip through a URL path. The letter prefix keeps
/// every generated id in plain `table:key` form.
pub fn new_record_key() -> String {
    format!("r{}", uuid::Uuid::new_v4().simple())
}

#[derive(Clone)]
pub struct DbService {
    db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `path`
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Self::init(db).await
    }

    /// Open an in-memory database, used by tests
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let db = Surreal::new::<Mem>(())
            .await
            .context("failed to open in-memory database")?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> anyhow::Result<Self> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .context("failed to select namespace")?;

        db.query(format!(
            "DEFINE INDEX IF NOT EXISTS uniq_category_slug ON TABLE {CATEGORY_TABLE} FIELDS slug UNIQUE"
        ))
        .query(format!(
            "DEFINE INDEX IF NOT EXISTS uniq_order_tracking ON TABLE {ORDER_TABLE} FIELDS tracking_number UNIQUE"
        ))
        .query(format!(
            "DEFINE INDEX IF NOT EXISTS uniq_user_email ON TABLE {USER_TABLE} FIELDS email UNIQUE"
        ))
        .await
        .context("failed to define indexes")?;

        tracing::info!("database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }

    pub fn client(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
