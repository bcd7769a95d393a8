//! Server state
//!
//! Shared application state handed to every handler. Repositories are
//! cheap clones over the same embedded database connection.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    BaseRepository, CategoryRepository, OrderRepository, ProductRepository, UserRepository,
};
use crate::services::{FsMediaStore, MediaStore};

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub media: Arc<dyn MediaStore>,
    pub jwt_service: Arc<JwtService>,
    pub categories: CategoryRepository,
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub users: UserRepository,
}

impl ServerState {
    pub fn new(config: Config, db: DbService, media: Arc<dyn MediaStore>) -> Self {
        let jwt_service = Arc::new(JwtService::new(&config.jwt_secret));
        let base = BaseRepository::new(db.client());
        Self {
            config: Arc::new(config),
            media,
            jwt_service,
            categories: CategoryRepository::new(base.clone()),
            products: ProductRepository::new(base.clone()),
            orders: OrderRepository::new(base.clone()),
            users: UserRepository::new(base),
            db,
        }
    }

    /// Open the persistent database and filesystem media store
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        config.ensure_dirs()?;
        let db = DbService::open(&config.database_dir()).await?;
        let media = Arc::new(FsMediaStore::new(config.uploads_dir(), config.uploads_url()));
        Ok(Self::new(config, db, media))
    }
}
