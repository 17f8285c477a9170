// region:    --- Imports
use super::queries;
use super::DatabaseManager;
use crate::error::StoreError;
use crate::user::{User, UserStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Postgres User Store
pub struct PgUserStore {
    db_manager: Arc<DatabaseManager>,
}

impl PgUserStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user_by_id(&self, id: &str) -> Result<User, StoreError> {
        info!("{:<12} --> 사용자 조회 id: {}", "Store", id);
        sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or_else(|| StoreError::user_not_found(id))
    }
}

// endregion: --- Postgres User Store
