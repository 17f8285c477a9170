// region:    --- Imports
use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- User
/// 사용자 (읽기 전용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// 사용자 조회 트레이트
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> Result<User, StoreError>;
}

// endregion: --- User
