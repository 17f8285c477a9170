/// 메모리 기반 저장소
/// 테스트와 로컬 실행용. 하나의 쓰기 락 안에서 확인과 변경을 함께 수행해 종료 전이를 원자적으로 처리한다.
// region:    --- Imports
use crate::auction::{Auction, AuctionFilter, AuctionStore, CloseOutcome};
use crate::error::StoreError;
use crate::user::{User, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- In-Memory Auction Store
#[derive(Debug, Default)]
pub struct InMemoryAuctionStore {
    auctions: RwLock<HashMap<String, Auction>>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for InMemoryAuctionStore {
    async fn create(&self, auction: &Auction) -> Result<(), StoreError> {
        let mut auctions = self.auctions.write().await;
        if auctions.contains_key(auction.id()) {
            return Err(StoreError::Unavailable(format!(
                "duplicate auction id: {}",
                auction.id()
            )));
        }
        auctions.insert(auction.id().to_string(), auction.clone());
        debug!("{:<12} --> 경매 저장 id: {}", "Store", auction.id());
        Ok(())
    }

    async fn find_by_filter(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, StoreError> {
        let auctions = self.auctions.read().await;
        let mut found: Vec<Auction> = auctions
            .values()
            .filter(|auction| filter.matches(auction))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(found)
    }

    async fn find_by_id(&self, id: &str) -> Result<Auction, StoreError> {
        self.auctions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::auction_not_found(id))
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, StoreError> {
        let auctions = self.auctions.read().await;
        Ok(auctions
            .values()
            .filter(|auction| auction.is_expired_at(now))
            .cloned()
            .collect())
    }

    async fn mark_completed(&self, id: &str) -> Result<CloseOutcome, StoreError> {
        let mut auctions = self.auctions.write().await;
        let auction = auctions
            .get_mut(id)
            .ok_or_else(|| StoreError::auction_not_found(id))?;

        if auction.complete() {
            info!("{:<12} --> 경매 종료 처리 id: {}", "Store", id);
            Ok(CloseOutcome::Closed)
        } else {
            Ok(CloseOutcome::AlreadyCompleted)
        }
    }
}

// endregion: --- In-Memory Auction Store

// region:    --- In-Memory User Store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(
                users
                    .into_iter()
                    .map(|user| (user.id.clone(), user))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user_by_id(&self, id: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(id))
    }
}

// endregion: --- In-Memory User Store
