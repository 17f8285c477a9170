// region:    --- Imports
use super::entity::{Auction, AuctionStatus};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Filter & Outcome
/// 경매 목록 조회 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionFilter {
    pub status: AuctionStatus,
    /// 정확히 일치
    pub category: Option<String>,
    /// 대소문자 구분 없는 부분 일치
    pub product_name: Option<String>,
}

impl AuctionFilter {
    pub fn by_status(status: AuctionStatus) -> Self {
        Self {
            status,
            category: None,
            product_name: None,
        }
    }

    pub fn matches(&self, auction: &Auction) -> bool {
        if auction.status() != self.status {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if auction.category() != category {
                return false;
            }
        }
        if let Some(product_name) = self.product_name.as_deref() {
            if !auction
                .product_name()
                .to_lowercase()
                .contains(&product_name.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// 종료 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// ACTIVE -> COMPLETED 전이 완료
    Closed,
    /// 레코드는 있지만 이미 종료되어 변경 없음
    AlreadyCompleted,
}

// endregion: --- Filter & Outcome

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트
/// mark_completed 는 status 를 변경하는 유일한 경로이며 ACTIVE 인 경우에만 원자적으로 전이한다.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn create(&self, auction: &Auction) -> Result<(), StoreError>;

    async fn find_by_filter(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Auction, StoreError>;

    /// status == ACTIVE 이고 end_time <= now 인 경매. 순서는 보장하지 않는다.
    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, StoreError>;

    async fn mark_completed(&self, id: &str) -> Result<CloseOutcome, StoreError>;
}

// endregion: --- Auction Store Trait
