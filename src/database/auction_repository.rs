// region:    --- Imports
use super::queries;
use super::DatabaseManager;
use crate::auction::{
    Auction, AuctionFilter, AuctionStatus, AuctionStore, CloseOutcome, ProductCondition,
};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Auction Row
/// auctions 테이블 레코드. 상태와 상품 상태는 정수 코드, 시각은 epoch 초로 저장한다.
#[derive(Debug, sqlx::FromRow)]
struct AuctionRow {
    id: String,
    product_name: String,
    category: String,
    description: String,
    condition: i16,
    status: i16,
    created_at: i64,
    end_time: i64,
}

impl TryFrom<AuctionRow> for Auction {
    type Error = StoreError;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        let invalid = |e: crate::error::ValidationError| {
            StoreError::InvalidRecord(format!("auction {}: {}", row.id, e))
        };
        let condition = ProductCondition::try_from(row.condition).map_err(invalid)?;
        let status = AuctionStatus::try_from(row.status).map_err(invalid)?;
        let created_at = from_epoch(&row.id, row.created_at)?;
        let end_time = from_epoch(&row.id, row.end_time)?;

        Ok(Auction::restore(
            row.id,
            row.product_name,
            row.category,
            row.description,
            condition,
            status,
            created_at,
            end_time,
        ))
    }
}

impl From<&Auction> for AuctionRow {
    fn from(auction: &Auction) -> Self {
        Self {
            id: auction.id().to_string(),
            product_name: auction.product_name().to_string(),
            category: auction.category().to_string(),
            description: auction.description().to_string(),
            condition: auction.condition().code(),
            status: auction.status().code(),
            created_at: auction.created_at().timestamp(),
            end_time: epoch_ceil(auction.end_time()),
        }
    }
}

/// 종료 시각은 초 단위로 올림해서 저장한다.
/// 내림하면 created_at 과 같은 초가 되거나 실제 종료 전에 만료로 조회될 수 있다.
fn epoch_ceil(at: DateTime<Utc>) -> i64 {
    if at.timestamp_subsec_nanos() > 0 {
        at.timestamp() + 1
    } else {
        at.timestamp()
    }
}

/// 복원할 수 없는 레코드는 로그만 남기고 건너뛴다.
fn decode_rows(rows: Vec<AuctionRow>) -> Vec<Auction> {
    rows.into_iter()
        .filter_map(|row| match Auction::try_from(row) {
            Ok(auction) => Some(auction),
            Err(e) => {
                error!("{:<12} --> 경매 레코드 복원 실패, 건너뜀: {}", "Store", e);
                None
            }
        })
        .collect()
}

fn from_epoch(id: &str, seconds: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        StoreError::InvalidRecord(format!("auction {id}: timestamp out of range: {seconds}"))
    })
}

/// ILIKE 패턴 문자 이스케이프
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// endregion: --- Auction Row

// region:    --- Postgres Auction Store
pub struct PgAuctionStore {
    db_manager: Arc<DatabaseManager>,
}

impl PgAuctionStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn create(&self, auction: &Auction) -> Result<(), StoreError> {
        let row = AuctionRow::from(auction);
        sqlx::query(queries::INSERT_AUCTION)
            .bind(&row.id)
            .bind(&row.product_name)
            .bind(&row.category)
            .bind(&row.description)
            .bind(row.condition)
            .bind(row.status)
            .bind(row.created_at)
            .bind(row.end_time)
            .execute(self.db_manager.pool())
            .await
            .map_err(|e| {
                error!("{:<12} --> 경매 저장 실패 id: {}: {:?}", "Store", auction.id(), e);
                StoreError::from(e)
            })?;

        info!("{:<12} --> 경매 저장 id: {}", "Store", auction.id());
        Ok(())
    }

    async fn find_by_filter(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, StoreError> {
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_AUCTIONS)
            .bind(filter.status.code())
            .bind(filter.category.as_deref())
            .bind(filter.product_name.as_deref().map(escape_like))
            .fetch_all(self.db_manager.pool())
            .await?;

        Ok(decode_rows(rows))
    }

    async fn find_by_id(&self, id: &str) -> Result<Auction, StoreError> {
        sqlx::query_as::<_, AuctionRow>(queries::GET_AUCTION)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or_else(|| StoreError::auction_not_found(id))
            .and_then(Auction::try_from)
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, StoreError> {
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_EXPIRED_AUCTIONS)
            .bind(AuctionStatus::Active.code())
            .bind(now.timestamp())
            .fetch_all(self.db_manager.pool())
            .await
            .map_err(|e| {
                error!("{:<12} --> 만료 경매 조회 실패: {:?}", "Store", e);
                StoreError::from(e)
            })?;

        Ok(decode_rows(rows))
    }

    /// 조건부 UPDATE 한 번으로 전이하고, 변경이 없으면 존재 여부로 NotFound 와 이미 종료를 구분한다.
    async fn mark_completed(&self, id: &str) -> Result<CloseOutcome, StoreError> {
        let auction_id = id.to_string();
        let outcome = self
            .db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let result = sqlx::query(queries::COMPLETE_AUCTION)
                        .bind(AuctionStatus::Completed.code())
                        .bind(&auction_id)
                        .bind(AuctionStatus::Active.code())
                        .execute(&mut **tx)
                        .await?;

                    if result.rows_affected() > 0 {
                        return Ok(CloseOutcome::Closed);
                    }

                    let exists: bool = sqlx::query_scalar(queries::AUCTION_EXISTS)
                        .bind(&auction_id)
                        .fetch_one(&mut **tx)
                        .await?;

                    if exists {
                        Ok(CloseOutcome::AlreadyCompleted)
                    } else {
                        Err(StoreError::auction_not_found(auction_id))
                    }
                })
            })
            .await?;

        if outcome == CloseOutcome::Closed {
            info!("{:<12} --> 경매 종료 처리 id: {}", "Store", id);
        }
        Ok(outcome)
    }
}

// endregion: --- Postgres Auction Store
