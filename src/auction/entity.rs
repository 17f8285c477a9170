/// 경매 엔티티
/// 생성 이후 변경되지 않는 값 객체. 상태 전이(ACTIVE -> COMPLETED)는 저장소만 수행한다.
// region:    --- Imports
use crate::config::{AuctionSettings, DEFAULT_AUCTION_DURATION};
use crate::error::ValidationError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Status & Condition
/// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    Active,
    Completed,
}

impl AuctionStatus {
    /// 저장 코드 (Active=0, Completed=1)
    pub fn code(self) -> i16 {
        match self {
            AuctionStatus::Active => 0,
            AuctionStatus::Completed => 1,
        }
    }
}

impl TryFrom<i16> for AuctionStatus {
    type Error = ValidationError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AuctionStatus::Active),
            1 => Ok(AuctionStatus::Completed),
            _ => Err(ValidationError::new(format!("invalid auction status: {code}"))),
        }
    }
}

/// 상품 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

impl ProductCondition {
    /// 저장 코드 (New=1, Used=2, Refurbished=3)
    pub fn code(self) -> i16 {
        match self {
            ProductCondition::New => 1,
            ProductCondition::Used => 2,
            ProductCondition::Refurbished => 3,
        }
    }
}

impl TryFrom<i16> for ProductCondition {
    type Error = ValidationError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ProductCondition::New),
            2 => Ok(ProductCondition::Used),
            3 => Ok(ProductCondition::Refurbished),
            _ => Err(ValidationError::new("invalid product condition")),
        }
    }
}

// endregion: --- Status & Condition

// region:    --- Auction
/// 경매
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Auction {
    id: String,
    product_name: String,
    category: String,
    description: String,
    condition: ProductCondition,
    status: AuctionStatus,
    created_at: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl Auction {
    /// 경매 생성
    /// 검증에 실패하면 경매를 만들지 않고 ValidationError 를 반환한다.
    pub fn create(
        product_name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        condition: ProductCondition,
        settings: &AuctionSettings,
    ) -> Result<Self, ValidationError> {
        Self::create_at(
            product_name,
            category,
            description,
            condition,
            settings,
            Utc::now(),
        )
    }

    /// 지정한 시각 기준으로 경매 생성
    pub fn create_at(
        product_name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        condition: ProductCondition,
        settings: &AuctionSettings,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let auction = Self {
            id: Uuid::new_v4().to_string(),
            product_name: product_name.into(),
            category: category.into(),
            description: description.into(),
            condition,
            status: AuctionStatus::Active,
            created_at: now,
            end_time: end_time_from(now, settings.auction_duration),
        };

        auction.validate()?;
        Ok(auction)
    }

    /// 저장소에서 읽은 값으로 복원
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: String,
        product_name: String,
        category: String,
        description: String,
        condition: ProductCondition,
        status: AuctionStatus,
        created_at: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_name,
            category,
            description,
            condition,
            status,
            created_at,
            end_time,
        }
    }

    /// 필드 검증
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.product_name.chars().count() <= 1 {
            return Err(ValidationError::new(
                "product name must be longer than 1 character",
            ));
        }

        if self.category.chars().count() <= 2 {
            return Err(ValidationError::new(
                "category must be longer than 2 characters",
            ));
        }

        if self.description.chars().count() <= 10 {
            return Err(ValidationError::new(
                "description must be longer than 10 characters",
            ));
        }

        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn condition(&self) -> ProductCondition {
        self.condition
    }

    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && self.end_time <= now
    }

    /// ACTIVE 인 경우에만 COMPLETED 로 전이. 전이 여부를 반환한다.
    pub(crate) fn complete(&mut self) -> bool {
        if self.status != AuctionStatus::Active {
            return false;
        }
        self.status = AuctionStatus::Completed;
        true
    }
}

/// 종료 시각 계산
/// 설정된 기간을 표현할 수 없으면 기본 기간(5분)을 사용한다.
fn end_time_from(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    let fallback = || now + TimeDelta::seconds(DEFAULT_AUCTION_DURATION.as_secs() as i64);

    if duration.is_zero() {
        return fallback();
    }

    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or_else(fallback)
}

// endregion: --- Auction

// region:    --- New Auction
/// 경매 생성 요청
/// condition 은 외부에서 들어오는 정수 코드이므로 변환 시 검증한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuction {
    pub product_name: String,
    pub category: String,
    pub description: String,
    pub condition: i16,
}

impl NewAuction {
    pub fn into_auction(self, settings: &AuctionSettings) -> Result<Auction, ValidationError> {
        let condition = ProductCondition::try_from(self.condition)?;
        Auction::create(
            self.product_name,
            self.category,
            self.description,
            condition,
            settings,
        )
    }
}

// endregion: --- New Auction
