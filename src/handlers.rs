// region:    --- Imports
use crate::auction::{Auction, AuctionFilter, AuctionStatus, AuctionStore, NewAuction};
use crate::config::AuctionSettings;
use crate::error::{AppError, ValidationError};
use crate::user::{User, UserStore};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub auctions: Arc<dyn AuctionStore>,
    pub users: Arc<dyn UserStore>,
    pub settings: AuctionSettings,
}

/// 라우터 설정
pub fn routes(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/auction", get(handle_find_auctions).post(handle_create_auction))
        .route("/auction/:id", get(handle_get_auction))
        .route("/user/:id", get(handle_get_user))
        .layer(cors)
        .with_state(state)
}

// endregion: --- App State

// region:    --- Command Handlers

/// 경매 생성 요청 처리
pub async fn handle_create_auction(
    State(state): State<AppState>,
    payload: Result<Json<NewAuction>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    info!("{:<12} --> 경매 생성 요청: {:?}", "Command", request);

    let auction = request.into_auction(&state.settings)?;
    state.auctions.create(&auction).await?;

    Ok((StatusCode::CREATED, Json(auction)))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 경매 목록 조회 조건
#[derive(Debug, Default, Deserialize)]
pub struct AuctionQuery {
    #[serde(default)]
    pub status: i16,
    pub category: Option<String>,
    #[serde(alias = "productName")]
    pub product_name: Option<String>,
}

impl TryFrom<AuctionQuery> for AuctionFilter {
    type Error = ValidationError;

    fn try_from(query: AuctionQuery) -> Result<Self, Self::Error> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
        Ok(AuctionFilter {
            status: AuctionStatus::try_from(query.status)?,
            category: non_empty(query.category),
            product_name: non_empty(query.product_name),
        })
    }
}

/// 경매 목록 조회
pub async fn handle_find_auctions(
    State(state): State<AppState>,
    query: Result<Query<AuctionQuery>, QueryRejection>,
) -> Result<Json<Vec<Auction>>, AppError> {
    let Query(query) = query?;
    info!("{:<12} --> 경매 목록 조회: {:?}", "HandlerQuery", query);
    let filter = AuctionFilter::try_from(query)?;
    Ok(Json(state.auctions.find_by_filter(&filter).await?))
}

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<AppState>,
    Path(auction_id): Path<String>,
) -> Result<Json<Auction>, AppError> {
    info!("{:<12} --> 경매 조회 id: {}", "HandlerQuery", auction_id);
    Ok(Json(state.auctions.find_by_id(&auction_id).await?))
}

/// 사용자 조회
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    info!("{:<12} --> 사용자 조회 id: {}", "HandlerQuery", user_id);
    Ok(Json(state.users.find_user_by_id(&user_id).await?))
}

// endregion: --- Query Handlers

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_into_filter() {
        let filter = AuctionFilter::try_from(AuctionQuery {
            status: 1,
            category: Some("Music".to_string()),
            product_name: Some("  ".to_string()),
        })
        .unwrap();
        assert_eq!(filter.status, AuctionStatus::Completed);
        assert_eq!(filter.category.as_deref(), Some("Music"));
        assert_eq!(filter.product_name, None);

        assert!(AuctionFilter::try_from(AuctionQuery {
            status: 7,
            ..AuctionQuery::default()
        })
        .is_err());
    }
}
