use auction_lifecycle::auction::{Auction, AuctionFilter, AuctionStatus, AuctionStore, CloseOutcome, ProductCondition};
use auction_lifecycle::config::AuctionSettings;
use auction_lifecycle::database::{DatabaseManager, PgAuctionStore, PgUserStore};
use auction_lifecycle::handlers::{self, AppState};
use auction_lifecycle::memory::{InMemoryAuctionStore, InMemoryUserStore};
use auction_lifecycle::scheduler::AuctionClosingWorker;
use auction_lifecycle::user::{User, UserStore};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 메모리 저장소로 서버 실행 후 주소 반환
async fn spawn_server(auctions: Arc<InMemoryAuctionStore>, settings: AuctionSettings) -> String {
    let users = Arc::new(InMemoryUserStore::with_users([User {
        id: "u-1".to_string(),
        name: "Test User".to_string(),
    }]));
    let routes_all = handlers::routes(AppState {
        auctions,
        users,
        settings,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes_all.into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

/// 테스트용 경매 생성
fn create_test_auction(settings: &AuctionSettings, product_name: &str) -> Auction {
    Auction::create(
        product_name,
        "Eletrônicos",
        "Descrição de teste para validação do fechamento automático",
        ProductCondition::New,
        settings,
    )
    .unwrap()
}

/// 워커 시작
fn start_worker(
    store: Arc<dyn AuctionStore>,
    check_interval: Duration,
) -> (CancellationToken, tokio::task::JoinHandle<()>) {
    let token = CancellationToken::new();
    let worker = AuctionClosingWorker::new(store, check_interval, token.clone());
    (token, worker.start())
}

// region:    --- HTTP

/// 경매 생성 및 조회 테스트
#[tokio::test]
async fn test_create_and_get_auction() {
    init_tracing();
    let store = Arc::new(InMemoryAuctionStore::new());
    let base = spawn_server(store.clone(), AuctionSettings::default()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/auction", base))
        .json(&json!({
            "product_name": "Produto Teste",
            "category": "Eletrônicos",
            "description": "Descrição de teste para validação básica",
            "condition": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await.unwrap();
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["condition"], "NEW");
    let id = created["id"].as_str().unwrap().to_string();

    let response = client
        .get(format!("{}/auction/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["product_name"], "Produto Teste");

    let saved = store.find_by_id(&id).await.unwrap();
    assert_eq!(saved.status(), AuctionStatus::Active);
    assert!(saved.end_time() > Utc::now());
}

/// 검증 실패 시 저장하지 않음
#[tokio::test]
async fn test_create_invalid_auction_is_rejected() {
    let store = Arc::new(InMemoryAuctionStore::new());
    let base = spawn_server(store.clone(), AuctionSettings::default()).await;
    let client = Client::new();

    for body in [
        json!({"product_name": "P", "category": "Eletrônicos", "description": "Descrição suficientemente longa", "condition": 1}),
        json!({"product_name": "Produto", "category": "El", "description": "Descrição suficientemente longa", "condition": 2}),
        json!({"product_name": "Produto", "category": "Eletrônicos", "description": "curta", "condition": 3}),
        json!({"product_name": "Produto", "category": "Eletrônicos", "description": "Descrição suficientemente longa", "condition": 9}),
    ] {
        let response = client
            .post(format!("{}/auction", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error_info: Value = response.json().await.unwrap();
        assert_eq!(error_info["code"], "VALIDATION_ERROR");
    }

    let response = client
        .get(format!("{}/auction?status=0", base))
        .send()
        .await
        .unwrap();
    let auctions: Vec<Value> = response.json().await.unwrap();
    assert!(auctions.is_empty());
}

/// 존재하지 않는 경매/사용자 조회
#[tokio::test]
async fn test_get_missing_returns_not_found() {
    let base = spawn_server(Arc::new(InMemoryAuctionStore::new()), AuctionSettings::default()).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/auction/does-not-exist", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error_info: Value = response.json().await.unwrap();
    assert_eq!(error_info["code"], "NOT_FOUND");

    let response = client
        .get(format!("{}/user/u-2", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .get(format!("{}/user/u-1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["name"], "Test User");
}

/// 경매 목록 조건 조회
#[tokio::test]
async fn test_find_auctions_by_filter() {
    let settings = AuctionSettings::default();
    let store = Arc::new(InMemoryAuctionStore::new());
    let phone = create_test_auction(&settings, "Smartphone X");
    let laptop = create_test_auction(&settings, "Laptop Pro");
    let closed = create_test_auction(&settings, "Smartphone Y");
    for auction in [&phone, &laptop, &closed] {
        store.create(auction).await.unwrap();
    }
    store.mark_completed(closed.id()).await.unwrap();

    let base = spawn_server(store, settings).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/auction?status=0&productName=smartphone", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let auctions: Vec<Value> = response.json().await.unwrap();
    assert_eq!(auctions.len(), 1);
    assert_eq!(auctions[0]["id"], phone.id());

    let response = client
        .get(format!("{}/auction?status=1&category=Eletrônicos", base))
        .send()
        .await
        .unwrap();
    let auctions: Vec<Value> = response.json().await.unwrap();
    assert_eq!(auctions.len(), 1);
    assert_eq!(auctions[0]["id"], closed.id());

    let response = client
        .get(format!("{}/auction?status=5", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// 해석할 수 없는 본문과 쿼리도 JSON 오류로 응답
#[tokio::test]
async fn test_malformed_request_returns_validation_error() {
    let store = Arc::new(InMemoryAuctionStore::new());
    let base = spawn_server(store.clone(), AuctionSettings::default()).await;
    let client = Client::new();

    let responses = [
        client
            .post(format!("{}/auction", base))
            .header("content-type", "application/json")
            .body("{\"product_name\": \"Produto\", ")
            .send()
            .await
            .unwrap(),
        client
            .post(format!("{}/auction", base))
            .json(&json!({"product_name": "Produto", "category": "Eletrônicos"}))
            .send()
            .await
            .unwrap(),
        client
            .get(format!("{}/auction?status=abc", base))
            .send()
            .await
            .unwrap(),
    ];

    for response in responses {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error_info: Value = response.json().await.unwrap();
        assert_eq!(error_info["code"], "VALIDATION_ERROR");
        assert!(!error_info["error"].as_str().unwrap().is_empty());
    }

    let auctions = store
        .find_by_filter(&AuctionFilter::by_status(AuctionStatus::Active))
        .await
        .unwrap();
    assert!(auctions.is_empty());
}

// endregion: --- HTTP

// region:    --- Closing Worker

/// 경매 자동 종료 테스트
#[tokio::test]
async fn test_auction_automatic_closing() {
    init_tracing();
    let settings = AuctionSettings::from_raw(Some("2s"), Some("500ms"));
    let store = Arc::new(InMemoryAuctionStore::new());
    let auction = create_test_auction(&settings, "Produto Teste");
    assert!(auction.end_time() > Utc::now());
    store.create(&auction).await.unwrap();

    let (token, handle) = start_worker(store.clone(), settings.check_interval);

    // 경매 종료 대기
    tokio::time::sleep(Duration::from_secs(3)).await;
    token.cancel();
    handle.await.unwrap();

    let closed_auction = store.find_by_id(auction.id()).await.unwrap();
    info!("경매 상태: {:?}", closed_auction.status());
    assert_eq!(closed_auction.status(), AuctionStatus::Completed);
    assert!(closed_auction.end_time() < Utc::now());
}

/// 만료 전 경매는 종료하지 않음
#[tokio::test]
async fn test_auction_not_expired_yet() {
    let settings = AuctionSettings::from_raw(Some("10s"), Some("500ms"));
    let store = Arc::new(InMemoryAuctionStore::new());
    let auction = create_test_auction(&settings, "Produto Teste Não Expirado");
    store.create(&auction).await.unwrap();

    let (token, handle) = start_worker(store.clone(), settings.check_interval);
    tokio::time::sleep(Duration::from_secs(2)).await;
    token.cancel();
    handle.await.unwrap();

    let saved = store.find_by_id(auction.id()).await.unwrap();
    assert_eq!(saved.status(), AuctionStatus::Active);
    assert!(saved.end_time() > Utc::now());
}

/// 종료 신호 이후에는 전이가 일어나지 않음
#[tokio::test]
async fn test_no_transition_after_cancellation() {
    let settings = AuctionSettings::from_raw(Some("1s"), Some("200ms"));
    let store = Arc::new(InMemoryAuctionStore::new());
    let auction = create_test_auction(&settings, "Produto Cancelado");
    store.create(&auction).await.unwrap();

    let (token, handle) = start_worker(store.clone(), settings.check_interval);
    token.cancel();
    handle.await.unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let saved = store.find_by_id(auction.id()).await.unwrap();
    assert_eq!(saved.status(), AuctionStatus::Active);
    assert!(saved.end_time() < Utc::now());
}

// endregion: --- Closing Worker

// region:    --- Postgres (DATABASE_URL 필요)

/// 데이터베이스 매니저 설정
async fn setup() -> Arc<DatabaseManager> {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_manager = Arc::new(DatabaseManager::new(&database_url).await.unwrap());
    db_manager.initialize_database().await.unwrap();
    db_manager
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_pg_create_and_close_auction() {
    let db_manager = setup().await;
    let store = PgAuctionStore::new(Arc::clone(&db_manager));
    let auction = create_test_auction(&AuctionSettings::default(), "Produto para Fechamento");
    store.create(&auction).await.unwrap();

    let saved = store.find_by_id(auction.id()).await.unwrap();
    assert_eq!(saved.status(), AuctionStatus::Active);
    // 종료 시각은 초 단위 올림으로 저장된다
    assert!(saved.end_time() >= auction.end_time());
    assert!(saved.end_time() - auction.end_time() < chrono::TimeDelta::seconds(1));

    assert_eq!(store.mark_completed(auction.id()).await.unwrap(), CloseOutcome::Closed);
    assert_eq!(
        store.mark_completed(auction.id()).await.unwrap(),
        CloseOutcome::AlreadyCompleted
    );
    assert!(store.mark_completed("missing-id").await.unwrap_err().is_not_found());
    assert_eq!(
        store.find_by_id(auction.id()).await.unwrap().status(),
        AuctionStatus::Completed
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_pg_automatic_closing() {
    let db_manager = setup().await;
    let store = Arc::new(PgAuctionStore::new(Arc::clone(&db_manager)));
    let settings = AuctionSettings::from_raw(Some("2s"), Some("500ms"));
    let auction = create_test_auction(&settings, "Produto Teste");
    store.create(&auction).await.unwrap();

    let (token, handle) = start_worker(store.clone(), settings.check_interval);
    tokio::time::sleep(Duration::from_secs(5)).await;
    token.cancel();
    handle.await.unwrap();

    let closed_auction = store.find_by_id(auction.id()).await.unwrap();
    assert_eq!(closed_auction.status(), AuctionStatus::Completed);
    assert!(closed_auction.end_time() < Utc::now());

    let expired = store.find_expired(Utc::now()).await.unwrap();
    assert!(expired.iter().all(|a| a.id() != auction.id()));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_pg_find_user_by_id() {
    let db_manager = setup().await;
    sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
        .bind("pg-user-1")
        .bind("Test User")
        .execute(db_manager.pool())
        .await
        .unwrap();

    let users = PgUserStore::new(db_manager);
    assert_eq!(users.find_user_by_id("pg-user-1").await.unwrap().name, "Test User");
    assert!(users.find_user_by_id("pg-user-x").await.unwrap_err().is_not_found());
}

// endregion: --- Postgres
