// region:    --- Imports
use auction_lifecycle::config::Args;
use auction_lifecycle::database::{DatabaseManager, PgAuctionStore, PgUserStore};
use auction_lifecycle::handlers::{self, AppState};
use auction_lifecycle::scheduler::AuctionClosingWorker;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();
    let settings = args.settings();
    info!(
        "{:<12} --> 경매 기간: {:?}, 워커 확인 주기: {:?}",
        "Main", settings.auction_duration, settings.check_interval
    );

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&args.database_url).await?);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    let auctions = Arc::new(PgAuctionStore::new(Arc::clone(&db_manager)));
    let users = Arc::new(PgUserStore::new(Arc::clone(&db_manager)));

    // 경매 종료 워커 시작
    let shutdown_token = CancellationToken::new();
    let worker = AuctionClosingWorker::new(
        auctions.clone(),
        settings.check_interval,
        shutdown_token.clone(),
    );
    let worker_handle = worker.start();

    let routes_all = handlers::routes(AppState {
        auctions,
        users,
        settings,
    });

    // 리스너 생성
    let listener = TcpListener::bind(&args.listen_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행 (Ctrl+C 수신 시 워커와 함께 종료)
    let server_token = shutdown_token.clone();
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("{:<12} --> 종료 신호 수신 실패: {}", "Main", e);
            }
            info!("{:<12} --> 종료 신호 수신", "Main");
            server_token.cancel();
        })
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    shutdown_token.cancel();
    if let Err(e) = worker_handle.await {
        error!("{:<12} --> 워커 종료 대기 실패: {}", "Main", e);
    }
    info!("{:<12} --> 서버 종료", "Main");
    Ok(())
}
// endregion: --- Main
