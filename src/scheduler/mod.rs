/// 경매 종료 워커
/// 주기적으로 만료된 ACTIVE 경매를 찾아 하나씩 COMPLETED 로 전이한다.
/// 한 건의 실패나 한 번의 조회 실패로 워커가 멈추지 않으며, 다음 주기에 다시 시도한다.
// region:    --- Imports
use crate::auction::{AuctionStore, CloseOutcome};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Cycle Report
/// 한 주기의 처리 결과
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub expired_found: usize,
    pub closed: usize,
    pub already_completed: usize,
    pub not_found: usize,
    pub failed: usize,
    /// 만료 경매 조회 자체가 실패한 경우
    pub scan_failed: bool,
    /// 주기 도중 종료 신호를 받은 경우
    pub cancelled: bool,
}

// endregion: --- Cycle Report

// region:    --- Auction Closing Worker
pub struct AuctionClosingWorker {
    store: Arc<dyn AuctionStore>,
    check_interval: Duration,
    shutdown_token: CancellationToken,
}

impl AuctionClosingWorker {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        check_interval: Duration,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            check_interval,
            shutdown_token,
        }
    }

    /// 백그라운드 태스크로 시작
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// 종료 신호를 받을 때까지 주기 실행
    pub async fn run(&self) {
        info!(
            "{:<12} --> 경매 종료 워커 시작 (확인 주기: {:?})",
            "Worker", self.check_interval
        );

        loop {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            let report = self.run_cycle(Utc::now()).await;
            log_report(&report);
            if report.cancelled {
                break;
            }

            tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => break,
                _ = tokio::time::sleep(self.check_interval) => {}
            }
        }

        info!("{:<12} --> 경매 종료 워커 중지", "Worker");
    }

    /// 한 주기 실행
    /// now 기준으로 만료된 경매를 조회하고 각각 종료를 요청한다.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        let expired = tokio::select! {
            biased;
            _ = self.shutdown_token.cancelled() => {
                report.cancelled = true;
                return report;
            }
            result = self.store.find_expired(now) => result,
        };

        let expired = match expired {
            Ok(expired) => expired,
            Err(e) => {
                error!("{:<12} --> 만료 경매 조회 중 오류 발생: {}", "Worker", e);
                report.scan_failed = true;
                return report;
            }
        };
        report.expired_found = expired.len();

        for auction in expired {
            if self.shutdown_token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let result = tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                result = self.store.mark_completed(auction.id()) => result,
            };

            match result {
                Ok(CloseOutcome::Closed) => {
                    report.closed += 1;
                    debug!("{:<12} --> 경매 종료 id: {}", "Worker", auction.id());
                }
                Ok(CloseOutcome::AlreadyCompleted) => {
                    report.already_completed += 1;
                    warn!(
                        "{:<12} --> 이미 종료된 경매 (변경 없음) id: {}",
                        "Worker",
                        auction.id()
                    );
                }
                Err(StoreError::NotFound { .. }) => {
                    report.not_found += 1;
                    warn!(
                        "{:<12} --> 종료할 경매를 찾을 수 없음 id: {}",
                        "Worker",
                        auction.id()
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "{:<12} --> 경매 종료 중 오류 발생 id: {}: {}",
                        "Worker",
                        auction.id(),
                        e
                    );
                }
            }
        }

        report
    }
}

fn log_report(report: &CycleReport) {
    if report.scan_failed {
        return;
    }
    if report.expired_found == 0 {
        debug!("{:<12} --> 만료된 경매 없음", "Worker");
        return;
    }
    info!(
        "{:<12} --> 만료 경매 {}건 처리: 종료 {}, 이미 종료 {}, 없음 {}, 실패 {}",
        "Worker",
        report.expired_found,
        report.closed,
        report.already_completed,
        report.not_found,
        report.failed
    );
}

// endregion: --- Auction Closing Worker
