/// 서비스 설정
/// 프로세스 옵션(clap)은 시작 시 한 번만 읽고, 이후에는 AuctionSettings 값으로만 전달한다.
// region:    --- Imports
use clap::Parser;
use std::time::Duration;
use tracing::warn;

// endregion: --- Imports

// region:    --- Defaults
/// 경매 기본 진행 시간 (5분)
pub const DEFAULT_AUCTION_DURATION: Duration = Duration::from_secs(5 * 60);

/// 종료 워커 기본 확인 주기 (1분)
pub const DEFAULT_WORKER_CHECK_INTERVAL: Duration = Duration::from_secs(60);

// endregion: --- Defaults

// region:    --- Process Options
/// 실행 옵션
#[derive(Parser, Debug, Clone)]
#[command(name = "auction-lifecycle", version, about = "Time-bounded auction service")]
pub struct Args {
    /// PostgreSQL 접속 URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// HTTP 서버 주소
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// 경매 진행 시간 (예: "5m", "2s")
    #[arg(long, env = "AUCTION_DURATION")]
    pub auction_duration: Option<String>,

    /// 종료 워커 확인 주기 (예: "1m", "500ms")
    #[arg(long, env = "WORKER_CHECK_INTERVAL")]
    pub worker_check_interval: Option<String>,
}

impl Args {
    pub fn settings(&self) -> AuctionSettings {
        AuctionSettings::from_raw(
            self.auction_duration.as_deref(),
            self.worker_check_interval.as_deref(),
        )
    }
}

// endregion: --- Process Options

// region:    --- Auction Settings
/// 경매 생성과 종료 워커가 사용하는 설정 값
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionSettings {
    pub auction_duration: Duration,
    pub check_interval: Duration,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            auction_duration: DEFAULT_AUCTION_DURATION,
            check_interval: DEFAULT_WORKER_CHECK_INTERVAL,
        }
    }
}

impl AuctionSettings {
    pub fn new(auction_duration: Duration, check_interval: Duration) -> Self {
        Self {
            auction_duration: non_zero_or(auction_duration, DEFAULT_AUCTION_DURATION),
            check_interval: non_zero_or(check_interval, DEFAULT_WORKER_CHECK_INTERVAL),
        }
    }

    /// 문자열 설정으로부터 생성
    /// 값이 없거나 파싱할 수 없으면 기본값을 사용한다. 설정 때문에 실패하는 일은 없다.
    pub fn from_raw(auction_duration: Option<&str>, check_interval: Option<&str>) -> Self {
        Self {
            auction_duration: resolve_duration(
                "AUCTION_DURATION",
                auction_duration,
                DEFAULT_AUCTION_DURATION,
            ),
            check_interval: resolve_duration(
                "WORKER_CHECK_INTERVAL",
                check_interval,
                DEFAULT_WORKER_CHECK_INTERVAL,
            ),
        }
    }
}

fn resolve_duration(name: &str, raw: Option<&str>, default: Duration) -> Duration {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return default;
    };

    match humantime::parse_duration(raw) {
        Ok(duration) if !duration.is_zero() => duration,
        Ok(_) => {
            warn!(
                "{:<12} --> {} 값이 0 입니다. 기본값 {:?} 사용",
                "Config", name, default
            );
            default
        }
        Err(e) => {
            warn!(
                "{:<12} --> {} 파싱 실패 ({:?}): {}. 기본값 {:?} 사용",
                "Config", name, raw, e, default
            );
            default
        }
    }
}

fn non_zero_or(duration: Duration, default: Duration) -> Duration {
    if duration.is_zero() {
        default
    } else {
        duration
    }
}

// endregion: --- Auction Settings
