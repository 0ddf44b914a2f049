//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::CollectorError;
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// DB 연결 풀 크기
    pub db_max_connections: u32,
    /// 크롤링 설정
    pub crawl: CrawlSettings,
    /// 게시판 알림 설정
    pub post_api: PostApiSettings,
    /// 리포트 생성 설정
    pub report: ReportSettings,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 크롤링 설정
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// 상위 사이트 루트
    pub base_url: String,
    /// 수집할 상위 투자자 수
    pub top_count: usize,
    /// 순위 페이지 타임아웃 (초)
    pub listing_timeout_secs: u64,
    /// 보유 종목 페이지 타임아웃 (초)
    pub holdings_timeout_secs: u64,
    /// 같은 투자자의 페이지 요청 간 딜레이 (밀리초)
    pub page_delay_ms: u64,
    /// 동시에 처리할 투자자 수
    pub concurrency: usize,
}

/// 게시판 알림 설정
#[derive(Debug, Clone)]
pub struct PostApiSettings {
    pub enabled: bool,
    pub base_url: String,
    pub writer: String,
    pub timeout_secs: u64,
}

/// 리포트 생성 설정
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// 정적 HTML 템플릿 경로
    pub template_path: PathBuf,
    /// 출력 디렉토리
    pub output_dir: PathBuf,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 수집 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드 (`.env` 파일이 있으면 먼저 읽음)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정을 만듭니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let database_url = env.get("DATABASE_URL").ok_or_else(|| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let config = Self {
            database_url,
            db_max_connections: env.parse("DB_MAX_CONNECTIONS", 5),
            crawl: CrawlSettings {
                base_url: env.string("CRAWL_BASE_URL", "https://dataroma.com"),
                top_count: env.parse("CRAWL_TOP_COUNT", 10),
                listing_timeout_secs: env.parse("CRAWL_LISTING_TIMEOUT_SECS", 10),
                holdings_timeout_secs: env.parse("CRAWL_HOLDINGS_TIMEOUT_SECS", 15),
                page_delay_ms: env.parse("CRAWL_PAGE_DELAY_MS", 0),
                concurrency: env.parse("CRAWL_CONCURRENCY", 1),
            },
            post_api: PostApiSettings {
                enabled: env.bool("POST_API_ENABLED", false),
                base_url: env.string("POST_API_BASE_URL", "http://localhost/api"),
                writer: env.string("POST_API_WRITER", "admin"),
                timeout_secs: env.parse("POST_API_TIMEOUT_SECS", 30),
            },
            report: ReportSettings {
                template_path: env.string("REPORT_TEMPLATE_PATH", "report_template.html").into(),
                output_dir: env.string("REPORT_OUTPUT_DIR", "report").into(),
            },
            daemon: DaemonConfig {
                interval_minutes: env.parse("DAEMON_INTERVAL_MINUTES", 1440),
            },
        };

        if config.crawl.concurrency == 0 {
            return Err(CollectorError::Config(
                "CRAWL_CONCURRENCY는 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(config)
    }
}

impl CrawlSettings {
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn holdings_timeout(&self) -> Duration {
        Duration::from_secs(self.holdings_timeout_secs)
    }

    /// 페이지 요청 간 딜레이를 Duration으로 반환
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl PostApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DaemonConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// 값을 파싱 (실패 시 기본값 사용)
    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(default)
    }
}
