//! 보유 종목 수집 및 스냅샷 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 상위 사이트 페이지 가져오기 (무작위 User-Agent, 요청별 타임아웃)
//! - 투자자 순위 / 보유 종목 HTML 파싱 (행 단위 소프트 실패)
//! - 투자자 단위 페이지 순회 크롤러
//! - 스냅샷 저장소 (PostgreSQL, 메모리)
//! - 신규 저장 / 가격 갱신 조정기

pub mod error;
pub mod provider;
pub mod reconcile;
pub mod storage;

pub use error::{CrawlError, DataError, FetchError, FetchErrorKind, ParseError, Result};
pub use provider::{
    CrawlResult, CrawlerConfig, HttpPageFetcher, PageSource, PortfolioCrawler, RankingResult,
    SiteUrls,
};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use storage::{
    Database, DatabaseConfig, MemorySnapshotStore, PgSnapshotStore, SnapshotStore,
    SnapshotTransaction,
};
