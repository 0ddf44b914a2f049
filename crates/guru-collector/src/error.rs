//! 에러 타입 정의.

use guru_core::CoreError;
use guru_data::{CrawlError, DataError, ParseError};

/// Collector 에러 타입
///
/// 실행 전체를 중단시키는 에러만 여기에 속합니다.
/// 투자자 단위 실패는 로그와 통계로만 남습니다.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터베이스 연결/마이그레이션 에러
    #[error("Database error: {0}")]
    Database(#[from] DataError),

    /// 순위 페이지 수집 실패
    #[error("Ranking fetch failed: {0}")]
    Ranking(#[from] CrawlError),

    /// 사이트 URL 설정 에러
    #[error("Invalid site URL: {0}")]
    Site(#[from] ParseError),

    /// 로깅 등 공통 초기화 에러
    #[error(transparent)]
    Core(#[from] CoreError),

    /// 리포트 생성 에러
    #[error("Report error: {0}")]
    Report(String),

    /// 파일 입출력 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
