//! 데이터 모듈 오류 타입.
//!
//! - `FetchError`: 네트워크/타임아웃/비정상 상태 코드 (페이지 단위 복구 가능)
//! - `ParseError`: 필수 요소 누락 등 구조적 파싱 실패 (페이지/투자자 단위 치명)
//! - `DataError`: 저장소 오류 (투자자 트랜잭션 롤백)

use reqwest::StatusCode;
use thiserror::Error;

/// 페이지 가져오기 실패 원인.
#[derive(Debug, Error)]
pub enum FetchErrorKind {
    /// 연결/전송 오류
    #[error("transport error: {0}")]
    Transport(String),

    /// 요청 타임아웃
    #[error("timed out")]
    Timeout,

    /// 2xx가 아닌 응답
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// 페이지 가져오기 오류 (URL과 원인을 함께 보관).
#[derive(Debug, Error)]
#[error("GET {url} failed: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// reqwest 오류를 원인별로 분류합니다.
    pub fn from_reqwest(url: impl Into<String>, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if let Some(status) = err.status() {
            FetchErrorKind::Status(status)
        } else {
            FetchErrorKind::Transport(err.to_string())
        };
        Self::new(url, kind)
    }
}

/// 구조적 파싱 오류.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// 필수 요소를 찾을 수 없음
    #[error("element not found: {0}")]
    MissingElement(String),

    /// 요약 영역의 하위 필드 개수 부족
    #[error("summary has {found} fields, expected {expected}")]
    IncompleteSummary { found: usize, expected: usize },

    /// 필드 값 형식 오류
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// CSS 선택자 오류
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

/// 한 투자자의 크롤링 실패 (투자자 단위로 건너뜀).
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("parse failed for {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

/// 저장소 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드 (동시 수집기 간 (code, date) 충돌)
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_includes_url() {
        let err = FetchError::new(
            "https://example.com/m/managers.php",
            FetchErrorKind::Status(StatusCode::SERVICE_UNAVAILABLE),
        );
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/m/managers.php"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            DataError::from(sqlx::Error::RowNotFound),
            DataError::NotFound(_)
        ));
    }
}
