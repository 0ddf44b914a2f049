//! 핵심 도메인 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 로깅 초기화 실패
    #[error("로깅 초기화 실패: {0}")]
    Logging(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
