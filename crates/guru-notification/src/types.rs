//! 게시글 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 게시글 생성 요청.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    /// 게시글 제목
    pub title: String,
    /// 저장된 포트폴리오 ID
    pub portfolio_idx: String,
    /// 투자자 코드
    pub investor_code: String,
    /// 작성자 태그
    pub writer: String,
}

impl PostRequest {
    /// 새 스냅샷 게시글 요청을 생성합니다.
    ///
    /// 제목 형식: `"{투자자 이름} 포트폴리오 ({기준일})"`
    pub fn for_snapshot(
        investor_name: &str,
        portfolio_date: NaiveDate,
        portfolio_id: i64,
        investor_code: &str,
        writer: &str,
    ) -> Self {
        Self {
            title: format!("{} 포트폴리오 ({})", investor_name, portfolio_date),
            portfolio_idx: portfolio_id.to_string(),
            investor_code: investor_code.to_string(),
            writer: writer.to_string(),
        }
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("게시글 생성 실패: {0}")]
    SendFailed(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 게시글 전송기 trait.
#[async_trait]
pub trait PostSender: Send + Sync {
    /// 게시글을 생성합니다.
    async fn create_post(&self, request: &PostRequest) -> NotificationResult<()>;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}
