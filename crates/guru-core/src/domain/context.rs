//! 수집 실행 컨텍스트.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 한 번의 수집 실행을 식별하는 컨텍스트.
///
/// 전역 로거 대신 각 컴포넌트에 명시적으로 전달되며, 실행 단위 span을 엽니다.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// 실행 ID
    pub run_id: Uuid,
    /// 실행 시작 시각
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// 새 실행 컨텍스트를 생성합니다.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    /// 실행 단위 tracing span.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("run", run_id = %self.run_id)
    }

    /// 투자자 단위 tracing span (실행 span의 하위).
    pub fn investor_span(&self, code: &str, name: &str) -> tracing::Span {
        tracing::info_span!(
            "investor",
            run_id = %self.run_id,
            code = %code,
            name = %name
        )
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
