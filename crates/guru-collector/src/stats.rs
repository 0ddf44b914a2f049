//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 포트폴리오 동기화 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStats {
    /// 처리 대상 투자자 수
    pub total: usize,
    /// 새로 저장된 스냅샷 수
    pub created: usize,
    /// 가격만 갱신된 스냅샷 수
    pub updated: usize,
    /// 크롤링/저장 실패 투자자 수
    pub failed: usize,
    /// 게시글 등록 성공 수
    pub posted: usize,
    /// 게시글 등록 실패 수
    pub post_failed: usize,
    /// 건너뛴 상세 행 수
    pub skipped_rows: usize,
    /// 누락된 페이지 수
    pub pages_omitted: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.created + self.updated) as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            created = self.created,
            updated = self.updated,
            failed = self.failed,
            posted = self.posted,
            post_failed = self.post_failed,
            skipped_rows = self.skipped_rows,
            pages_omitted = self.pages_omitted,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        assert_eq!(SyncStats::new().success_rate(), 0.0);

        let stats = SyncStats {
            total: 4,
            created: 1,
            updated: 2,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), 75.0);
    }
}
