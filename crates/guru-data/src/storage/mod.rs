//! 스냅샷 저장소.
//!
//! 조정기(reconciler)는 아래 두 trait에만 의존합니다.
//! - `SnapshotStore`: 트랜잭션 시작, 최신 스냅샷 조회 (리포트용)
//! - `SnapshotTransaction`: 한 투자자 처리 단위의 읽기/쓰기. `commit` 없이 drop 하면 롤백
//!
//! 구현체:
//! - `postgres::PgSnapshotStore`: PostgreSQL (운영)
//! - `memory::MemorySnapshotStore`: 메모리 (테스트, 드라이런)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use guru_core::{DetailPriceUpdate, HoldingDetail, PortfolioSummary, StoredSnapshot};
use rust_decimal::Decimal;

use crate::error::Result;

pub use memory::MemorySnapshotStore;
pub use postgres::{Database, DatabaseConfig, PgSnapshotStore};

/// 스냅샷 저장소.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 새 트랜잭션을 시작합니다.
    async fn begin(&self) -> Result<Box<dyn SnapshotTransaction>>;

    /// 가장 최근 기준일의 스냅샷 (상세는 비중 내림차순).
    async fn read_latest_snapshot(&self) -> Result<Option<StoredSnapshot>>;
}

/// 한 투자자 처리 단위 트랜잭션.
///
/// 투자자 코드는 조회와 삽입 모두 `normalize_investor_code`로 정규화됩니다.
#[async_trait]
pub trait SnapshotTransaction: Send {
    /// (투자자 코드, 기준일)에 해당하는 포트폴리오 ID.
    async fn find_portfolio(&mut self, investor_code: &str, date: NaiveDate)
        -> Result<Option<i64>>;

    /// 요약을 삽입하고 새 포트폴리오 ID를 반환합니다.
    async fn insert_summary(&mut self, investor_name: &str, summary: &PortfolioSummary)
        -> Result<i64>;

    /// 상세를 일괄 삽입하고 삽입된 행 수를 반환합니다.
    async fn insert_details(&mut self, portfolio_id: i64, details: &[HoldingDetail])
        -> Result<usize>;

    /// 티커가 일치하는 상세의 가격 필드만 갱신하고, 일치한 티커 수를 반환합니다.
    async fn update_detail_prices(
        &mut self,
        portfolio_id: i64,
        updates: &[DetailPriceUpdate],
    ) -> Result<usize>;

    /// 저장된 상세로 가중 평균 수익률을 다시 계산해 요약에 기록하고 그 값을 반환합니다.
    async fn recompute_avg_return(&mut self, portfolio_id: i64) -> Result<Decimal>;

    /// 커밋합니다.
    async fn commit(self: Box<Self>) -> Result<()>;
}
