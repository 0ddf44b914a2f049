//! 스냅샷 조정 (신규 저장 또는 가격 갱신).
//!
//! (투자자 코드, 기준일) 키 기준:
//! - 저장된 요약 없음: 요약 + 상세 삽입, 가중 평균 수익률 계산 후 기록 → `Created`
//! - 저장된 요약 있음: 티커가 일치하는 상세의 가격 필드만 갱신, 수익률 재계산 → `Updated`
//!
//! 요약 행(가치, 종목 수, 분기)은 갱신 경로에서 다시 쓰지 않습니다.
//! 한 투자자의 모든 쓰기는 하나의 트랜잭션이며, 오류 시 커밋 없이 drop 되어 롤백됩니다.

use guru_core::{DetailPriceUpdate, PortfolioSnapshot};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::SnapshotStore;

/// 조정 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// 처음 저장된 스냅샷 (알림 대상)
    Created {
        portfolio_id: i64,
        details_inserted: usize,
        avg_return: Decimal,
    },
    /// 이미 저장된 스냅샷의 가격 갱신
    Updated {
        portfolio_id: i64,
        details_updated: usize,
        avg_return: Decimal,
    },
}

impl ReconcileOutcome {
    pub fn portfolio_id(&self) -> i64 {
        match self {
            Self::Created { portfolio_id, .. } | Self::Updated { portfolio_id, .. } => {
                *portfolio_id
            }
        }
    }

    pub fn avg_return(&self) -> Decimal {
        match self {
            Self::Created { avg_return, .. } | Self::Updated { avg_return, .. } => *avg_return,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// 크롤링한 스냅샷을 저장소와 조정합니다.
pub async fn reconcile(
    store: &dyn SnapshotStore,
    investor_name: &str,
    snapshot: &PortfolioSnapshot,
) -> Result<ReconcileOutcome> {
    let summary = &snapshot.summary;
    let mut tx = store.begin().await?;

    let outcome = match tx
        .find_portfolio(&summary.investor_code, summary.as_of_date)
        .await?
    {
        None => {
            let portfolio_id = tx.insert_summary(investor_name, summary).await?;
            let details_inserted = tx.insert_details(portfolio_id, &snapshot.details).await?;
            let avg_return = tx.recompute_avg_return(portfolio_id).await?;
            ReconcileOutcome::Created {
                portfolio_id,
                details_inserted,
                avg_return,
            }
        }
        Some(portfolio_id) => {
            let updates: Vec<DetailPriceUpdate> =
                snapshot.details.iter().map(DetailPriceUpdate::from).collect();
            let details_updated = tx.update_detail_prices(portfolio_id, &updates).await?;
            if details_updated < updates.len() {
                debug!(
                    portfolio_id,
                    unmatched = updates.len() - details_updated,
                    "저장되지 않은 티커는 갱신에서 제외"
                );
            }
            let avg_return = tx.recompute_avg_return(portfolio_id).await?;
            ReconcileOutcome::Updated {
                portfolio_id,
                details_updated,
                avg_return,
            }
        }
    };

    tx.commit().await?;

    info!(
        code = %summary.investor_code,
        date = %summary.as_of_date,
        portfolio_id = outcome.portfolio_id(),
        avg_return = %outcome.avg_return(),
        created = outcome.is_created(),
        "스냅샷 저장 완료"
    );

    Ok(outcome)
}
