//! 메모리 스냅샷 저장소.
//!
//! 트랜잭션은 시작 시점의 상태 복사본에서 동작하고, 커밋 시 변경한 포트폴리오만
//! 공유 상태에 반영합니다. 커밋 시점에 (코드, 기준일) 충돌이 있으면
//! `DuplicateError`로 실패하며 아무것도 반영하지 않습니다.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use guru_core::{
    normalize_investor_code, round_avg_return, weighted_avg_return, DetailPriceUpdate,
    HoldingDetail, PortfolioSummary, StoredSnapshot,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::{SnapshotStore, SnapshotTransaction};
use crate::error::{DataError, Result};

#[derive(Debug, Clone)]
struct PortfolioRow {
    id: i64,
    investor_name: String,
    summary: PortfolioSummary,
    avg_return: Option<Decimal>,
}

#[derive(Debug, Clone)]
struct DetailRow {
    portfolio_id: i64,
    detail: HoldingDetail,
}

#[derive(Debug, Clone, Default)]
struct State {
    last_id: i64,
    portfolios: Vec<PortfolioRow>,
    details: Vec<DetailRow>,
}

impl State {
    fn find(&self, code: &str, date: NaiveDate) -> Option<&PortfolioRow> {
        self.portfolios
            .iter()
            .find(|p| p.summary.investor_code == code && p.summary.as_of_date == date)
    }

    fn portfolio_mut(&mut self, id: i64) -> Result<&mut PortfolioRow> {
        self.portfolios
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DataError::NotFound(format!("investor_portfolio idx={}", id)))
    }

    fn details_of(&self, id: i64) -> impl Iterator<Item = &HoldingDetail> {
        self.details
            .iter()
            .filter(move |d| d.portfolio_id == id)
            .map(|d| &d.detail)
    }
}

/// 메모리 스냅샷 저장소.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    state: Arc<Mutex<State>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 요약 수.
    pub async fn portfolio_count(&self) -> usize {
        self.state.lock().await.portfolios.len()
    }

    /// 저장된 상세 수.
    pub async fn detail_count(&self) -> usize {
        self.state.lock().await.details.len()
    }

    /// 포트폴리오의 저장된 가중 평균 수익률.
    pub async fn avg_return(&self, portfolio_id: i64) -> Option<Decimal> {
        self.state
            .lock()
            .await
            .portfolios
            .iter()
            .find(|p| p.id == portfolio_id)
            .and_then(|p| p.avg_return)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn begin(&self) -> Result<Box<dyn SnapshotTransaction>> {
        let working = self.state.lock().await.clone();
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.state),
            working,
            inserted: Vec::new(),
            touched: BTreeSet::new(),
        }))
    }

    async fn read_latest_snapshot(&self) -> Result<Option<StoredSnapshot>> {
        let state = self.state.lock().await;

        // 기준일 내림차순, 같은 날짜면 나중에 생성된 것
        let Some(latest) = state
            .portfolios
            .iter()
            .max_by_key(|p| (p.summary.as_of_date, p.id))
        else {
            return Ok(None);
        };

        let mut details: Vec<HoldingDetail> = state.details_of(latest.id).cloned().collect();
        details.sort_by(|a, b| b.portfolio_weight_pct.cmp(&a.portfolio_weight_pct));

        Ok(Some(StoredSnapshot {
            portfolio_id: latest.id,
            investor_name: latest.investor_name.clone(),
            summary: latest.summary.clone(),
            avg_return: latest.avg_return,
            details,
        }))
    }
}

/// 메모리 트랜잭션.
pub struct MemoryTransaction {
    shared: Arc<Mutex<State>>,
    working: State,
    /// 이 트랜잭션에서 새로 만든 포트폴리오
    inserted: Vec<i64>,
    /// 변경된 포트폴리오 (신규 포함)
    touched: BTreeSet<i64>,
}

#[async_trait]
impl SnapshotTransaction for MemoryTransaction {
    async fn find_portfolio(
        &mut self,
        investor_code: &str,
        date: NaiveDate,
    ) -> Result<Option<i64>> {
        let code = normalize_investor_code(investor_code);
        Ok(self.working.find(&code, date).map(|p| p.id))
    }

    async fn insert_summary(
        &mut self,
        investor_name: &str,
        summary: &PortfolioSummary,
    ) -> Result<i64> {
        let code = normalize_investor_code(&summary.investor_code);
        if self.working.find(&code, summary.as_of_date).is_some() {
            return Err(DataError::DuplicateError(format!(
                "investor_portfolio ({}, {})",
                code, summary.as_of_date
            )));
        }

        // ID는 트랜잭션 간에 겹치지 않도록 공유 상태에서 발급
        let id = {
            let mut shared = self.shared.lock().await;
            shared.last_id += 1;
            shared.last_id
        };

        self.working.portfolios.push(PortfolioRow {
            id,
            investor_name: investor_name.to_string(),
            summary: PortfolioSummary {
                investor_code: code,
                ..summary.clone()
            },
            avg_return: None,
        });
        self.inserted.push(id);
        self.touched.insert(id);
        Ok(id)
    }

    async fn insert_details(
        &mut self,
        portfolio_id: i64,
        details: &[HoldingDetail],
    ) -> Result<usize> {
        self.working.portfolio_mut(portfolio_id)?;

        self.working
            .details
            .extend(details.iter().cloned().map(|detail| DetailRow {
                portfolio_id,
                detail,
            }));
        self.touched.insert(portfolio_id);
        Ok(details.len())
    }

    async fn update_detail_prices(
        &mut self,
        portfolio_id: i64,
        updates: &[DetailPriceUpdate],
    ) -> Result<usize> {
        let mut matched = 0;

        for update in updates {
            let mut hit = false;
            for row in self
                .working
                .details
                .iter_mut()
                .filter(|r| r.portfolio_id == portfolio_id && r.detail.ticker == update.ticker)
            {
                row.detail.current_price = update.current_price;
                row.detail.price_change_pct = update.price_change_pct;
                row.detail.low_52w = update.low_52w;
                row.detail.high_52w = update.high_52w;
                hit = true;
            }
            if hit {
                matched += 1;
            }
        }

        self.touched.insert(portfolio_id);
        Ok(matched)
    }

    async fn recompute_avg_return(&mut self, portfolio_id: i64) -> Result<Decimal> {
        let avg = round_avg_return(weighted_avg_return(
            self.working
                .details_of(portfolio_id)
                .map(|d| (d.portfolio_weight_pct, d.price_change_pct)),
        ));

        self.working.portfolio_mut(portfolio_id)?.avg_return = Some(avg);
        self.touched.insert(portfolio_id);
        Ok(avg)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction {
            shared,
            working,
            inserted,
            touched,
        } = *self;
        let mut shared = shared.lock().await;

        for id in &inserted {
            let Some(row) = working.portfolios.iter().find(|p| p.id == *id) else {
                continue;
            };
            if shared
                .find(&row.summary.investor_code, row.summary.as_of_date)
                .is_some()
            {
                return Err(DataError::DuplicateError(format!(
                    "investor_portfolio ({}, {})",
                    row.summary.investor_code, row.summary.as_of_date
                )));
            }
        }

        for id in touched {
            let Some(row) = working.portfolios.iter().find(|p| p.id == id) else {
                continue;
            };
            match shared.portfolios.iter_mut().find(|p| p.id == id) {
                Some(existing) => *existing = row.clone(),
                None => shared.portfolios.push(row.clone()),
            }

            shared.details.retain(|d| d.portfolio_id != id);
            shared.details.extend(
                working
                    .details
                    .iter()
                    .filter(|d| d.portfolio_id == id)
                    .cloned(),
            );
        }

        Ok(())
    }
}
