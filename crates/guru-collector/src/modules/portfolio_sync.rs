//! 투자자 포트폴리오 동기화 모듈.
//!
//! 순위 조회 → 투자자별 크롤링 → 스냅샷 조정 → (신규 저장 시) 게시글 등록.
//! 순위 페이지 실패만 실행 전체를 중단시키고, 투자자 단위 실패는 통계에만 남습니다.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use guru_core::{InvestorRanking, RunContext};
use guru_data::{reconcile, PageSource, PortfolioCrawler, ReconcileOutcome, SnapshotStore};
use guru_notification::{PostRequest, PostSender};
use tracing::Instrument;

use crate::error::CollectorError;
use crate::stats::SyncStats;
use crate::Result;

/// 동기화 실행 옵션
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// 수집할 상위 투자자 수
    pub top_count: usize,
    /// 동시에 처리할 투자자 수 (결과는 순위 순서 유지)
    pub concurrency: usize,
    /// 게시글 작성자 태그
    pub writer: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            top_count: 10,
            concurrency: 1,
            writer: "admin".to_string(),
        }
    }
}

/// 투자자 한 명의 처리 결과
#[derive(Debug, Default)]
struct InvestorResult {
    outcome: Option<ReconcileOutcome>,
    /// 게시글 등록 시도 결과 (시도하지 않았으면 None)
    posted: Option<bool>,
    skipped_rows: usize,
    pages_omitted: usize,
}

/// 상위 투자자 포트폴리오를 동기화합니다.
pub async fn sync_portfolios<S: PageSource>(
    crawler: &PortfolioCrawler<S>,
    store: &dyn SnapshotStore,
    poster: Option<&dyn PostSender>,
    options: &SyncOptions,
    ctx: &RunContext,
) -> Result<SyncStats> {
    async move {
        let start = Instant::now();
        let mut stats = SyncStats::new();

        tracing::info!(top = options.top_count, "포트폴리오 동기화 시작");

        let ranking = crawler.fetch_ranking(options.top_count).await?;
        ranking.report.log();
        stats.total = ranking.investors.len();

        if ranking.investors.is_empty() {
            tracing::warn!("순위 페이지에서 투자자를 찾지 못했습니다");
        }

        let results: Vec<InvestorResult> = stream::iter(ranking.investors.iter())
            .map(|investor| {
                sync_investor(crawler, store, poster, &options.writer, investor)
                    .instrument(ctx.investor_span(&investor.code, &investor.name))
            })
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

        for result in results {
            stats.skipped_rows += result.skipped_rows;
            stats.pages_omitted += result.pages_omitted;

            match result.outcome {
                Some(ReconcileOutcome::Created { .. }) => stats.created += 1,
                Some(ReconcileOutcome::Updated { .. }) => stats.updated += 1,
                None => stats.failed += 1,
            }

            match result.posted {
                Some(true) => stats.posted += 1,
                Some(false) => stats.post_failed += 1,
                None => {}
            }
        }

        stats.elapsed = start.elapsed();
        Ok::<_, CollectorError>(stats)
    }
    .instrument(ctx.span())
    .await
}

async fn sync_investor<S: PageSource>(
    crawler: &PortfolioCrawler<S>,
    store: &dyn SnapshotStore,
    poster: Option<&dyn PostSender>,
    writer: &str,
    investor: &InvestorRanking,
) -> InvestorResult {
    let mut result = InvestorResult::default();

    let crawled = match crawler.crawl_investor(&investor.code).await {
        Ok(crawled) => crawled,
        Err(e) => {
            tracing::error!(error = %e, "보유 종목 수집 실패");
            return result;
        }
    };

    crawled.report.log();
    result.skipped_rows = crawled.report.rows_skipped();
    result.pages_omitted = crawled.report.pages_omitted();
    if result.skipped_rows > 0 {
        tracing::warn!(skipped_rows = result.skipped_rows, "일부 행을 건너뛰었습니다");
    }

    let outcome = match reconcile(store, &investor.name, &crawled.snapshot).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "스냅샷 저장 실패, 투자자 단위 롤백");
            return result;
        }
    };

    if let ReconcileOutcome::Created { portfolio_id, .. } = outcome {
        if let Some(poster) = poster.filter(|p| p.is_enabled()) {
            let request = PostRequest::for_snapshot(
                &investor.name,
                crawled.snapshot.summary.as_of_date,
                portfolio_id,
                &investor.storage_code(),
                writer,
            );
            result.posted = Some(match poster.create_post(&request).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(sender = poster.name(), error = %e, "게시글 등록 실패");
                    false
                }
            });
        }
    }

    result.outcome = Some(outcome);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use guru_data::{CrawlerConfig, FetchError, FetchErrorKind, MemorySnapshotStore, SiteUrls};
    use guru_notification::{NotificationError, NotificationResult};
    use reqwest::{StatusCode, Url};
    use rust_decimal_macros::dec;

    const BASE: &str = "https://dataroma.com";

    #[derive(Default)]
    struct FixtureSite {
        pages: Mutex<HashMap<String, String>>,
    }

    impl FixtureSite {
        fn set(&self, url: String, html: String) {
            self.pages.lock().unwrap().insert(url, html);
        }
    }

    #[async_trait]
    impl PageSource for FixtureSite {
        async fn fetch_page(
            &self,
            url: &Url,
            _timeout: Duration,
        ) -> std::result::Result<String, FetchError> {
            self.pages
                .lock()
                .unwrap()
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| {
                    FetchError::new(url.as_str(), FetchErrorKind::Status(StatusCode::NOT_FOUND))
                })
        }
    }

    /// 요청을 기록하는 게시글 전송기
    #[derive(Default)]
    struct RecordingPoster {
        requests: Mutex<Vec<PostRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PostSender for RecordingPoster {
        async fn create_post(&self, request: &PostRequest) -> NotificationResult<()> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                Err(NotificationError::SendFailed("success=false".to_string()))
            } else {
                Ok(())
            }
        }

        fn is_enabled(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn listing() -> String {
        r#"<table id="grid">
            <tr><td>Manager</td><td>Value</td><td>Stocks</td></tr>
            <tr><td><a href="/m/holdings.php?m=BRK">Warren Buffett - Berkshire Hathaway</a></td><td>$300,000</td><td>2</td></tr>
            <tr><td><a href="/m/holdings.php?m=psc">Bill Ackman - Pershing Square</a></td><td>$100,000</td><td>1</td></tr>
        </table>"#
            .to_string()
    }

    fn holdings(ticker: &str, current: &str, change: &str) -> String {
        format!(
            r#"<html><body>
            <p id="p2">Period: <span>Q4 2024</span> Portfolio date: <span>31 Dec 2024</span>
               No. of stocks: <span>1</span> Portfolio value: <span>$300,000</span></p>
            <table id="grid"><tbody>
              <tr><td></td>
                <td class="stock"><a href="/m/stock.php?sym={ticker}">{ticker}<span> - {ticker} Inc.</span></a></td>
                <td>100.00</td><td>Add 5.00%</td><td>1,000</td><td>$100.00</td><td>$100,000</td><td></td>
                <td>{current}</td><td>{change}</td><td>$80.00</td><td>$150.00</td></tr>
            </tbody></table>
            </body></html>"#
        )
    }

    fn holdings_url(code: &str) -> String {
        format!("{}/m/holdings.php?m={}&L=1", BASE, code)
    }

    fn crawler(site: &FixtureSite) -> PortfolioCrawler<&FixtureSite> {
        PortfolioCrawler::new(site, SiteUrls::new(BASE).unwrap(), CrawlerConfig::default())
    }

    fn options(concurrency: usize) -> SyncOptions {
        SyncOptions {
            top_count: 5,
            concurrency,
            writer: "bot".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failed_investor_does_not_stop_run() {
        let site = FixtureSite::default();
        site.set(format!("{}/m/managers.php", BASE), listing());
        site.set(holdings_url("BRK"), holdings("AAPL", "$110.00", "10.00%"));
        // psc 보유 종목 페이지 없음 → 해당 투자자만 실패

        let store = MemorySnapshotStore::new();
        let poster = RecordingPoster::default();
        let stats = sync_portfolios(
            &crawler(&site),
            &store,
            Some(&poster),
            &options(1),
            &RunContext::new(),
        )
        .await
        .unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.posted, 1);
        assert_eq!(store.portfolio_count().await, 1);

        let requests = poster.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].title,
            "Warren Buffett - Berkshire Hathaway 포트폴리오 (2024-12-31)"
        );
        assert_eq!(requests[0].investor_code, "BRK");
        assert_eq!(requests[0].writer, "bot");
    }

    #[tokio::test]
    async fn test_second_run_updates_without_post() {
        let site = FixtureSite::default();
        site.set(format!("{}/m/managers.php", BASE), listing());
        site.set(holdings_url("BRK"), holdings("AAPL", "$110.00", "10.00%"));
        site.set(holdings_url("psc"), holdings("CMG", "$50.00", "-50.00%"));

        let store = MemorySnapshotStore::new();
        let poster = RecordingPoster::default();
        let crawler = crawler(&site);
        let ctx = RunContext::new();

        let first = sync_portfolios(&crawler, &store, Some(&poster), &options(2), &ctx)
            .await
            .unwrap();
        assert_eq!((first.created, first.updated, first.posted), (2, 0, 2));

        site.set(holdings_url("BRK"), holdings("AAPL", "$120.00", "20.00%"));
        let second = sync_portfolios(&crawler, &store, Some(&poster), &options(2), &ctx)
            .await
            .unwrap();

        assert_eq!((second.created, second.updated, second.posted), (0, 2, 0));
        assert_eq!(store.portfolio_count().await, 2);
        assert_eq!(poster.requests.lock().unwrap().len(), 2);

        // 처리 순서와 무관하게 BRK 수익률만 20%로 재계산됨
        let mut returns = vec![store.avg_return(1).await, store.avg_return(2).await];
        returns.sort();
        assert_eq!(returns, vec![Some(dec!(-50)), Some(dec!(20))]);
    }

    #[tokio::test]
    async fn test_post_failure_is_counted() {
        let site = FixtureSite::default();
        site.set(format!("{}/m/managers.php", BASE), listing());
        site.set(holdings_url("BRK"), holdings("AAPL", "$110.00", "10.00%"));
        site.set(holdings_url("psc"), holdings("CMG", "$50.00", "-50.00%"));

        let store = MemorySnapshotStore::new();
        let poster = RecordingPoster {
            fail: true,
            ..Default::default()
        };
        let stats = sync_portfolios(
            &crawler(&site),
            &store,
            Some(&poster),
            &options(1),
            &RunContext::new(),
        )
        .await
        .unwrap();

        assert_eq!(stats.created, 2);
        assert_eq!(stats.post_failed, 2);
        assert_eq!(stats.posted, 0);
        assert_eq!(store.portfolio_count().await, 2);
    }

    #[tokio::test]
    async fn test_ranking_failure_is_fatal() {
        let site = FixtureSite::default();
        let store = MemorySnapshotStore::new();

        let err = sync_portfolios(&crawler(&site), &store, None, &options(1), &RunContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CollectorError::Ranking(_)));
        assert_eq!(store.portfolio_count().await, 0);
    }
}
