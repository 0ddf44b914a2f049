//! 투자자 단위 페이지 순회 크롤러.
//!
//! 1페이지에서 요약과 상세, 페이지 링크를 읽고 나머지 페이지를 순서대로 가져와
//! 상세를 이어 붙입니다. 1페이지 실패는 투자자 단위 오류이고,
//! 이후 페이지 실패는 `PageOmitted` 진단으로만 남깁니다.

use std::time::Duration;

use guru_core::{BatchReport, Diagnostic, InvestorRanking, PortfolioSnapshot};
use tracing::{debug, info};

use super::fetcher::{PageSource, HOLDINGS_TIMEOUT, LISTING_TIMEOUT};
use super::holdings::{parse_detail_page, parse_first_page};
use super::listing::parse_top_investors;
use super::site::SiteUrls;
use crate::error::{CrawlError, FetchError};

/// 크롤러 설정.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// 순위 페이지 타임아웃
    pub listing_timeout: Duration,
    /// 보유 종목 페이지 타임아웃
    pub holdings_timeout: Duration,
    /// 같은 투자자의 페이지 요청 사이 대기 시간
    pub page_delay: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_timeout: LISTING_TIMEOUT,
            holdings_timeout: HOLDINGS_TIMEOUT,
            page_delay: Duration::ZERO,
        }
    }
}

/// 순위 조회 결과 (정렬/절단 완료).
#[derive(Debug, Clone)]
pub struct RankingResult {
    pub investors: Vec<InvestorRanking>,
    pub report: BatchReport,
}

/// 한 투자자 크롤링 결과.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub snapshot: PortfolioSnapshot,
    /// 행 스킵, 필드 대체, 페이지 누락 진단
    pub report: BatchReport,
    /// 실제로 반영된 페이지 수
    pub pages_fetched: usize,
}

/// 페이지 순회 크롤러.
pub struct PortfolioCrawler<S> {
    source: S,
    site: SiteUrls,
    config: CrawlerConfig,
}

impl<S: PageSource> PortfolioCrawler<S> {
    pub fn new(source: S, site: SiteUrls, config: CrawlerConfig) -> Self {
        Self {
            source,
            site,
            config,
        }
    }

    /// 순위 페이지를 가져와 상위 `requested`명을 반환합니다.
    ///
    /// 가져오기 실패는 호출자에게 그대로 전달됩니다 (실행 단위 치명 오류).
    pub async fn fetch_ranking(&self, requested: usize) -> Result<RankingResult, CrawlError> {
        let url = self.site.listing_url();
        let html = self
            .source
            .fetch_page(&url, self.config.listing_timeout)
            .await?;

        let parsed = parse_top_investors(&html, &self.site, requested).map_err(|source| {
            CrawlError::Parse {
                url: url.to_string(),
                source,
            }
        })?;

        let mut report = BatchReport::new();
        let investors = report.absorb(parsed);
        info!(
            count = investors.len(),
            skipped = report.rows_skipped(),
            "투자자 순위 파싱 완료"
        );

        Ok(RankingResult { investors, report })
    }

    /// 한 투자자의 모든 보유 종목 페이지를 크롤링합니다.
    pub async fn crawl_investor(&self, investor_code: &str) -> Result<CrawlResult, CrawlError> {
        let first_url = self.site.holdings_url(investor_code, 1);
        let html = self
            .source
            .fetch_page(&first_url, self.config.holdings_timeout)
            .await?;

        let first = parse_first_page(&html, investor_code, &self.site).map_err(|source| {
            CrawlError::Parse {
                url: first_url.to_string(),
                source,
            }
        })?;

        let mut report = BatchReport::new();
        let mut details = report.absorb(first.details);
        let mut pages_fetched = 1;

        if !first.next_pages.is_empty() {
            debug!(pages = first.next_pages.len() + 1, "페이지 링크 발견");
        }

        for url in &first.next_pages {
            if !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }

            let html = match self
                .source
                .fetch_page(url, self.config.holdings_timeout)
                .await
            {
                Ok(html) => html,
                Err(e) => {
                    report.push(page_omitted(url.as_str(), &e));
                    continue;
                }
            };

            match parse_detail_page(&html, url.as_str()) {
                Ok(parsed) => {
                    let page_details = report.absorb(parsed);
                    debug!(url = %url, rows = page_details.len(), "페이지 상세 추가");
                    details.extend(page_details);
                    pages_fetched += 1;
                }
                Err(e) => report.push(Diagnostic::page_omitted(url.as_str(), e.to_string())),
            }
        }

        Ok(CrawlResult {
            snapshot: PortfolioSnapshot::new(first.summary, details),
            report,
            pages_fetched,
        })
    }
}

fn page_omitted(url: &str, error: &FetchError) -> Diagnostic {
    Diagnostic::page_omitted(url, error.kind.to_string())
}
