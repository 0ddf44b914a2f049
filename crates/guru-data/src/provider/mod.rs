//! 상위 사이트 크롤링 Provider 모듈.
//!
//! 두 종류의 페이지만 다룹니다.
//!
//! ## 투자자 순위 페이지
//! - `listing`: `table#grid` 행을 `InvestorRanking`으로 변환, 가치 내림차순 상위 N명
//!
//! ## 보유 종목 페이지
//! - `holdings`: 요약(`p#p2`), 상세(`table#grid tbody`), 페이지 링크(`div#pages`)
//! - `crawler`: 1페이지 + 추가 페이지를 순회해 하나의 스냅샷으로 병합
//!
//! ## 공통
//! - `fetcher`: 요청마다 무작위 User-Agent, 명시적 타임아웃 (`PageSource` trait)
//! - `normalize`: `$12.5B`, `-3.25%` 같은 표기를 숫자로 변환
//! - `extract`: 셀 텍스트에서 타입 있는 행 레코드 추출

pub mod crawler;
pub mod extract;
pub mod fetcher;
pub mod holdings;
mod html;
pub mod listing;
pub mod normalize;
pub mod site;

pub use crawler::{CrawlResult, CrawlerConfig, PortfolioCrawler, RankingResult};
pub use extract::{CellText, NameRule, RecentActivity, NAME_RULES};
pub use fetcher::{HttpPageFetcher, PageSource, HOLDINGS_TIMEOUT, LISTING_TIMEOUT};
pub use holdings::{parse_detail_page, parse_first_page, FirstPage};
pub use listing::{parse_investor_listing, parse_top_investors};
pub use site::{HoldingsLink, SiteUrls};
