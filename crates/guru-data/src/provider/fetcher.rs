//! 페이지 가져오기.
//!
//! 요청마다 새로 고른 User-Agent와 명시적 타임아웃으로 GET 한 번을 수행합니다.
//! 실패는 URL과 원인을 담은 `FetchError`로 반환하며, 중단 여부는 호출자가 결정합니다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{header, Client, Url};
use tracing::debug;

use crate::error::{FetchError, FetchErrorKind};

/// 순위 페이지 기본 타임아웃
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(10);
/// 보유 종목 페이지 기본 타임아웃
pub const HOLDINGS_TIMEOUT: Duration = Duration::from_secs(15);

/// 요청마다 무작위로 고르는 브라우저 User-Agent 목록
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// 무작위 User-Agent 선택.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// HTML 페이지 소스.
///
/// 크롤러는 이 trait에만 의존하므로 테스트에서는 고정 HTML로 대체할 수 있습니다.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// URL의 본문을 가져옵니다.
    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for &T {
    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        (**self).fetch_page(url, timeout).await
    }
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        (**self).fetch_page(url, timeout).await
    }
}

/// reqwest 기반 페이지 가져오기.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// 기본 클라이언트로 생성합니다.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .build()
            .map_err(|e| FetchError::new("-", FetchErrorKind::Transport(e.to_string())))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        let user_agent = random_user_agent();
        debug!(url = %url, user_agent, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(header::USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url.as_str(), FetchErrorKind::Status(status)));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))
    }
}
