//! 상위 사이트 URL 템플릿.
//!
//! - 순위 페이지: `{base}/m/managers.php`
//! - 보유 종목 페이지: `{base}/m/holdings.php?m={code}&L={page}` (page는 1부터)

use guru_core::MAX_INVESTOR_CODE_LEN;
use reqwest::Url;

use crate::error::ParseError;

const LISTING_PATH: &str = "/m/managers.php";
const HOLDINGS_PATH: &str = "/m/holdings.php";
const HOLDINGS_FILE: &str = "holdings.php";

/// 보유 종목 링크에서 추출한 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingsLink {
    /// 투자자 코드 (`m` 파라미터)
    pub code: String,
    /// 페이지 번호 (`L` 파라미터)
    pub page: Option<u32>,
    /// 절대 URL
    pub url: Url,
}

/// 사이트 URL 빌더.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
    listing: Url,
    holdings: Url,
}

impl SiteUrls {
    /// 사이트 루트 URL로 생성합니다 (예: "https://dataroma.com").
    pub fn new(base: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidField {
            field: "base url",
            value: base.to_string(),
        };
        let base = Url::parse(base).map_err(|_| invalid())?;
        let listing = base.join(LISTING_PATH).map_err(|_| invalid())?;
        let holdings = base.join(HOLDINGS_PATH).map_err(|_| invalid())?;

        Ok(Self {
            base,
            listing,
            holdings,
        })
    }

    /// 투자자 순위 페이지 URL.
    pub fn listing_url(&self) -> Url {
        self.listing.clone()
    }

    /// 투자자 보유 종목 페이지 URL.
    pub fn holdings_url(&self, code: &str, page: u32) -> Url {
        let mut url = self.holdings.clone();
        url.query_pairs_mut()
            .append_pair("m", code)
            .append_pair("L", &page.to_string());
        url
    }

    /// 상대 href를 절대 URL로 변환합니다.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.base.join(href.trim()).ok()
    }

    /// href가 보유 종목 링크이면 코드와 페이지 번호를 추출합니다.
    pub fn parse_holdings_link(&self, href: &str) -> Option<HoldingsLink> {
        let url = self.resolve(href)?;
        if !url.path().ends_with(HOLDINGS_FILE) {
            return None;
        }

        let mut code = None;
        let mut page = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "m" => code = Some(value.into_owned()),
                "L" => page = value.parse().ok(),
                _ => {}
            }
        }

        let code = code.filter(|c| is_investor_code(c))?;
        Some(HoldingsLink { code, page, url })
    }
}

/// 투자자 코드 형식 (영숫자/밑줄, 1..=`MAX_INVESTOR_CODE_LEN`자).
fn is_investor_code(code: &str) -> bool {
    (1..=MAX_INVESTOR_CODE_LEN).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
