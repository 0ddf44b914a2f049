//! 보유 종목 페이지 파서.
//!
//! 한 페이지에서 다음을 추출합니다:
//! - 요약 (`p#p2`의 span 4개: 분기, 기준일, 종목 수, 총 가치) - 첫 페이지 전용, 실패 시 치명
//! - 상세 (`table#grid tbody tr`) - 행 단위 실패는 진단으로 남기고 건너뜀
//! - 페이지 링크 (`div#pages a`) - 렌더링된 번호와 URL의 `L` 값이 같은 링크만 사용
//!
//! `scraper::Html`은 `Send`가 아니므로 모든 함수는 동기이며 소유 데이터만 반환합니다.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use guru_core::{Diagnostic, HoldingDetail, Parsed, PortfolioSummary};
use reqwest::Url;
use scraper::Html;

use super::extract::extract_holding_row;
use super::html::{element_text, selector, CellSelectors};
use super::normalize::{parse_count, parse_currency};
use super::site::SiteUrls;
use crate::error::ParseError;

const SUMMARY_SELECTOR: &str = "p#p2";
const DETAIL_ROWS_SELECTOR: &str = "table#grid tbody tr";
const PAGE_LINKS_SELECTOR: &str = "div#pages a[href]";

/// 요약 영역의 필수 필드 수
pub const SUMMARY_FIELDS: usize = 4;

/// 기준일 표기 형식 (예: "31 Mar 2025")
const SUMMARY_DATE_FORMAT: &str = "%d %b %Y";

/// 첫 페이지 파싱 결과.
#[derive(Debug, Clone)]
pub struct FirstPage {
    pub summary: PortfolioSummary,
    pub details: Parsed<Vec<HoldingDetail>>,
    /// 추가로 가져올 페이지 URL (페이지 번호 오름차순)
    pub next_pages: Vec<Url>,
}

/// 첫 페이지를 파싱합니다. 요약 파싱 실패는 오류로 반환합니다.
pub fn parse_first_page(
    html: &str,
    investor_code: &str,
    site: &SiteUrls,
) -> Result<FirstPage, ParseError> {
    let document = Html::parse_document(html);

    let summary = parse_summary(&document, investor_code)?;
    let details = parse_details(&document, "page 1")?;
    let next_pages = discover_pages(&document, investor_code, site)?;

    Ok(FirstPage {
        summary,
        details,
        next_pages,
    })
}

/// 2페이지 이후의 상세만 파싱합니다.
pub fn parse_detail_page(html: &str, page_label: &str) -> Result<Parsed<Vec<HoldingDetail>>, ParseError> {
    let document = Html::parse_document(html);
    parse_details(&document, page_label)
}

/// 요약 영역 파싱.
pub fn parse_summary(document: &Html, investor_code: &str) -> Result<PortfolioSummary, ParseError> {
    let summary_selector = selector(SUMMARY_SELECTOR)?;
    let span_selector = selector("span")?;

    let region = document
        .select(&summary_selector)
        .next()
        .ok_or_else(|| ParseError::MissingElement(SUMMARY_SELECTOR.to_string()))?;

    let fields: Vec<String> = region.select(&span_selector).map(element_text).collect();
    if fields.len() < SUMMARY_FIELDS {
        return Err(ParseError::IncompleteSummary {
            found: fields.len(),
            expected: SUMMARY_FIELDS,
        });
    }

    let period = fields[0].clone();
    if period.is_empty() {
        return Err(ParseError::InvalidField {
            field: "period",
            value: period,
        });
    }

    let as_of_date = NaiveDate::parse_from_str(&fields[1], SUMMARY_DATE_FORMAT).map_err(|_| {
        ParseError::InvalidField {
            field: "portfolio date",
            value: fields[1].clone(),
        }
    })?;

    let stock_count = parse_count(&fields[2])
        .and_then(|n| i32::try_from(n).ok())
        .filter(|n| *n >= 0)
        .ok_or_else(|| ParseError::InvalidField {
            field: "stock count",
            value: fields[2].clone(),
        })?;

    let total_value = parse_currency(&fields[3]).ok_or_else(|| ParseError::InvalidField {
        field: "portfolio value",
        value: fields[3].clone(),
    })?;

    Ok(PortfolioSummary {
        investor_code: investor_code.to_string(),
        period,
        as_of_date,
        stock_count,
        total_value,
    })
}

/// 상세 표 파싱.
///
/// 표가 없으면 빈 목록과 진단 하나를 반환합니다.
pub fn parse_details(document: &Html, page_label: &str) -> Result<Parsed<Vec<HoldingDetail>>, ParseError> {
    let row_selector = selector(DETAIL_ROWS_SELECTOR)?;
    let cells = CellSelectors::new()?;

    let mut details = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen_rows = false;

    for (index, tr) in document.select(&row_selector).enumerate() {
        seen_rows = true;
        let location = format!("{} row {}", page_label, index + 1);
        match extract_holding_row(&cells.row(tr), &location) {
            Ok(parsed) => {
                diagnostics.extend(parsed.diagnostics);
                details.push(parsed.value);
            }
            Err(skipped) => diagnostics.push(skipped),
        }
    }

    if !seen_rows {
        diagnostics.push(Diagnostic::table_missing(
            page_label,
            "holdings table has no rows",
        ));
    }

    Ok(Parsed::with_diagnostics(details, diagnostics))
}

/// 페이지 링크 탐색.
///
/// 링크 텍스트가 숫자이고 1이 아니며, href가 같은 투자자의 보유 종목 링크이고
/// `L` 값이 링크 텍스트와 같은 경우만 채택합니다. 결과는 페이지 번호 오름차순입니다.
pub fn discover_pages(
    document: &Html,
    investor_code: &str,
    site: &SiteUrls,
) -> Result<Vec<Url>, ParseError> {
    let link_selector = selector(PAGE_LINKS_SELECTOR)?;
    let mut pages = BTreeMap::new();

    for anchor in document.select(&link_selector) {
        let text = element_text(anchor);
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let Ok(number) = text.parse::<u32>() else {
            continue;
        };
        if number == 1 {
            continue;
        }

        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| site.parse_holdings_link(href))
        else {
            continue;
        };

        if link.code.eq_ignore_ascii_case(investor_code) && link.page == Some(number) {
            pages.entry(number).or_insert(link.url);
        }
    }

    Ok(pages.into_values().collect())
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! 테스트용 보유 종목 페이지 HTML.

    pub fn holding_row(ticker: &str, name: &str, weight: &str, activity: &str, change: &str) -> String {
        format!(
            r#"<tr>
              <td class="hist"><a href="/m/hist/hist.php?f={t}">H</a></td>
              <td class="stock"><a href="/m/stock.php?sym={t}">{t}<span> - {n}</span></a></td>
              <td>{w}</td>
              <td class="buy">{a}</td>
              <td>1,000</td>
              <td>$100.00</td>
              <td>$100,000</td>
              <td></td>
              <td>$110.00</td>
              <td>{c}</td>
              <td>$80.00</td>
              <td>$120.00</td>
            </tr>"#,
            t = ticker,
            n = name,
            w = weight,
            a = activity,
            c = change,
        )
    }

    pub fn holdings_page(summary: Option<&str>, rows: &[String], pages: &str) -> String {
        let summary = summary
            .map(|s| format!(r#"<p id="p2">{}</p>"#, s))
            .unwrap_or_default();
        format!(
            r#"<html><body>
            <div id="wrap">
              {summary}
              <div id="pages">{pages}</div>
              <table id="grid">
                <thead><tr><td></td><td>Stock</td><td>% of portfolio</td><td>Recent activity</td>
                  <td>Shares</td><td>Reported Price</td><td>Value</td><td></td>
                  <td>Current Price</td><td>+/- Reported Price</td><td>52 week low</td><td>52 week high</td></tr></thead>
                <tbody>{rows}</tbody>
              </table>
            </div>
            </body></html>"#,
            summary = summary,
            pages = pages,
            rows = rows.join("\n"),
        )
    }

    pub const SUMMARY: &str = "Period: <span>Q4 2024</span><br>Portfolio date: <span>31 Dec 2024</span><br>\
        No. of stocks: <span>3</span><br>Portfolio value: <span>$300,000</span>";
}
