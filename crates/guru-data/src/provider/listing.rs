//! 투자자 순위 페이지 파서.
//!
//! `table#grid`의 각 행에서 보유 종목 링크(`/m/holdings.php?m=CODE`)로 투자자 코드를,
//! 링크 텍스트로 이름을, 두 번째 셀로 포트폴리오 가치를 읽습니다.

use guru_core::{top_investors, Diagnostic, InvestorRanking, Parsed};
use scraper::Html;

use super::extract::{extract_investor_row, CellText};
use super::html::{selector, CellSelectors};
use super::site::SiteUrls;
use crate::error::ParseError;

const TABLE_SELECTOR: &str = "table#grid";

/// 순위 페이지의 모든 투자자 행을 파싱합니다 (정렬 전, 페이지 순서).
///
/// 표를 찾을 수 없으면 빈 목록과 진단을 반환합니다. 개별 행 실패는 진단으로만 남습니다.
pub fn parse_investor_listing(
    html: &str,
    site: &SiteUrls,
) -> Result<Parsed<Vec<InvestorRanking>>, ParseError> {
    let document = Html::parse_document(html);
    let table_selector = selector(TABLE_SELECTOR)?;
    let tr_selector = selector("tr")?;
    let cells = CellSelectors::new()?;

    let Some(table) = document.select(&table_selector).next() else {
        return Ok(Parsed::with_diagnostics(
            Vec::new(),
            vec![Diagnostic::row_skipped(
                TABLE_SELECTOR,
                "investor table not found",
            )],
        ));
    };

    let mut investors = Vec::new();
    let mut diagnostics = Vec::new();
    let mut first_data_row = true;

    for (index, tr) in table.select(&tr_selector).enumerate() {
        let row = cells.row(tr);
        // th만 있는 헤더 행
        if row.is_empty() {
            continue;
        }

        // 첫 행의 첫 셀에 보유 종목 링크가 없으면 헤더로 간주
        if std::mem::take(&mut first_data_row) && !has_holdings_link(&row[0], site) {
            continue;
        }

        let location = format!("listing row {}", index + 1);
        match extract_investor_row(&row, &location, site) {
            Ok(parsed) => {
                diagnostics.extend(parsed.diagnostics);
                investors.push(parsed.value);
            }
            Err(skipped) => diagnostics.push(skipped),
        }
    }

    Ok(Parsed::with_diagnostics(investors, diagnostics))
}

/// 순위 페이지를 파싱해 가치 내림차순 상위 `requested`명을 반환합니다.
pub fn parse_top_investors(
    html: &str,
    site: &SiteUrls,
    requested: usize,
) -> Result<Parsed<Vec<InvestorRanking>>, ParseError> {
    Ok(parse_investor_listing(html, site)?.map(|all| top_investors(all, requested)))
}

fn has_holdings_link(cell: &CellText, site: &SiteUrls) -> bool {
    cell.href
        .as_deref()
        .and_then(|href| site.parse_holdings_link(href))
        .is_some()
}
