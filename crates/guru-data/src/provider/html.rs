//! scraper 요소를 추출기 입력(`CellText`)으로 바꾸는 보조 함수.

use scraper::{ElementRef, Selector};

use super::extract::CellText;
use crate::error::ParseError;

/// CSS 선택자 파싱.
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::InvalidSelector(format!("{}: {}", css, e)))
}

/// 요소의 텍스트를 공백 하나로 정규화해 모읍니다.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 셀 선택에 쓰는 선택자 묶음.
pub(crate) struct CellSelectors {
    td: Selector,
    anchor: Selector,
    span: Selector,
}

impl CellSelectors {
    pub(crate) fn new() -> Result<Self, ParseError> {
        Ok(Self {
            td: selector("td")?,
            anchor: selector("a")?,
            span: selector("span")?,
        })
    }

    /// `td` 하나를 셀 텍스트로 변환합니다.
    pub(crate) fn cell(&self, td: ElementRef<'_>) -> CellText {
        let mut cell = CellText::plain(element_text(td));

        if let Some(a) = td.select(&self.anchor).next() {
            cell.link_text = Some(element_text(a));
            cell.href = a.value().attr("href").map(str::to_string);
        }
        if let Some(span) = td.select(&self.span).next() {
            cell.nested_text = Some(element_text(span));
        }

        cell
    }

    /// 행의 `td` 셀 목록 (`th`는 제외).
    pub(crate) fn row(&self, tr: ElementRef<'_>) -> Vec<CellText> {
        tr.select(&self.td).map(|td| self.cell(td)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_row_cells() {
        let html = Html::parse_fragment(
            r#"<table><tr>
                <td>1</td>
                <td class="stock"><a href="/m/stock.php?sym=AAPL">AAPL<span> - Apple   Inc.</span></a></td>
            </tr></table>"#,
        );
        let cells = CellSelectors::new().unwrap();
        let tr = html.select(&selector("tr").unwrap()).next().unwrap();
        let row = cells.row(tr);

        assert_eq!(row.len(), 2);
        assert_eq!(row[0], CellText::plain("1"));
        assert_eq!(row[1].text, "AAPL - Apple Inc.");
        assert_eq!(row[1].link_text.as_deref(), Some("AAPL - Apple Inc."));
        assert_eq!(row[1].href.as_deref(), Some("/m/stock.php?sym=AAPL"));
        assert_eq!(row[1].nested_text.as_deref(), Some("- Apple Inc."));
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            selector("td[").unwrap_err(),
            ParseError::InvalidSelector(_)
        ));
    }
}
