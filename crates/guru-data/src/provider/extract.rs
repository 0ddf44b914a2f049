//! 표 행 추출기.
//!
//! HTML 요소 대신 셀 단위 텍스트(`CellText`)를 입력으로 받아
//! 투자자 순위 행 또는 보유 종목 행을 타입이 있는 레코드로 변환합니다.
//!
//! 회사명처럼 표기 방식이 행마다 다른 필드는 우선순위가 있는 규칙 목록
//! (`NAME_RULES`)으로 표현하며, 비어 있지 않은 첫 결과를 사용합니다.

use guru_core::{
    truncate_ticker, ActivityKind, Diagnostic, HoldingDetail, InvestorRanking, Parsed,
    MAX_ACTIVITY_KIND_LEN, MAX_TICKER_LEN,
};
use rust_decimal::Decimal;

use super::normalize::{
    currency_or_zero, parse_count, parse_currency, parse_decimal, parse_percent,
};
use super::site::SiteUrls;

/// 투자자 순위 행의 최소 컬럼 수
pub const MIN_INVESTOR_COLUMNS: usize = 3;
/// 보유 종목 행의 최소 컬럼 수
pub const MIN_HOLDING_COLUMNS: usize = 12;

/// "TICKER - Company Name" 구분자
const NAME_SEPARATOR: &str = " - ";

/// 행 추출 결과: 값(+진단) 또는 건너뛴 사유.
pub type RowResult<T> = Result<Parsed<T>, Diagnostic>;

/// 표 셀 하나의 텍스트 구성.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellText {
    /// 셀 전체 텍스트 (trim)
    pub text: String,
    /// 첫 번째 링크 텍스트
    pub link_text: Option<String>,
    /// 첫 번째 링크 href
    pub href: Option<String>,
    /// 중첩 요소(span) 텍스트
    pub nested_text: Option<String>,
}

impl CellText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link_text: impl Into<String>, href: impl Into<String>) -> Self {
        self.link_text = Some(link_text.into());
        self.href = Some(href.into());
        self
    }

    pub fn with_nested(mut self, nested_text: impl Into<String>) -> Self {
        self.nested_text = Some(nested_text.into());
        self
    }

    /// 티커/이름 해석에 사용할 원문 (링크 텍스트 우선).
    fn raw_label(&self) -> &str {
        self.link_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.text.trim())
    }
}

/// 회사명 해석 규칙 (우선순위 순서로 시도).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// 중첩 요소의 텍스트
    NestedElement,
    /// 원문을 `" - "`로 나눈 뒷부분
    SeparatorSplit,
    /// 셀 텍스트에서 티커를 뺀 나머지
    CellRemainder,
    /// 티커를 그대로 이름으로 사용
    TickerMirror,
}

/// 회사명 규칙 테이블.
pub const NAME_RULES: [NameRule; 4] = [
    NameRule::NestedElement,
    NameRule::SeparatorSplit,
    NameRule::CellRemainder,
    NameRule::TickerMirror,
];

impl NameRule {
    fn apply(self, cell: &CellText, ticker: &str) -> Option<String> {
        let candidate = match self {
            Self::NestedElement => cell.nested_text.as_deref().map(strip_dash_prefix),
            Self::SeparatorSplit => cell
                .raw_label()
                .split_once(NAME_SEPARATOR)
                .map(|(_, name)| name.trim()),
            Self::CellRemainder => cell
                .text
                .trim()
                .strip_prefix(ticker)
                .map(strip_dash_prefix),
            Self::TickerMirror => Some(ticker),
        };

        candidate
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// 앞쪽의 공백과 `-`를 제거합니다 (예: `" - Apple Inc."` -> `"Apple Inc."`).
fn strip_dash_prefix(s: &str) -> &str {
    s.trim_start_matches([' ', '-']).trim()
}

/// 종목 셀에서 (티커, 회사명)을 해석합니다.
///
/// 티커를 찾지 못하면 `None`을 반환합니다. 티커 길이 제한은 호출자가 적용합니다.
pub fn resolve_ticker_and_name(cell: &CellText) -> Option<(String, String)> {
    let raw = cell.raw_label();
    let ticker = raw
        .split_once(NAME_SEPARATOR)
        .map_or(raw, |(ticker, _)| ticker)
        .trim();

    if ticker.is_empty() {
        return None;
    }

    let name = NAME_RULES
        .iter()
        .find_map(|rule| rule.apply(cell, ticker))
        .unwrap_or_else(|| ticker.to_string());

    Some((ticker.to_string(), name))
}

/// 최근 활동 셀 파싱 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentActivity {
    pub kind: Option<ActivityKind>,
    pub value: Option<Decimal>,
}

/// 빈 값 표시로 쓰이는 문자열
fn is_placeholder(text: &str) -> bool {
    matches!(text, "" | "-" | "–" | "—")
}

/// 최근 활동 셀 파싱 (`"<kind> <value>%"`).
///
/// 공백으로 나눈 뒤 마지막 토큰에 `%`가 있고 숫자로 파싱되면 값을 붙입니다.
/// 유형은 나머지 토큰을 소문자로 `-` 연결합니다 (예: "Sold Out" -> "sold-out").
/// 연결한 라벨이 `MAX_ACTIVITY_KIND_LEN`자를 넘으면 잘라내고 진단을 남깁니다.
pub fn parse_activity(text: &str, location: &str) -> Parsed<RecentActivity> {
    let text = text.trim();
    if is_placeholder(text) {
        return Parsed::clean(RecentActivity::default());
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut diagnostics = Vec::new();

    let (kind_tokens, value) = match tokens.split_last() {
        Some((last, rest)) if !rest.is_empty() && last.contains('%') => {
            let value = parse_percent(last);
            if value.is_none() {
                diagnostics.push(Diagnostic::field_fallback(
                    location,
                    format!("unparsable activity value {:?}", last),
                ));
            }
            (rest, value)
        }
        _ => (tokens.as_slice(), None),
    };

    let mut label = kind_tokens.join("-").to_lowercase();
    if label.chars().count() > MAX_ACTIVITY_KIND_LEN {
        diagnostics.push(Diagnostic::field_fallback(
            location,
            format!(
                "activity kind longer than {} chars truncated: {:?}",
                MAX_ACTIVITY_KIND_LEN, label
            ),
        ));
        label = label.chars().take(MAX_ACTIVITY_KIND_LEN).collect();
    }

    let activity = RecentActivity {
        kind: Some(ActivityKind::parse(&label)),
        value,
    };

    Parsed::with_diagnostics(activity, diagnostics)
}

/// 투자자 순위 행 추출.
///
/// 첫 셀의 보유 종목 링크에서 코드(`m` 파라미터)와 이름을, 두 번째 셀에서 가치를 읽습니다.
/// 가치 파싱 실패는 0으로 대체합니다.
pub fn extract_investor_row(
    cells: &[CellText],
    location: &str,
    site: &SiteUrls,
) -> RowResult<InvestorRanking> {
    if cells.len() < MIN_INVESTOR_COLUMNS {
        return Err(Diagnostic::row_skipped(
            location,
            format!("insufficient columns: {}", cells.len()),
        ));
    }

    let first = &cells[0];
    let href = first.href.as_deref().ok_or_else(|| {
        Diagnostic::row_skipped(location, format!("missing holdings link: {:?}", first.text))
    })?;
    let link = site.parse_holdings_link(href).ok_or_else(|| {
        Diagnostic::row_skipped(location, format!("no investor code in href {:?}", href))
    })?;

    let name = first
        .link_text
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(link.code.as_str())
        .to_string();

    let mut diagnostics = Vec::new();
    let reported_value = currency_or_zero(&cells[1].text, location, &mut diagnostics);

    Ok(Parsed::with_diagnostics(
        InvestorRanking::new(link.code, name, reported_value),
        diagnostics,
    ))
}

/// 보유 종목 행의 고정 컬럼 위치.
mod col {
    pub const STOCK: usize = 1;
    pub const WEIGHT: usize = 2;
    pub const ACTIVITY: usize = 3;
    pub const SHARES: usize = 4;
    pub const REPORTED_PRICE: usize = 5;
    pub const REPORTED_VALUE: usize = 6;
    pub const CURRENT_PRICE: usize = 8;
    pub const PRICE_CHANGE: usize = 9;
    pub const LOW_52W: usize = 10;
    pub const HIGH_52W: usize = 11;
}

/// 필수 숫자 필드 파싱 실패 시 행 스킵 사유 생성.
fn required<T>(
    parsed: Option<T>,
    cells: &[CellText],
    index: usize,
    field: &str,
    location: &str,
) -> Result<T, Diagnostic> {
    parsed.ok_or_else(|| {
        Diagnostic::row_skipped(
            location,
            format!("invalid {} {:?}", field, cells[index].text),
        )
    })
}

/// 보유 종목 행 추출.
pub fn extract_holding_row(cells: &[CellText], location: &str) -> RowResult<HoldingDetail> {
    if cells.len() < MIN_HOLDING_COLUMNS {
        return Err(Diagnostic::row_skipped(
            location,
            format!("insufficient columns: {}", cells.len()),
        ));
    }

    let stock = &cells[col::STOCK];
    let (ticker, company_name) = resolve_ticker_and_name(stock).ok_or_else(|| {
        Diagnostic::row_skipped(location, format!("no ticker in {:?}", stock.text))
    })?;

    let mut diagnostics = Vec::new();
    let ticker = if ticker.chars().count() > MAX_TICKER_LEN {
        diagnostics.push(Diagnostic::field_fallback(
            location,
            format!("ticker longer than {} chars truncated: {:?}", MAX_TICKER_LEN, ticker),
        ));
        truncate_ticker(&ticker)
    } else {
        ticker
    };

    let text = move |index: usize| cells[index].text.as_str();

    let portfolio_weight_pct = required(
        parse_percent(text(col::WEIGHT)),
        cells,
        col::WEIGHT,
        "weight",
        location,
    )?;
    let shares = required(
        parse_count(text(col::SHARES)),
        cells,
        col::SHARES,
        "shares",
        location,
    )?;
    let reported_price = required(
        parse_decimal(text(col::REPORTED_PRICE)),
        cells,
        col::REPORTED_PRICE,
        "reported price",
        location,
    )?;
    let reported_value = required(
        parse_currency(text(col::REPORTED_VALUE)),
        cells,
        col::REPORTED_VALUE,
        "reported value",
        location,
    )?;
    let current_price = required(
        parse_decimal(text(col::CURRENT_PRICE)),
        cells,
        col::CURRENT_PRICE,
        "current price",
        location,
    )?;
    let price_change_pct = required(
        parse_percent(text(col::PRICE_CHANGE)),
        cells,
        col::PRICE_CHANGE,
        "price change",
        location,
    )?;
    let low_52w = required(
        parse_decimal(text(col::LOW_52W)),
        cells,
        col::LOW_52W,
        "52w low",
        location,
    )?;
    let high_52w = required(
        parse_decimal(text(col::HIGH_52W)),
        cells,
        col::HIGH_52W,
        "52w high",
        location,
    )?;

    let activity = parse_activity(text(col::ACTIVITY), location);
    diagnostics.extend(activity.diagnostics);

    let detail = HoldingDetail {
        ticker,
        company_name,
        portfolio_weight_pct,
        recent_activity_kind: activity.value.kind,
        recent_activity_pct: activity.value.value,
        shares,
        reported_price,
        reported_value,
        current_price,
        price_change_pct,
        low_52w,
        high_52w,
    };

    Ok(Parsed::with_diagnostics(detail, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use guru_core::DiagnosticKind;
    use rust_decimal_macros::dec;

    fn holding_cells(stock: CellText, activity: &str) -> Vec<CellText> {
        vec![
            CellText::plain(""),
            stock,
            CellText::plain("21.52"),
            CellText::plain(activity),
            CellText::plain("300,000,000"),
            CellText::plain("$222.13"),
            CellText::plain("$66,639,000,000"),
            CellText::plain(""),
            CellText::plain("$201.45"),
            CellText::plain("-9.31%"),
            CellText::plain("$169.21"),
            CellText::plain("$260.10"),
        ]
    }

    #[test]
    fn test_separator_split() {
        let cell = CellText::plain("AAPL - Apple Inc.").with_link("AAPL - Apple Inc.", "/m/stock.php?sym=AAPL");
        assert_eq!(
            resolve_ticker_and_name(&cell),
            Some(("AAPL".to_string(), "Apple Inc.".to_string()))
        );
    }

    #[test]
    fn test_nested_name_wins() {
        let cell = CellText::plain("KO - Coca Cola Co.")
            .with_link("KO", "/m/stock.php?sym=KO")
            .with_nested(" - Coca-Cola Company");
        assert_eq!(
            resolve_ticker_and_name(&cell),
            Some(("KO".to_string(), "Coca-Cola Company".to_string()))
        );
    }

    #[test]
    fn test_empty_nested_falls_through() {
        let cell = CellText::plain("AXP - American Express")
            .with_link("AXP - American Express", "/m/stock.php?sym=AXP")
            .with_nested("  ");
        assert_eq!(resolve_ticker_and_name(&cell).unwrap().1, "American Express");
    }

    #[test]
    fn test_cell_remainder_and_ticker_mirror() {
        let remainder = CellText::plain("OXY Occidental Petroleum").with_link("OXY", "/x");
        assert_eq!(
            resolve_ticker_and_name(&remainder).unwrap().1,
            "Occidental Petroleum"
        );

        let mirror = CellText::plain("BRK.B").with_link("BRK.B", "/x");
        assert_eq!(
            resolve_ticker_and_name(&mirror),
            Some(("BRK.B".to_string(), "BRK.B".to_string()))
        );

        assert_eq!(resolve_ticker_and_name(&CellText::plain("  ")), None);
    }

    #[test]
    fn test_parse_activity() {
        let add = parse_activity("Add 12.34%", "row 1");
        assert_eq!(add.value.kind, Some(ActivityKind::Add));
        assert_eq!(add.value.value, Some(dec!(12.34)));

        let none = parse_activity("-", "row 1");
        assert_eq!(none.value, RecentActivity::default());

        let buy = parse_activity("Buy", "row 1");
        assert_eq!(buy.value.kind, Some(ActivityKind::Buy));
        assert_eq!(buy.value.value, None);

        let sold = parse_activity("Sold Out", "row 1");
        assert_eq!(sold.value.kind, Some(ActivityKind::SoldOut));
    }

    #[test]
    fn test_parse_activity_bad_value_keeps_kind() {
        let parsed = parse_activity("Reduce ?%", "row 7");
        assert_eq!(parsed.value.kind, Some(ActivityKind::Reduce));
        assert_eq!(parsed.value.value, None);
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn test_parse_activity_long_kind_is_truncated() {
        let parsed = parse_activity("Reduce Position Partially Sold 12.34%", "row 5");
        let kind = parsed.value.kind.unwrap();

        assert_eq!(kind.as_str().chars().count(), MAX_ACTIVITY_KIND_LEN);
        assert_eq!(kind.as_str(), "reduce-position-part");
        assert_eq!(parsed.value.value, Some(dec!(12.34)));
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::FieldFallback);
    }

    #[test]
    fn test_extract_holding_row() {
        let stock = CellText::plain("AAPL - Apple Inc.").with_link("AAPL - Apple Inc.", "/m/stock.php?sym=AAPL");
        let parsed = extract_holding_row(&holding_cells(stock, "Reduce 13.14%"), "row 1").unwrap();
        let detail = parsed.value;

        assert_eq!(detail.ticker, "AAPL");
        assert_eq!(detail.company_name, "Apple Inc.");
        assert_eq!(detail.portfolio_weight_pct, dec!(21.52));
        assert_eq!(detail.recent_activity_kind, Some(ActivityKind::Reduce));
        assert_eq!(detail.recent_activity_pct, Some(dec!(13.14)));
        assert_eq!(detail.shares, 300_000_000);
        assert_eq!(detail.reported_price, dec!(222.13));
        assert_eq!(detail.reported_value, 66_639_000_000);
        assert_eq!(detail.current_price, dec!(201.45));
        assert_eq!(detail.price_change_pct, dec!(-9.31));
        assert_eq!(detail.low_52w, dec!(169.21));
        assert_eq!(detail.high_52w, dec!(260.10));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_extract_holding_row_truncates_long_ticker() {
        let long = "T".repeat(60);
        let stock = CellText::plain(long.clone()).with_link(long, "/x");
        let parsed = extract_holding_row(&holding_cells(stock, ""), "row 2").unwrap();

        assert_eq!(parsed.value.ticker.len(), MAX_TICKER_LEN);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::FieldFallback);
    }

    #[test]
    fn test_extract_holding_row_skips() {
        let short = vec![CellText::plain("a"), CellText::plain("b")];
        let err = extract_holding_row(&short, "row 3").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::RowSkipped);

        let stock = CellText::plain("MSFT").with_link("MSFT", "/x");
        let mut cells = holding_cells(stock, "");
        cells[4] = CellText::plain("n/a");
        let err = extract_holding_row(&cells, "row 4").unwrap_err();
        assert!(err.reason.contains("shares"));
    }

    #[test]
    fn test_extract_investor_row() {
        let site = SiteUrls::new("https://dataroma.com").unwrap();
        let cells = vec![
            CellText::plain("Warren Buffett - Berkshire Hathaway")
                .with_link("Warren Buffett - Berkshire Hathaway", "/m/holdings.php?m=BRK"),
            CellText::plain("$258.7B"),
            CellText::plain("36"),
        ];
        let parsed = extract_investor_row(&cells, "row 1", &site).unwrap();
        assert_eq!(parsed.value.code, "BRK");
        assert_eq!(parsed.value.name, "Warren Buffett - Berkshire Hathaway");
        assert_eq!(parsed.value.reported_value, 258_700_000_000);
    }

    #[test]
    fn test_extract_investor_row_value_fallback_and_skips() {
        let site = SiteUrls::new("https://dataroma.com").unwrap();
        let cells = vec![
            CellText::plain("AKO Capital").with_link("AKO Capital", "/m/holdings.php?m=AK"),
            CellText::plain("n/a"),
            CellText::plain("20"),
        ];
        let parsed = extract_investor_row(&cells, "row 2", &site).unwrap();
        assert_eq!(parsed.value.reported_value, 0);
        assert_eq!(parsed.diagnostics.len(), 1);

        let two_columns = &cells[..2];
        assert!(extract_investor_row(two_columns, "row 3", &site).is_err());

        let no_link = vec![CellText::plain("Header"), CellText::plain("Value"), CellText::plain("N")];
        assert!(extract_investor_row(&no_link, "row 4", &site).is_err());
    }
}
