//! 포트폴리오 스냅샷 타입.
//!
//! 이 모듈은 투자자 포트폴리오 관련 타입을 정의합니다:
//! - `PortfolioSummary` - 기준일별 포트폴리오 메타 정보
//! - `HoldingDetail` - 개별 보유 종목
//! - `PortfolioSnapshot` - 요약 + 상세 목록 (크롤링 결과)
//! - `StoredSnapshot` - DB에서 읽어온 스냅샷

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 티커 최대 길이. 초과 시 거부하지 않고 잘라냅니다.
pub const MAX_TICKER_LEN: usize = 50;

/// 활동 유형 라벨 최대 길이 (DB 컬럼 제약). 초과분은 잘라냅니다.
pub const MAX_ACTIVITY_KIND_LEN: usize = 20;

/// 포트폴리오 요약 (기준일별 메타 정보).
///
/// 저장 시 (investor_code, as_of_date) 쌍이 유일 키입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// 투자자 코드
    pub investor_code: String,
    /// 기준 분기 라벨 (예: "Q1 2025")
    pub period: String,
    /// 기준 날짜
    pub as_of_date: NaiveDate,
    /// 보유 종목 수
    pub stock_count: i32,
    /// 총 포트폴리오 가치 (달러)
    pub total_value: i64,
}

/// 최근 매매 활동 유형.
///
/// 사이트에 새로운 유형이 나타날 수 있으므로 `Other`로 열어둡니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ActivityKind {
    Buy,
    Add,
    Reduce,
    New,
    SoldOut,
    Other(String),
}

impl ActivityKind {
    /// 소문자 라벨에서 활동 유형을 만듭니다 (예: "add", "sold-out").
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "buy" => Self::Buy,
            "add" => Self::Add,
            "reduce" => Self::Reduce,
            "new" => Self::New,
            "sold-out" | "sold out" | "sold" => Self::SoldOut,
            _ => Self::Other(label),
        }
    }

    /// 저장용 소문자 라벨.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Buy => "buy",
            Self::Add => "add",
            Self::Reduce => "reduce",
            Self::New => "new",
            Self::SoldOut => "sold-out",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ActivityKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_str().to_string()
    }
}

/// 포트폴리오 내 개별 보유 종목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingDetail {
    /// 종목 코드 (최대 50자)
    pub ticker: String,
    /// 회사명
    pub company_name: String,
    /// 포트폴리오 내 비중 (%, 0~100)
    pub portfolio_weight_pct: Decimal,
    /// 최근 활동 유형
    pub recent_activity_kind: Option<ActivityKind>,
    /// 최근 활동 값 (%)
    pub recent_activity_pct: Option<Decimal>,
    /// 보유 주식 수
    pub shares: i64,
    /// 보고 당시 가격
    pub reported_price: Decimal,
    /// 보고된 종목 가치 (달러)
    pub reported_value: i64,
    /// 현재가
    pub current_price: Decimal,
    /// 보고가 대비 현재가 변화율 (%)
    pub price_change_pct: Decimal,
    /// 52주 최저가
    pub low_52w: Decimal,
    /// 52주 최고가
    pub high_52w: Decimal,
}

/// 가격 갱신 대상 필드 (재수집 시 업데이트되는 값만).
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPriceUpdate {
    pub ticker: String,
    pub current_price: Decimal,
    pub price_change_pct: Decimal,
    pub low_52w: Decimal,
    pub high_52w: Decimal,
}

impl From<&HoldingDetail> for DetailPriceUpdate {
    fn from(detail: &HoldingDetail) -> Self {
        Self {
            ticker: detail.ticker.clone(),
            current_price: detail.current_price,
            price_change_pct: detail.price_change_pct,
            low_52w: detail.low_52w,
            high_52w: detail.high_52w,
        }
    }
}

/// 문자 경계를 지키며 티커를 최대 길이로 자릅니다.
pub fn truncate_ticker(ticker: &str) -> String {
    ticker.chars().take(MAX_TICKER_LEN).collect()
}

/// 한 투자자의 특정 기준일 스냅샷 (요약 + 상세).
///
/// 크롤러가 만든 스냅샷의 상세 목록은 페이지 순회 순서를 유지합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub summary: PortfolioSummary,
    pub details: Vec<HoldingDetail>,
}

impl PortfolioSnapshot {
    /// 새 스냅샷을 생성합니다.
    pub fn new(summary: PortfolioSummary, details: Vec<HoldingDetail>) -> Self {
        Self { summary, details }
    }
}

/// DB에 저장된 스냅샷 (리포트 생성용).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    /// 포트폴리오 ID
    pub portfolio_id: i64,
    /// 투자자 이름
    pub investor_name: String,
    pub summary: PortfolioSummary,
    /// 저장된 가중 평균 수익률 (계산 전이면 None)
    pub avg_return: Option<Decimal>,
    /// 비중 내림차순 상세 목록
    pub details: Vec<HoldingDetail>,
}

impl StoredSnapshot {
    /// 비중 내림차순으로 정렬된 상세 목록 (같은 비중은 원래 순서 유지).
    pub fn details_by_weight(&self) -> Vec<&HoldingDetail> {
        let mut details: Vec<_> = self.details.iter().collect();
        details.sort_by(|a, b| b.portfolio_weight_pct.cmp(&a.portfolio_weight_pct));
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn detail(ticker: &str, weight: Decimal, change: Decimal) -> HoldingDetail {
        HoldingDetail {
            ticker: ticker.to_string(),
            company_name: ticker.to_string(),
            portfolio_weight_pct: weight,
            recent_activity_kind: None,
            recent_activity_pct: None,
            shares: 100,
            reported_price: dec!(10),
            reported_value: 1000,
            current_price: dec!(11),
            price_change_pct: change,
            low_52w: dec!(8),
            high_52w: dec!(12),
        }
    }

    fn summary() -> PortfolioSummary {
        PortfolioSummary {
            investor_code: "BRK".to_string(),
            period: "Q1 2025".to_string(),
            as_of_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            stock_count: 2,
            total_value: 1_000_000,
        }
    }

    #[test]
    fn test_details_by_weight_keeps_original_order() {
        let snapshot = StoredSnapshot {
            portfolio_id: 1,
            investor_name: "Berkshire Hathaway".to_string(),
            summary: summary(),
            avg_return: None,
            details: vec![detail("KO", dec!(5), dec!(1)), detail("AAPL", dec!(40), dec!(2))],
        };
        let sorted: Vec<_> = snapshot.details_by_weight().iter().map(|d| d.ticker.clone()).collect();
        assert_eq!(sorted, vec!["AAPL", "KO"]);
        assert_eq!(snapshot.details[0].ticker, "KO");
    }

    #[test]
    fn test_activity_kind_labels() {
        assert_eq!(ActivityKind::parse("Add"), ActivityKind::Add);
        assert_eq!(ActivityKind::parse("sold-out"), ActivityKind::SoldOut);
        assert_eq!(ActivityKind::SoldOut.as_str(), "sold-out");
        assert_eq!(
            ActivityKind::parse("Trim"),
            ActivityKind::Other("trim".to_string())
        );
    }

    #[test]
    fn test_truncate_ticker() {
        let long = "X".repeat(80);
        assert_eq!(truncate_ticker(&long).len(), MAX_TICKER_LEN);
        assert_eq!(truncate_ticker("AAPL"), "AAPL");
    }
}
