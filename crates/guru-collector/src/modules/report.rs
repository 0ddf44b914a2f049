//! 최신 스냅샷 HTML 리포트 생성.
//!
//! 정적 템플릿의 자리표시자 세 곳을 값으로 치환합니다:
//! `const stocks = []`, `const investor_name = ""`, `const portfolio_date = ""`.

use std::path::{Path, PathBuf};

use guru_core::{HoldingDetail, StoredSnapshot};
use guru_data::SnapshotStore;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::CollectorError;
use crate::Result;

const STOCKS_PLACEHOLDER: &str = "const stocks = []";
const INVESTOR_NAME_PLACEHOLDER: &str = "const investor_name = \"\"";
const PORTFOLIO_DATE_PLACEHOLDER: &str = "const portfolio_date = \"\"";

/// 리포트 상단 메타 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    /// "$X.YB" 형식 총 가치
    pub total_value: String,
    pub number_of_stocks: i32,
    /// ISO 날짜
    pub portfolio_date: String,
    pub investor_name: String,
    pub investor_code: String,
}

/// 리포트 종목 행
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStock {
    pub symbol: String,
    pub name: String,
    pub percentage: f64,
    pub value: i64,
    pub change: String,
    pub activity: String,
    #[serde(rename = "activityType")]
    pub activity_type: String,
}

/// 템플릿에 주입할 뷰 모델
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub meta: ReportMeta,
    /// 비중 내림차순
    pub stocks: Vec<ReportStock>,
}

impl ReportView {
    /// 저장된 스냅샷으로부터 뷰 모델을 만듭니다.
    pub fn from_snapshot(snapshot: &StoredSnapshot) -> Self {
        let summary = &snapshot.summary;
        let meta = ReportMeta {
            total_value: format_billions(summary.total_value),
            number_of_stocks: summary.stock_count,
            portfolio_date: summary.as_of_date.format("%Y-%m-%d").to_string(),
            investor_name: snapshot.investor_name.clone(),
            investor_code: summary.investor_code.clone(),
        };

        Self {
            meta,
            stocks: snapshot
                .details_by_weight()
                .into_iter()
                .map(report_stock)
                .collect(),
        }
    }

    /// 출력 파일 이름: `{code}_{date}_generated_report.html`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_generated_report.html",
            self.meta.investor_code, self.meta.portfolio_date
        )
    }

    /// 템플릿 자리표시자를 치환합니다.
    pub fn render(&self, template: &str) -> Result<String> {
        let stocks = serde_json::to_string(&self.stocks)
            .map_err(|e| CollectorError::Report(format!("종목 직렬화 실패: {}", e)))?;

        Ok(template
            .replace(STOCKS_PLACEHOLDER, &format!("const stocks = {}", stocks))
            .replace(
                INVESTOR_NAME_PLACEHOLDER,
                &format!("const investor_name = {}", js_string(&self.meta.investor_name)),
            )
            .replace(
                PORTFOLIO_DATE_PLACEHOLDER,
                &format!("const portfolio_date = {}", js_string(&self.meta.portfolio_date)),
            ))
    }
}

fn report_stock(detail: &HoldingDetail) -> ReportStock {
    let activity_type = detail
        .recent_activity_kind
        .as_ref()
        .map(|k| k.as_str().to_lowercase())
        .unwrap_or_default();

    ReportStock {
        symbol: detail.ticker.clone(),
        name: detail.company_name.replace('"', ""),
        percentage: detail.portfolio_weight_pct.to_f64().unwrap_or_default(),
        value: detail.reported_value,
        change: format_change(detail.price_change_pct),
        activity: format_activity(&activity_type, detail.recent_activity_pct),
        activity_type,
    }
}

/// 달러 금액을 "$X.YB" (10억 단위, 소수 한 자리)로 표시합니다.
pub fn format_billions(value: i64) -> String {
    let billions = (Decimal::from(value) / Decimal::from(1_000_000_000i64)).round_dp(1);
    format!("${:.1}B", billions)
}

/// 0 이상이면 "+" 접두사.
pub fn format_change(change: Decimal) -> String {
    let change = round_2(change);
    if change >= Decimal::ZERO {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// "Add 12.34%" 형식. 유형이나 값이 없으면 빈 문자열.
pub fn format_activity(kind: &str, value: Option<Decimal>) -> String {
    match value {
        Some(value) if !kind.is_empty() && !value.is_zero() => {
            format!("{} {:.2}%", capitalize(kind), round_2(value))
        }
        _ => String::new(),
    }
}

fn round_2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// JS 문자열 리터럴 (JSON 문자열 인코딩과 동일).
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// 최신 스냅샷을 읽어 리포트 파일을 생성합니다.
///
/// 저장된 스냅샷이 없으면 `None`을 반환합니다.
pub async fn generate_latest_report(
    store: &dyn SnapshotStore,
    template_path: &Path,
    output_dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(snapshot) = store.read_latest_snapshot().await? else {
        tracing::warn!("저장된 포트폴리오 스냅샷이 없습니다");
        return Ok(None);
    };

    let template = tokio::fs::read_to_string(template_path)
        .await
        .map_err(|e| {
            CollectorError::Report(format!("템플릿 읽기 실패 ({}): {}", template_path.display(), e))
        })?;

    let view = ReportView::from_snapshot(&snapshot);
    let html = view.render(&template)?;

    tokio::fs::create_dir_all(output_dir).await?;
    let output_path = output_dir.join(view.file_name());
    tokio::fs::write(&output_path, html).await?;

    tracing::info!(
        path = %output_path.display(),
        code = %view.meta.investor_code,
        date = %view.meta.portfolio_date,
        stocks = view.stocks.len(),
        "리포트 생성 완료"
    );

    Ok(Some(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use guru_core::{ActivityKind, PortfolioSnapshot, PortfolioSummary};
    use guru_data::{reconcile, MemorySnapshotStore};
    use rust_decimal_macros::dec;

    const TEMPLATE: &str = r#"<script>
const stocks = []
const investor_name = ""
const portfolio_date = ""
</script>"#;

    fn detail(
        ticker: &str,
        name: &str,
        weight: Decimal,
        kind: Option<ActivityKind>,
        activity: Option<Decimal>,
        change: Decimal,
    ) -> HoldingDetail {
        HoldingDetail {
            ticker: ticker.to_string(),
            company_name: name.to_string(),
            portfolio_weight_pct: weight,
            recent_activity_kind: kind,
            recent_activity_pct: activity,
            shares: 10,
            reported_price: dec!(100),
            reported_value: 1_000,
            current_price: dec!(110),
            price_change_pct: change,
            low_52w: dec!(90),
            high_52w: dec!(120),
        }
    }

    fn stored() -> StoredSnapshot {
        StoredSnapshot {
            portfolio_id: 1,
            investor_name: "Warren Buffett".to_string(),
            summary: PortfolioSummary {
                investor_code: "BRK".to_string(),
                period: "Q4 2024".to_string(),
                as_of_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                stock_count: 2,
                total_value: 267_340_000_000,
            },
            avg_return: Some(dec!(4)),
            details: vec![
                detail("KO", "Coca \"Cola\" Co.", dec!(10), None, None, dec!(-1.5)),
                detail(
                    "AAPL",
                    "Apple Inc.",
                    dec!(28.12),
                    Some(ActivityKind::Add),
                    Some(dec!(12.345)),
                    dec!(0),
                ),
            ],
        }
    }

    #[test]
    fn test_view_formatting() {
        let view = ReportView::from_snapshot(&stored());

        assert_eq!(view.meta.total_value, "$267.3B");
        assert_eq!(view.meta.portfolio_date, "2024-12-31");

        let aapl = &view.stocks[0];
        assert_eq!(aapl.symbol, "AAPL");
        assert_eq!(aapl.change, "+0.00%");
        assert_eq!(aapl.activity, "Add 12.35%");
        assert_eq!(aapl.activity_type, "add");
        assert_eq!(aapl.percentage, 28.12);

        let ko = &view.stocks[1];
        assert_eq!(ko.name, "Coca Cola Co.");
        assert_eq!(ko.change, "-1.50%");
        assert_eq!(ko.activity, "");
        assert_eq!(ko.activity_type, "");
    }

    #[test]
    fn test_format_activity_sold_out() {
        assert_eq!(format_activity("sold-out", Some(dec!(100))), "Sold-out 100.00%");
        assert_eq!(format_activity("", Some(dec!(1))), "");
        assert_eq!(format_activity("add", None), "");
    }

    #[test]
    fn test_render_replaces_placeholders() {
        let view = ReportView::from_snapshot(&stored());
        let html = view.render(TEMPLATE).unwrap();

        assert!(html.contains(r#"const investor_name = "Warren Buffett""#));
        assert!(html.contains(r#"const portfolio_date = "2024-12-31""#));
        assert!(html.contains(r#""activityType":"add""#));
        assert!(!html.contains("const stocks = []"));
        assert_eq!(view.file_name(), "BRK_2024-12-31_generated_report.html");
    }

    #[tokio::test]
    async fn test_generate_latest_report_writes_file() {
        let store = MemorySnapshotStore::new();
        let snapshot = stored();
        reconcile(
            &store,
            &snapshot.investor_name,
            &PortfolioSnapshot::new(snapshot.summary.clone(), snapshot.details.clone()),
        )
        .await
        .unwrap();

        let dir = std::env::temp_dir().join(format!("guru-report-{}", unique_suffix()));
        let template_path = dir.join("template.html");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(&template_path, TEMPLATE).await.unwrap();

        let output_dir = dir.join("report");
        let path = generate_latest_report(&store, &template_path, &output_dir)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(path, output_dir.join("BRK_2024-12-31_generated_report.html"));
        let html = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(html.contains(r#""symbol":"AAPL""#));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_store_produces_no_report() {
        let store = MemorySnapshotStore::new();
        let dir = std::env::temp_dir().join(format!("guru-report-empty-{}", unique_suffix()));

        let result = generate_latest_report(&store, &dir.join("missing.html"), &dir)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(!dir.exists());
    }

    fn unique_suffix() -> String {
        format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        )
    }
}
