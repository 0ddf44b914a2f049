//! 투자자 식별 및 순위 타입.

use serde::{Deserialize, Serialize};

/// 투자자 코드의 최대 길이 (DB 컬럼 제약)
pub const MAX_INVESTOR_CODE_LEN: usize = 50;

/// 투자자 순위 항목.
///
/// 순위 페이지에서 파싱되어 크롤링 순서를 결정하는 데 한 번 사용되며,
/// DB에 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorRanking {
    /// 사이트에서 부여한 고유 코드 (예: "BRK")
    pub code: String,
    /// 투자자 이름 (예: "Warren Buffett - Berkshire Hathaway")
    pub name: String,
    /// 보고된 포트폴리오 가치 (달러)
    pub reported_value: i64,
}

impl InvestorRanking {
    /// 새 순위 항목을 생성합니다.
    pub fn new(code: impl Into<String>, name: impl Into<String>, reported_value: i64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            reported_value,
        }
    }

    /// 저장 키로 사용하는 정규화된 코드.
    pub fn storage_code(&self) -> String {
        normalize_investor_code(&self.code)
    }
}

/// 투자자 코드를 저장용 형태로 정규화합니다.
///
/// 조회와 삽입 모두 같은 형태를 사용해야 (code, date) 유일성이 대소문자와 무관하게 유지됩니다.
pub fn normalize_investor_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// 가치 내림차순으로 정렬한 뒤 요청 개수만큼 자릅니다.
///
/// 요청 개수는 `1..=len` 범위로 보정됩니다. 입력이 비어 있으면 빈 목록을 반환합니다.
pub fn top_investors(mut investors: Vec<InvestorRanking>, requested: usize) -> Vec<InvestorRanking> {
    if investors.is_empty() {
        return investors;
    }

    let count = requested.clamp(1, investors.len());
    // 안정 정렬: 같은 가치는 페이지 순서 유지
    investors.sort_by(|a, b| b.reported_value.cmp(&a.reported_value));
    investors.truncate(count);
    investors
}
