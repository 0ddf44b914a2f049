//! 값 정규화.
//!
//! 사이트에 표시되는 통화/비율/수량 문자열을 숫자 타입으로 변환합니다.
//! 엄격 파서는 `Option`을 반환하고, 배치를 멈추면 안 되는 위치에서는
//! `*_or_zero` 변형이 기본값과 함께 진단을 남깁니다.
//!
//! - `"$12.5B"` -> 12500000000
//! - `"$850M"` -> 850000000
//! - `"$1,234"` -> 1234
//! - `"-3.25%"` -> -3.25

use guru_core::Diagnostic;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const BILLION: i64 = 1_000_000_000;
const MILLION: i64 = 1_000_000;

/// 통화 기호, 천 단위 구분자, 공백을 제거합니다.
fn strip_symbols(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect()
}

/// 부호를 유지하며 Decimal 파싱 (`+` 접두사 허용).
fn parse_signed(text: &str) -> Option<Decimal> {
    if text.is_empty() || text == "-" {
        return None;
    }
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    unsigned.parse().ok()
}

/// 통화 금액 파싱 (`B`/`M` 배율 접미사 지원).
///
/// 소수점 이하는 버립니다.
pub fn parse_currency(text: &str) -> Option<i64> {
    let cleaned = strip_symbols(text).to_uppercase();

    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix('B') {
        (n, BILLION)
    } else if let Some(n) = cleaned.strip_suffix('M') {
        (n, MILLION)
    } else {
        (cleaned.as_str(), 1)
    };

    let value = parse_signed(number)?;
    value
        .checked_mul(Decimal::from(multiplier))?
        .trunc()
        .to_i64()
}

/// 가격 등 일반 Decimal 값 파싱 (`$`, 쉼표 제거).
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    parse_signed(&strip_symbols(text))
}

/// 퍼센트 문자열 파싱.
///
/// 뒤쪽 `%`를 제거하며 부호는 표시된 그대로 유지합니다.
pub fn parse_percent(text: &str) -> Option<Decimal> {
    let cleaned = strip_symbols(text);
    let number = cleaned.strip_suffix('%').unwrap_or(&cleaned);
    parse_signed(number)
}

/// 정수 수량 파싱 (예: 주식 수 `"1,234,567"`).
pub fn parse_count(text: &str) -> Option<i64> {
    let cleaned = strip_symbols(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// 통화 금액 파싱, 실패 시 0과 함께 진단을 기록합니다.
pub fn currency_or_zero(text: &str, location: &str, diagnostics: &mut Vec<Diagnostic>) -> i64 {
    parse_currency(text).unwrap_or_else(|| {
        diagnostics.push(Diagnostic::field_fallback(
            location,
            format!("unparsable amount {:?}, using 0", text),
        ));
        0
    })
}
