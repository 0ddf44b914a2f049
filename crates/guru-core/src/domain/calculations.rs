//! 포트폴리오 집계 계산 공통 로직.
//!
//! 신규 저장과 재수집 갱신에서 동일한 가중 평균 수익률 계산을 공유합니다.

use rust_decimal::Decimal;

/// 저장 시 사용하는 수익률 소수 자릿수 (NUMERIC(8,4))
pub const AVG_RETURN_SCALE: u32 = 4;

/// 가중 평균 수익률 계산.
///
/// Σ(비중 × 변화율) / Σ(비중). 비중이 0 이하인 종목은 제외하며,
/// 비중 합이 0이면 0을 반환합니다.
///
/// # Examples
///
/// ```
/// use guru_core::weighted_avg_return;
/// use rust_decimal_macros::dec;
///
/// // (60×10 + 40×(-5)) / 100 = 4
/// let avg = weighted_avg_return([(dec!(60), dec!(10)), (dec!(40), dec!(-5))]);
/// assert_eq!(avg, dec!(4));
/// ```
pub fn weighted_avg_return<I>(items: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let (weighted_sum, weight_sum) = items
        .into_iter()
        .filter(|(weight, _)| *weight > Decimal::ZERO)
        .fold((Decimal::ZERO, Decimal::ZERO), |(ws, w), (weight, change)| {
            (ws + weight * change, w + weight)
        });

    if weight_sum.is_zero() {
        return Decimal::ZERO;
    }

    weighted_sum / weight_sum
}

/// 저장 자릿수로 반올림합니다.
pub fn round_avg_return(value: Decimal) -> Decimal {
    value.round_dp(AVG_RETURN_SCALE)
}
