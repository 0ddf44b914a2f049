//! 소프트 실패 진단.
//!
//! 행 스킵, 필드 기본값 대체, 페이지 누락처럼 배치를 중단하지 않는 실패를
//! 값과 함께 수집합니다. 파서는 로그를 남기지 않고 진단만 반환하며,
//! 오케스트레이터가 `BatchReport`를 보고 로그 및 투자자 단위 진행 여부를 결정합니다.

use serde::{Deserialize, Serialize};

/// 진단 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 행 전체를 건너뜀
    RowSkipped,
    /// 필드 파싱 실패로 기본값 사용
    FieldFallback,
    /// 페이지 가져오기/파싱 실패로 해당 페이지 기여분 누락
    PageOmitted,
    /// 상세 표 자체가 없음 (건너뛴 행으로 세지 않음)
    TableMissing,
}

/// 단일 진단 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 발생 위치 (예: "row 3", URL)
    pub location: String,
    /// 사유
    pub reason: String,
}

impl Diagnostic {
    pub fn row_skipped(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::RowSkipped,
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn field_fallback(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::FieldFallback,
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn page_omitted(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::PageOmitted,
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn table_missing(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::TableMissing,
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// 진단이 붙은 파싱 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    /// 진단 없는 결과.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// 한 투자자 크롤링 동안 모인 진단 모음.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 파싱 결과의 진단을 흡수하고 값을 돌려줍니다.
    pub fn absorb<T>(&mut self, parsed: Parsed<T>) -> T {
        self.diagnostics.extend(parsed.diagnostics);
        parsed.value
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn rows_skipped(&self) -> usize {
        self.count(DiagnosticKind::RowSkipped)
    }

    pub fn pages_omitted(&self) -> usize {
        self.count(DiagnosticKind::PageOmitted)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 각 진단을 warn 레벨로 출력합니다 (현재 span 컨텍스트 사용).
    pub fn log(&self) {
        for d in &self.diagnostics {
            tracing::warn!(
                kind = ?d.kind,
                location = %d.location,
                reason = %d.reason,
                "파싱 진단"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_report_absorb_and_count() {
        let mut report = BatchReport::new();
        let value = report.absorb(Parsed::with_diagnostics(
            3,
            vec![
                Diagnostic::row_skipped("row 2", "columns: 2"),
                Diagnostic::field_fallback("row 4", "value: abc"),
            ],
        ));
        report.push(Diagnostic::page_omitted("page 3", "timeout"));
        report.push(Diagnostic::table_missing("page 4", "no rows"));

        assert_eq!(value, 3);
        assert_eq!(report.rows_skipped(), 1);
        assert_eq!(report.pages_omitted(), 1);
        assert_eq!(report.count(DiagnosticKind::FieldFallback), 1);
        assert_eq!(report.count(DiagnosticKind::TableMissing), 1);
        assert_eq!(report.diagnostics().len(), 4);
    }

    #[test]
    fn test_parsed_map_keeps_diagnostics() {
        let parsed = Parsed::with_diagnostics(vec![1, 2], vec![Diagnostic::row_skipped("r", "x")])
            .map(|v| v.len());
        assert_eq!(parsed.value, 2);
        assert!(parsed.has_diagnostics());
        assert!(!Parsed::clean(0).has_diagnostics());
    }
}
