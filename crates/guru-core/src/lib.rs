//! # Guru Core
//!
//! 슈퍼 투자자 포트폴리오 수집 시스템의 핵심 도메인 모델을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 투자자 순위 및 포트폴리오 요약/상세 타입
//! - 가중 평균 수익률 계산
//! - 행/페이지 단위 소프트 실패 진단 (`Diagnostic`, `BatchReport`)
//! - 실행 컨텍스트
//! - 로깅 인프라

pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod logging;

pub use diagnostics::*;
pub use domain::*;
pub use error::{CoreError, CoreResult};
pub use logging::*;
