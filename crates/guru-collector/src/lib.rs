//! 슈퍼 투자자 포트폴리오 수집기.
//!
//! 이 crate는 다음 작업을 실행하는 바이너리를 제공합니다:
//! - 상위 투자자 보유 종목 크롤링 및 스냅샷 저장/갱신
//! - 신규 스냅샷 게시글 등록
//! - 최신 스냅샷 HTML 리포트 생성

pub mod app;
pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use app::Collector;
pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::SyncStats;
