//! 수집 작업 모듈.

pub mod portfolio_sync;
pub mod report;

pub use portfolio_sync::{sync_portfolios, SyncOptions};
pub use report::{generate_latest_report, ReportView};
