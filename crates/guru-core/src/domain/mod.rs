//! 포트폴리오 수집을 위한 도메인 모델.

mod calculations;
mod context;
mod investor;
mod portfolio;

pub use calculations::*;
pub use context::*;
pub use investor::*;
pub use portfolio::*;
