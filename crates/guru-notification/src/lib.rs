//! # Guru Notification
//!
//! 새로 저장된 포트폴리오 스냅샷을 게시판 API에 글로 등록합니다.
//!
//! 지원 채널:
//! - 게시판 API (`POST {base}/board-research`)
//!
//! 전송 실패는 이미 커밋된 스냅샷에 영향을 주지 않으며, 호출자가 로그만 남깁니다.

pub mod board;
pub mod types;

pub use board::*;
pub use types::*;
