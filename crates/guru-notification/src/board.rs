//! 게시판 API 전송기.
//!
//! `POST {base}/board-research`에 JSON으로 게시글을 등록합니다.
//! HTTP 2xx이고 응답 본문의 `success`가 `true`일 때만 성공입니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::types::{NotificationError, NotificationResult, PostRequest, PostSender};

const BOARD_PATH: &str = "board-research";

/// 게시판 API 설정.
#[derive(Debug, Clone)]
pub struct BoardApiConfig {
    /// API 루트 (예: "http://localhost/api")
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
    /// 전송 활성화 여부
    pub enabled: bool,
}

impl BoardApiConfig {
    /// 새 게시판 API 설정을 생성합니다.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            enabled: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// 게시판 API 응답 본문.
#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// 게시판 API 전송기.
pub struct BoardApiSender {
    config: BoardApiConfig,
    client: reqwest::Client,
}

impl BoardApiSender {
    /// 새 게시판 API 전송기를 생성합니다.
    pub fn new(config: BoardApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), BOARD_PATH)
    }
}

#[async_trait]
impl PostSender for BoardApiSender {
    async fn create_post(&self, request: &PostRequest) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Board post is disabled, skipping");
            return Ok(());
        }

        let url = self.endpoint();
        debug!(url = %url, title = %request.title, "Creating board post");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            warn!("Board API rate limited");
            return Err(NotificationError::RateLimited(60));
        }

        if !status.is_success() {
            error!("Failed to create board post: {} - {}", status, body);
            return Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let parsed: BoardResponse = serde_json::from_str(&body)?;
        if !parsed.success {
            return Err(NotificationError::SendFailed(
                parsed
                    .message
                    .unwrap_or_else(|| format!("success=false: {}", body)),
            ));
        }

        info!(title = %request.title, "Board post created");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.base_url.is_empty()
    }

    fn name(&self) -> &str {
        "board"
    }
}
