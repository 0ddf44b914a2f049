//! tracing을 사용한 로깅 인프라.
//!
//! 수집기 바이너리에서 한 번 초기화합니다. 출력 형식:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 로그 집계용 JSON 형식
//! - **compact**: cron 실행 로그용 한 줄 형식

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CoreError, CoreResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(CoreError::InvalidInput(format!("Unknown log format: {}", s))),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "guru_data=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 로그 레벨 필터를 덮어씁니다.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// 레벨은 `RUST_LOG`, 형식은 `LOG_FORMAT`(pretty/json/compact)을 사용합니다.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            level,
            format,
            ..Default::default()
        }
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 설정의 레벨보다 우선합니다.
///
/// # 예제
///
/// ```no_run
/// use guru_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::from_env()
///     .with_level("guru_collector=debug,guru_data=debug")
///     .with_format(LogFormat::Compact);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> CoreResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CoreError::Config(format!("invalid log filter {:?}: {}", config.level, e)))?;

    let base = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target);

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Pretty => registry.with(base.pretty()).try_init(),
        LogFormat::Json => registry.with(base.json()).try_init(),
        LogFormat::Compact => registry.with(base.compact()).try_init(),
    }
    .map_err(|e| CoreError::Logging(e.to_string()))?;

    tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}
