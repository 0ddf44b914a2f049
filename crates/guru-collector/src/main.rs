//! Portfolio collector CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use guru_collector::{Collector, CollectorConfig};
use guru_core::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "guru-collector")]
#[command(about = "Super investor portfolio collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 상위 투자자 포트폴리오 1회 동기화
    Sync {
        /// 수집할 상위 투자자 수 (기본: CRAWL_TOP_COUNT)
        #[arg(long)]
        top: Option<usize>,
    },

    /// 최신 스냅샷 HTML 리포트 생성
    Report {
        /// 출력 디렉토리 (기본: REPORT_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// 템플릿 경로 (기본: REPORT_TEMPLATE_PATH)
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// 데몬 모드: 주기적으로 동기화 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // .env를 로깅 설정보다 먼저 읽음
    dotenvy::dotenv().ok();

    // RUST_LOG가 설정되어 있으면 그 값이 우선
    init_logging(LogConfig::from_env().with_level(cli.log_level.clone()))?;

    tracing::info!("Guru Portfolio Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(base_url = %config.crawl.base_url, "설정 로드 완료");

    let collector = Collector::connect(config).await?;

    // 명령 실행
    match cli.command {
        Commands::Sync { top } => {
            let stats = collector.sync(top).await?;
            stats.log_summary("포트폴리오 동기화");
        }
        Commands::Report {
            output_dir,
            template,
        } => match collector
            .report(template.as_deref(), output_dir.as_deref())
            .await?
        {
            Some(path) => tracing::info!(path = %path.display(), "리포트 저장"),
            None => tracing::warn!("리포트를 생성할 스냅샷이 없습니다"),
        },
        Commands::Daemon => {
            let interval_minutes = collector.config().daemon.interval_minutes;
            tracing::info!("=== 데몬 모드 시작 (주기: {}분) ===", interval_minutes);

            let mut interval = tokio::time::interval(collector.config().daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        match collector.sync(None).await {
                            Ok(stats) => stats.log_summary("포트폴리오 동기화"),
                            Err(e) => tracing::error!("포트폴리오 동기화 실패: {}", e),
                        }

                        tracing::info!("=== 동기화 완료, 다음 실행: {}분 후 ===", interval_minutes);
                    }
                }
            }
        }
    }

    collector.close().await;
    tracing::info!("Guru Portfolio Collector 종료");

    Ok(())
}
