//! 설정으로부터 수집기 구성 요소를 조립합니다.

use std::path::{Path, PathBuf};

use guru_core::RunContext;
use guru_data::{
    CrawlError, CrawlerConfig, Database, DatabaseConfig, HttpPageFetcher, PgSnapshotStore,
    PortfolioCrawler, SiteUrls,
};
use guru_notification::{BoardApiConfig, BoardApiSender, PostSender};

use crate::config::CollectorConfig;
use crate::modules::{generate_latest_report, sync_portfolios, SyncOptions};
use crate::stats::SyncStats;
use crate::Result;

/// DB 연결, HTTP 크롤러, 게시판 전송기를 묶은 수집기.
pub struct Collector {
    config: CollectorConfig,
    database: Database,
    store: PgSnapshotStore,
    crawler: PortfolioCrawler<HttpPageFetcher>,
    poster: Option<BoardApiSender>,
}

impl Collector {
    /// DB에 연결하고 마이그레이션을 적용한 뒤 수집기를 만듭니다.
    pub async fn connect(config: CollectorConfig) -> Result<Self> {
        let db_config = DatabaseConfig {
            max_connections: config.db_max_connections,
            ..DatabaseConfig::new(config.database_url.clone())
        };
        let database = Database::connect(&db_config).await?;
        database.migrate().await?;
        tracing::info!("데이터베이스 연결 성공");

        let site = SiteUrls::new(&config.crawl.base_url)?;
        let fetcher = HttpPageFetcher::new().map_err(CrawlError::from)?;
        let crawler = PortfolioCrawler::new(
            fetcher,
            site,
            CrawlerConfig {
                listing_timeout: config.crawl.listing_timeout(),
                holdings_timeout: config.crawl.holdings_timeout(),
                page_delay: config.crawl.page_delay(),
            },
        );

        let poster = config.post_api.enabled.then(|| {
            BoardApiSender::new(
                BoardApiConfig::new(config.post_api.base_url.clone())
                    .with_timeout(config.post_api.timeout()),
            )
        });
        if poster.is_none() {
            tracing::info!("게시글 알림 비활성화");
        }

        Ok(Self {
            store: PgSnapshotStore::new(database.clone()),
            database,
            config,
            crawler,
            poster,
        })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// 한 번의 전체 동기화를 실행합니다.
    pub async fn sync(&self, top: Option<usize>) -> Result<SyncStats> {
        let options = SyncOptions {
            top_count: top.unwrap_or(self.config.crawl.top_count),
            concurrency: self.config.crawl.concurrency,
            writer: self.config.post_api.writer.clone(),
        };
        let poster = self.poster.as_ref().map(|p| p as &dyn PostSender);

        sync_portfolios(&self.crawler, &self.store, poster, &options, &RunContext::new()).await
    }

    /// 최신 스냅샷 리포트를 생성합니다. 인자가 없으면 설정값을 사용합니다.
    pub async fn report(
        &self,
        template: Option<&Path>,
        output_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let template = template.unwrap_or(self.config.report.template_path.as_path());
        let output_dir = output_dir.unwrap_or(self.config.report.output_dir.as_path());
        generate_latest_report(&self.store, template, output_dir).await
    }

    /// DB 연결 풀을 닫습니다.
    pub async fn close(self) {
        self.database.pool().close().await;
    }
}
