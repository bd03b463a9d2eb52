//! 面向聊天命令的 pix 服务入口

use common::MessageBlock;
use std::sync::Arc;

use crate::client::GalleryClient;
use crate::config::PixConfig;
use crate::error::PixResult;
use crate::fetcher::ImageFetcher;
use crate::formatter::ResultFormatter;
use crate::models::{ApiOutcome, ImageRecord, PixKey, SearchQuery};
use crate::rewrite::{page_pattern_or_passthrough, small_cdn_or_passthrough};

/// 一条回复消息及其对应的图片记录
#[derive(Debug, Clone, PartialEq)]
pub struct PixReply {
    pub record: ImageRecord,
    pub block: MessageBlock,
}

fn pair_replies(records: Vec<ImageRecord>, blocks: Vec<MessageBlock>) -> Vec<PixReply> {
    records
        .into_iter()
        .zip(blocks)
        .map(|(record, block)| PixReply { record, block })
        .collect()
}

/// 组合 API 客户端、两种下载器与格式化器
pub struct PixService {
    config: Arc<PixConfig>,
    client: GalleryClient,
    gallery_fetcher: ImageFetcher,
    star_fetcher: ImageFetcher,
    formatter: ResultFormatter,
}

impl PixService {
    pub fn new(config: PixConfig) -> PixResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// 使用已有的 HTTP 客户端，API 与图片下载共用连接池
    pub fn with_http_client(config: PixConfig, http: reqwest::Client) -> Self {
        let config = Arc::new(config);

        let gallery_fetcher = ImageFetcher::new(
            http.clone(),
            page_pattern_or_passthrough(config.nginx.as_deref()),
            config.cache_dir.clone(),
            config.timeout,
        );
        let star_fetcher = ImageFetcher::new(
            http.clone(),
            small_cdn_or_passthrough(config.small_nginx.as_deref()),
            config.cache_dir.clone(),
            config.timeout,
        );

        Self {
            client: GalleryClient::new(http, config.clone()),
            gallery_fetcher,
            star_fetcher,
            formatter: ResultFormatter::new(config.show_info),
            config,
        }
    }

    /// 群聊中只有配置允许时才返回 r18
    pub fn effective_r18(&self, requested: bool, is_group: bool) -> bool {
        requested && (!is_group || self.config.allow_group_r18)
    }

    /// 数量限制在 1..=max_count
    pub fn clamp_count(&self, count: u32) -> u32 {
        count.clamp(1, self.config.max_count.max(1))
    }

    /// 搜索图库并下载图片，每张图片一条回复
    pub async fn search_blocks(&self, query: &SearchQuery) -> PixResult<ApiOutcome<Vec<PixReply>>> {
        Ok(match self.client.search(query).await? {
            ApiOutcome::Ok(records) => {
                log::info!("Pix search {:?} returned {} records", query.tags, records.len());
                let blocks = self
                    .formatter
                    .gallery_blocks(&self.gallery_fetcher, &records)
                    .await;
                ApiOutcome::Ok(pair_replies(records, blocks))
            }
            ApiOutcome::Failed(info) => ApiOutcome::Failed(info),
        })
    }

    /// 收藏排行，每个名次一条回复
    pub async fn rank_blocks(
        &self,
        count: u32,
        include_r18: bool,
    ) -> PixResult<ApiOutcome<Vec<PixReply>>> {
        Ok(match self.client.rank_stars(count, include_r18).await? {
            ApiOutcome::Ok(records) => {
                let blocks = self
                    .formatter
                    .rank_blocks(&self.star_fetcher, &records)
                    .await;
                ApiOutcome::Ok(pair_replies(records, blocks))
            }
            ApiOutcome::Failed(info) => ApiOutcome::Failed(info),
        })
    }

    /// 图片的完整信息
    pub fn info_text(&self, record: &ImageRecord) -> String {
        self.formatter.info_text(record)
    }

    pub async fn set_star(&self, key: &PixKey, user_id: &str, star: bool) -> PixResult<String> {
        self.client.set_star(key, user_id, star).await
    }

    pub async fn list_stars(&self, user_id: &str) -> PixResult<String> {
        self.client.list_stars(user_id).await
    }
}
