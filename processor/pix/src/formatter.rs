//! 将图片与信息组装为回复消息

use common::{MessageBlock, MessagePart};
use futures::future::join_all;
use std::path::PathBuf;

use crate::fetcher::FetchImage;
use crate::models::ImageRecord;

pub const GALLERY_FAILED_TEXT: &str = "获取图片失败...";
pub const RANK_FAILED_TEXT: &str = "这张图片下载失败了...";

pub struct ResultFormatter {
    show_info: bool,
}

impl ResultFormatter {
    pub fn new(show_info: bool) -> Self {
        Self { show_info }
    }

    /// 图库搜索的单条结果；下载失败时只有一段提示文本
    pub fn gallery_block(&self, record: &ImageRecord, image: Option<PathBuf>) -> MessageBlock {
        let Some(image) = image else {
            return vec![MessagePart::text(GALLERY_FAILED_TEXT)];
        };

        let mut block = Vec::with_capacity(2);
        if self.show_info {
            block.push(MessagePart::Text(summary(record)));
        }
        block.push(MessagePart::Image(image));
        block
    }

    /// 引用图片查看信息时的完整文本，不受 show_info 影响
    pub fn info_text(&self, record: &ImageRecord) -> String {
        let mut text = summary(record);
        text.push_str(&format!(
            "\npage: {}\nnsfw: {}\nAI: {}\nstar: {}",
            record.img_p,
            u8::from(record.nsfw_level),
            if record.is_ai { "是" } else { "否" },
            record.star_count
        ));
        if !record.tags.is_empty() {
            text.push_str(&format!("\ntags: {}", record.tags.join(", ")));
        }
        text
    }

    /// 排行中的单条结果，rank 从 1 开始
    pub fn rank_block(
        &self,
        rank: usize,
        record: &ImageRecord,
        image: Option<PathBuf>,
    ) -> MessageBlock {
        let header = format!(
            "rank: {}\npid: {}\nuid: {}\nstar: {}",
            rank, record.pid, record.uid, record.star_count
        );
        let image = match image {
            Some(path) => MessagePart::Image(path),
            None => MessagePart::text(RANK_FAILED_TEXT),
        };
        vec![MessagePart::Text(header), image]
    }

    pub async fn gallery_blocks<F>(&self, fetcher: &F, records: &[ImageRecord]) -> Vec<MessageBlock>
    where
        F: FetchImage + ?Sized,
    {
        let images = fetch_all(fetcher, records).await;
        records
            .iter()
            .zip(images)
            .map(|(record, image)| self.gallery_block(record, image))
            .collect()
    }

    pub async fn rank_blocks<F>(&self, fetcher: &F, records: &[ImageRecord]) -> Vec<MessageBlock>
    where
        F: FetchImage + ?Sized,
    {
        let images = fetch_all(fetcher, records).await;
        records
            .iter()
            .zip(images)
            .enumerate()
            .map(|(index, (record, image))| self.rank_block(index + 1, record, image))
            .collect()
    }
}

fn summary(record: &ImageRecord) -> String {
    format!(
        "title: {}\nauthor: {}\nPID: {}\nUID: {}",
        record.title, record.author, record.pid, record.uid
    )
}

/// 并发下载，返回结果与输入一一对应
pub async fn fetch_all<F>(fetcher: &F, records: &[ImageRecord]) -> Vec<Option<PathBuf>>
where
    F: FetchImage + ?Sized,
{
    join_all(records.iter().map(|record| fetcher.fetch(record))).await
}
