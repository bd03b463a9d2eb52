//! 图片下载器

use common::download_image;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::ImageRecord;
use crate::rewrite::UrlRewriteStrategy;

pub const PIXIV_REFERER: &str = "https://www.pixiv.net/";

/// 获取单张图片，失败时返回 None
#[async_trait::async_trait]
pub trait FetchImage: Send + Sync {
    async fn fetch(&self, record: &ImageRecord) -> Option<PathBuf>;
}

/// 将图片下载到缓存目录
///
/// 每次下载都使用随机文件名，并发下载同一张图片也不会互相覆盖。
pub struct ImageFetcher {
    client: reqwest::Client,
    rewrite: Box<dyn UrlRewriteStrategy>,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl ImageFetcher {
    pub fn new(
        client: reqwest::Client,
        rewrite: Box<dyn UrlRewriteStrategy>,
        cache_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            rewrite,
            cache_dir: cache_dir.into(),
            timeout,
        }
    }

    async fn download(&self, record: &ImageRecord) -> anyhow::Result<PathBuf> {
        let url = self.rewrite.rewrite(record);
        let bytes = download_image(&self.client, &url, Some(PIXIV_REFERER), self.timeout).await?;

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let file = temp_file_path(&self.cache_dir, &record.pid);
        tokio::fs::write(&file, &bytes).await?;

        log::debug!("Saved pix {} to {}", record.key(), file.display());
        Ok(file)
    }
}

#[async_trait::async_trait]
impl FetchImage for ImageFetcher {
    async fn fetch(&self, record: &ImageRecord) -> Option<PathBuf> {
        match self.download(record).await {
            Ok(file) => Some(file),
            Err(e) => {
                log::error!("Failed to download pix {}: {}", record.key(), e);
                None
            }
        }
    }
}

/// 生成 `pix_{pid}_{随机后缀}.png`
fn temp_file_path(dir: &Path, pid: &str) -> PathBuf {
    let suffix: u64 = rand::random();
    dir.join(format!("pix_{}_{:016x}.png", pid, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_temp_file_path_unique() {
        let dir = Path::new("/tmp/zxpix");
        let paths: HashSet<PathBuf> = (0..1000).map(|_| temp_file_path(dir, "114514")).collect();
        assert_eq!(paths.len(), 1000);

        for path in &paths {
            assert_eq!(path.parent(), Some(dir));
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("pix_114514_"));
            assert!(name.ends_with(".png"));
        }
    }
}
