//! 图片地址改写策略
//!
//! 图库搜索与收藏排行使用不同的 CDN 规则，统一由 [`UrlRewriteStrategy`] 表达，
//! 下载器只关心改写后的地址。

use crate::models::ImageRecord;

const IMG_MASTER: &str = "img-master";
const IMG_ORIGINAL: &str = "img-original";

/// 根据图片记录生成实际下载地址
pub trait UrlRewriteStrategy: Send + Sync {
    fn rewrite(&self, record: &ImageRecord) -> String;
}

/// 不改写，直接使用 API 返回的地址
pub struct Passthrough;

impl UrlRewriteStrategy for Passthrough {
    fn rewrite(&self, record: &ImageRecord) -> String {
        record.url.clone()
    }
}

/// 按作品页码拼接文件名
///
/// - 单页：`https://{host}/{pid}.png`
/// - 多页：`https://{host}/{pid}-{img_p + 1}.png`
pub struct PagePatternRewrite {
    host: String,
}

impl PagePatternRewrite {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl UrlRewriteStrategy for PagePatternRewrite {
    fn rewrite(&self, record: &ImageRecord) -> String {
        if record.is_multiple {
            format!(
                "https://{}/{}-{}.png",
                self.host,
                record.pid,
                record.img_p + 1
            )
        } else {
            format!("https://{}/{}.png", self.host, record.pid)
        }
    }
}

/// 将 `img-master` / `img-original` 之后的路径转到小图 CDN
///
/// 两个片段都不存在时保持原地址不变。
pub struct SmallCdnRewrite {
    host: String,
}

impl SmallCdnRewrite {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn rewrite_url(&self, url: &str) -> String {
        let segment = [IMG_MASTER, IMG_ORIGINAL]
            .into_iter()
            .find_map(|marker| url.rfind(marker).map(|pos| &url[pos..]));

        match segment {
            Some(path) => format!("https://{}/{}", self.host, path),
            None => url.to_string(),
        }
    }
}

impl UrlRewriteStrategy for SmallCdnRewrite {
    fn rewrite(&self, record: &ImageRecord) -> String {
        self.rewrite_url(&record.url)
    }
}

/// 根据是否配置了主机选择策略
pub fn page_pattern_or_passthrough(host: Option<&str>) -> Box<dyn UrlRewriteStrategy> {
    match host {
        Some(host) => Box::new(PagePatternRewrite::new(host)),
        None => Box::new(Passthrough),
    }
}

pub fn small_cdn_or_passthrough(host: Option<&str>) -> Box<dyn UrlRewriteStrategy> {
    match host {
        Some(host) => Box::new(SmallCdnRewrite::new(host)),
        None => Box::new(Passthrough),
    }
}
