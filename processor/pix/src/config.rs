//! pix 图库配置

use anyhow::{Context, Result, anyhow};
use common::{get_env_flag, get_env_var};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API: &str = "http://pix.zhenxun.org";
pub const DEFAULT_IMAGE_SIZE: &str = "large";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_COUNT: u32 = 10;

/// pix 图库配置，启动时读取一次后只读共享
#[derive(Debug, Clone)]
pub struct PixConfig {
    /// API 地址，保证以 `/` 结尾
    pub api: String,
    /// 请求 get_pix 时的图片尺寸
    pub image_size: String,
    pub timeout: Duration,
    /// 按页码规则改写图片地址的主机（图库搜索使用）
    pub nginx: Option<String>,
    /// 按 img-master/img-original 改写图片地址的主机（收藏/排行使用）
    pub small_nginx: Option<String>,
    pub show_info: bool,
    /// Bearer token，设置时附加到所有 API 请求
    pub token: Option<String>,
    pub cache_dir: PathBuf,
    pub allow_group_r18: bool,
    pub max_count: u32,
}

impl Default for PixConfig {
    fn default() -> Self {
        Self {
            api: format!("{}/", DEFAULT_API),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            nginx: None,
            small_nginx: None,
            show_info: true,
            token: None,
            cache_dir: std::env::temp_dir().join("zxpix"),
            allow_group_r18: false,
            max_count: DEFAULT_MAX_COUNT,
        }
    }
}

impl PixConfig {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api = match get_env_var("ZXPIX_API") {
            Some(api) => normalize_api(&api)?,
            None => defaults.api,
        };

        let timeout = match get_env_var("ZXPIX_TIMEOUT") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("ZXPIX_TIMEOUT is not a number: {}", secs))?,
            ),
            None => defaults.timeout,
        };

        let max_count = match get_env_var("ZXPIX_MAX_COUNT") {
            Some(count) => count
                .trim()
                .parse::<u32>()
                .with_context(|| format!("ZXPIX_MAX_COUNT is not a number: {}", count))?
                .max(1),
            None => defaults.max_count,
        };

        Ok(Self {
            api,
            image_size: get_env_var("ZXPIX_IMAGE_SIZE").unwrap_or(defaults.image_size),
            timeout,
            nginx: non_empty(get_env_var("ZXPIX_NGINX")),
            small_nginx: non_empty(get_env_var("ZXPIX_SMALL_NGINX")),
            show_info: get_env_flag("ZXPIX_SHOW_INFO").unwrap_or(defaults.show_info),
            token: non_empty(get_env_var("ZXPIX_TOKEN")),
            cache_dir: get_env_var("ZXPIX_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            allow_group_r18: get_env_flag("ZXPIX_ALLOW_GROUP_R18")
                .unwrap_or(defaults.allow_group_r18),
            max_count,
        })
    }

    /// 替换 API 地址（测试时指向本地服务）
    pub fn with_api(mut self, api: &str) -> Result<Self> {
        self.api = normalize_api(api)?;
        Ok(self)
    }
}

/// 校验 API 地址并补全结尾的 `/`，避免拼接时丢失路径
fn normalize_api(api: &str) -> Result<String> {
    let url = Url::parse(api.trim()).map_err(|e| anyhow!("Invalid pix api url {}: {}", api, e))?;
    let mut api = url.to_string();
    if !api.ends_with('/') {
        api.push('/');
    }
    Ok(api)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_api() {
        assert_eq!(
            normalize_api("http://pix.zhenxun.org").unwrap(),
            "http://pix.zhenxun.org/"
        );
        assert_eq!(
            normalize_api("http://127.0.0.1:8000/api").unwrap(),
            "http://127.0.0.1:8000/api/"
        );
        assert_eq!(
            normalize_api("http://127.0.0.1:8000/api/").unwrap(),
            "http://127.0.0.1:8000/api/"
        );
        assert!(normalize_api("not a url").is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(
            non_empty(Some(" i.suimoe.com ".to_string())),
            Some("i.suimoe.com".to_string())
        );
    }

    #[test]
    fn test_default_config() {
        let config = PixConfig::default();
        assert_eq!(config.api, "http://pix.zhenxun.org/");
        assert!(config.show_info);
        assert!(config.token.is_none());
        assert_eq!(config.max_count, DEFAULT_MAX_COUNT);
    }
}
