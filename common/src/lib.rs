//! 共用工具函数库
//!
//! 这个模块包含了整个workspace中可能用到的通用工具函数。
use anyhow::{Result, anyhow};
use human_bytes::human_bytes;
use std::time::Duration;
use url::Url;
pub mod models;
pub use models::*;

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const GENERAL_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 获取环境变量的值
pub fn get_env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// 获取布尔类型的环境变量，未设置或无法识别时返回 None
pub fn get_env_flag(name: &str) -> Option<bool> {
    get_env_var(name).and_then(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// 使用url库安全地拼接URL，避免斜杠重复
pub fn join_url(base: &str, path: &str) -> Result<String> {
    let base_url = Url::parse(base)?;
    let joined = base_url.join(path)?;
    Ok(joined.to_string())
}

/// 下载图片并校验内容
///
/// 非 2xx、超过 [`MAX_FILE_SIZE`]、空文件或无法识别的图片格式都视为失败。
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    referer: Option<&str>,
    timeout: Duration,
) -> Result<Vec<u8>> {
    log::debug!("Starting download from: {}", url);

    let mut request = client
        .get(url)
        .header("User-Agent", GENERAL_UA)
        .timeout(timeout);
    if let Some(referer) = referer {
        request = request.header("Referer", referer);
    }

    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP GET request failed: {}", response.status()));
    }

    // 检查内容长度
    if let Some(size) = response.content_length() {
        log::debug!("File size: {} bytes ({})", size, convert_bytes(size as f64));
        if size as usize > MAX_FILE_SIZE {
            return Err(anyhow!(
                "File too large: {} (max: {})",
                convert_bytes(size as f64),
                convert_bytes(MAX_FILE_SIZE as f64)
            ));
        }
    }

    let bytes = response.bytes().await?;

    if bytes.is_empty() {
        return Err(anyhow!("Downloaded file is empty: {}", url));
    }

    // 再次检查实际下载的文件大小
    if bytes.len() > MAX_FILE_SIZE {
        return Err(anyhow!(
            "Downloaded file too large: {} (max: {})",
            convert_bytes(bytes.len() as f64),
            convert_bytes(MAX_FILE_SIZE as f64)
        ));
    }

    let size = imagesize::blob_size(&bytes)
        .map_err(|e| anyhow!("Downloaded file is not a valid image: {:?}", e))?;

    log::debug!(
        "Successfully downloaded {} ({}x{}, {})",
        url,
        size.width,
        size.height,
        convert_bytes(bytes.len() as f64)
    );
    Ok(bytes.to_vec())
}

/// 将字节数转换为人类可读的格式
pub fn convert_bytes<T: Into<f64>>(bytes: T) -> String {
    human_bytes(bytes.into())
}
