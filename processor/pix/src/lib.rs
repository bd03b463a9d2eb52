//! pix 图库模块
//!
//! 本模块调用远程 pix 图库 API 获取、收藏与排行图片，
//! 下载图片到缓存目录，并组装为聊天回复。
//!
//! # 模块结构
//!
//! - [`client`] - API 客户端
//! - [`config`] - 配置
//! - [`error`] - 错误类型定义
//! - [`fetcher`] - 图片下载器
//! - [`formatter`] - 回复消息组装
//! - [`models`] - API 数据结构
//! - [`rewrite`] - 图片地址改写策略
//! - [`service`] - 命令层使用的服务入口

pub mod client;
pub mod config;
mod error;
pub mod fetcher;
pub mod formatter;
pub mod models;
pub mod rewrite;
pub mod service;

pub use client::GalleryClient;
pub use config::PixConfig;
pub use error::{PixError, PixResult};
pub use fetcher::{FetchImage, ImageFetcher};
pub use formatter::ResultFormatter;
pub use models::{ApiOutcome, ApiResult, ImageRecord, NsfwLevel, PixKey, SearchQuery};
pub use service::{PixReply, PixService};
