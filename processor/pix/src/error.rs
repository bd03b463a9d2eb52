//! pix 模块错误类型定义

/// 调用 pix API 时的传输错误，直接抛给命令层，不做重试
#[derive(Debug)]
pub enum PixError {
    /// 网络请求错误
    Network(reqwest::Error),
    /// HTTP 状态码错误
    Http { status: u16, message: String },
    /// 响应解析错误
    Parse(String),
}

impl std::fmt::Display for PixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "网络请求失败: {}", e),
            Self::Http { status, message } => write!(f, "HTTP 错误 {}: {}", status, message),
            Self::Parse(msg) => write!(f, "解析响应失败: {}", msg),
        }
    }
}

impl std::error::Error for PixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PixError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error)
    }
}

impl From<serde_json::Error> for PixError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<anyhow::Error> for PixError {
    fn from(error: anyhow::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

pub type PixResult<T> = std::result::Result<T, PixError>;
