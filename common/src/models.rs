use std::path::{Path, PathBuf};

/// 回复消息中的一段内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    /// 纯文本
    Text(String),
    /// 已下载到本地的图片
    Image(PathBuf),
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&Path> {
        match self {
            Self::Image(path) => Some(path),
            Self::Text(_) => None,
        }
    }
}

/// 一条回复由若干段内容组成，按顺序发送
pub type MessageBlock = Vec<MessagePart>;
