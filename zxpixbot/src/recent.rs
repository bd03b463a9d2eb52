//! 最近发送过的图库图片，引用 /info 时据此查找图片信息

use processor_pix::ImageRecord;
use std::collections::VecDeque;
use std::sync::Mutex;
use teloxide::types::{ChatId, MessageId};

pub const RECENT_CAPACITY: usize = 500;

/// 按发送顺序保存 (会话, 消息) 到图片记录的映射，超出容量时丢弃最早的
pub struct RecentImages {
    capacity: usize,
    entries: Mutex<VecDeque<(ChatId, MessageId, ImageRecord)>>,
}

impl RecentImages {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn remember(&self, chat_id: ChatId, message_id: MessageId, record: ImageRecord) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut entries) = self.entries.lock() else {
            log::warn!("Recent images lock poisoned, skip message {:?}", message_id);
            return;
        };
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back((chat_id, message_id, record));
    }

    pub fn find(&self, chat_id: ChatId, message_id: MessageId) -> Option<ImageRecord> {
        let entries = self.entries.lock().ok()?;
        entries
            .iter()
            .rev()
            .find(|(chat, message, _)| *chat == chat_id && *message == message_id)
            .map(|(_, _, record)| record.clone())
    }
}

impl Default for RecentImages {
    fn default() -> Self {
        Self::new(RECENT_CAPACITY)
    }
}
