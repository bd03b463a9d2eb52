use common::{MessageBlock, MessagePart};
use processor_pix::PixReply;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message, MessageId, ParseMode, ReplyParameters};
use teloxide::utils::html;

use crate::recent::RecentImages;

/// 将一条回复拆成说明文字和图片
fn split_block(block: &MessageBlock) -> (String, Vec<&std::path::Path>) {
    let caption = block
        .iter()
        .filter_map(MessagePart::as_text)
        .map(html::escape)
        .collect::<Vec<_>>()
        .join("\n");
    let images = block.iter().filter_map(MessagePart::as_image).collect();
    (caption, images)
}

/// 发送一条回复：有图片时文字作为第一张图片的说明，否则发送纯文本
pub async fn send_block(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    block: &MessageBlock,
) -> ResponseResult<Message> {
    let (caption, images) = split_block(block);
    log::debug!(
        "send_block: {}\n\t{}\n\t{} images",
        chat_id,
        caption,
        images.len()
    );

    let Some((first, rest)) = images.split_first() else {
        return send_reply_html(bot, chat_id, message_id, caption).await;
    };

    let mut request = bot
        .send_photo(chat_id, InputFile::file(*first))
        .reply_parameters(ReplyParameters::new(message_id));
    if !caption.is_empty() {
        request = request.caption(caption).parse_mode(ParseMode::Html);
    }
    let message = request.await?;

    for image in rest {
        bot.send_photo(chat_id, InputFile::file(*image))
            .reply_parameters(ReplyParameters::new(message_id))
            .await?;
    }

    Ok(message)
}

/// 依次发送所有回复，单条失败只记录日志；发送成功的消息记入 recent，发送后删除临时图片
pub async fn send_replies(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    replies: Vec<PixReply>,
    recent: &RecentImages,
) {
    let total = replies.len();
    for (index, reply) in replies.into_iter().enumerate() {
        match send_block(bot, chat_id, message_id, &reply.block).await {
            Ok(sent) => recent.remember(chat_id, sent.id, reply.record),
            Err(e) => log::error!(
                "Failed to send block {}/{} to chat {}: {}",
                index + 1,
                total,
                chat_id,
                e
            ),
        }
        remove_images(&reply.block).await;
    }
}

async fn remove_images(block: &MessageBlock) {
    for image in block.iter().filter_map(MessagePart::as_image) {
        if let Err(e) = tokio::fs::remove_file(image).await {
            log::warn!("Failed to remove temp image {}: {}", image.display(), e);
        }
    }
}

// 简单的发送文本回复，内容会被转义
pub async fn send_reply_text(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: impl AsRef<str>,
) -> ResponseResult<Message> {
    send_reply_html(bot, chat_id, message_id, html::escape(text.as_ref())).await
}

async fn send_reply_html(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: String,
) -> ResponseResult<Message> {
    log::debug!("send_reply_text: {}\n\t{}", chat_id, text);
    bot.send_message(chat_id, text)
        .reply_parameters(ReplyParameters::new(message_id))
        .parse_mode(ParseMode::Html)
        .await
}
