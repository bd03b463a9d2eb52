use processor_pix::{ApiOutcome, PixError, PixKey, PixReply, PixService, SearchQuery};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use teloxide::{prelude::*, utils::command::BotCommands};

use crate::bot;
use crate::recent::RecentImages;

pub const DEFAULT_RANK_COUNT: u32 = 10;
pub const NO_RESULT_TEXT: &str = "没有找到相关图片...";
pub const EMPTY_RANK_TEXT: &str = "排行榜还是空的...";
pub const INFO_USAGE_TEXT: &str = "请引用一条图库图片消息使用 /info";
pub const INFO_MISSING_TEXT: &str = "没有找到这张图片的信息，可能已经过期...";

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "pix图库指令：")]
pub enum BotCommand {
    /// 显示帮助
    Help,
    /// pix [tags] [-n 数量] [-r] [-noai]: 通过 tag 获取图片，不含 tag 时随机抽取
    Pix(String),
    /// pixstar <pid>[-页码]: 收藏图片
    PixStar(String),
    /// pixunstar <pid>[-页码]: 取消收藏
    PixUnstar(String),
    /// 查看我的收藏
    PixMyStar,
    /// pixrank [数量] [-r]: 查看收藏排行
    PixRank(String),
    /// 引用图库图片查看图片信息
    Info,
}

static COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-n(\d*)$").unwrap());

/// `/pix` 的参数
#[derive(Debug, Clone, PartialEq)]
pub struct PixArgs {
    pub tags: Vec<String>,
    pub count: u32,
    pub r18: bool,
    pub no_ai: bool,
}

impl PixArgs {
    /// 解析 `萝莉 白丝 -n 10 -r -noai`，`-n10` 写法同样支持
    pub fn parse(text: &str) -> Self {
        let mut args = Self {
            tags: Vec::new(),
            count: 1,
            r18: false,
            no_ai: false,
        };

        let mut tokens = text.split_whitespace().peekable();
        while let Some(token) = tokens.next() {
            match token {
                "-r" => args.r18 = true,
                "-noai" => args.no_ai = true,
                _ => {
                    if let Some(caps) = COUNT_REGEX.captures(token) {
                        let inline = &caps[1];
                        let value = if inline.is_empty() {
                            tokens.next_if(|next| next.parse::<u32>().is_ok())
                        } else {
                            Some(inline)
                        };
                        if let Some(count) = value.and_then(|v| v.parse().ok()) {
                            args.count = count;
                        }
                    } else {
                        args.tags.push(token.to_string());
                    }
                }
            }
        }

        args
    }

    /// 排除 AI 作品时传 false，否则不过滤
    pub fn ai(&self) -> Option<bool> {
        if self.no_ai { Some(false) } else { None }
    }

    pub fn into_query(self, service: &PixService, is_group: bool) -> SearchQuery {
        let ai = self.ai();
        let r18 = service.effective_r18(self.r18, is_group);
        SearchQuery::new(self.tags, service.clamp_count(self.count))
            .r18(r18)
            .ai(ai)
    }
}

/// `/pixrank` 的参数：`[数量] [-r]`
pub fn parse_rank_args(text: &str) -> (u32, bool) {
    let mut count = DEFAULT_RANK_COUNT;
    let mut r18 = false;
    for token in text.split_whitespace() {
        if token == "-r" {
            r18 = true;
        } else if let Ok(n) = token.parse() {
            count = n;
        }
    }
    (count, r18)
}

/// 结果需要以纯文本回复时返回文本，有图片回复时返回 None
pub fn outcome_text(outcome: &ApiOutcome<Vec<PixReply>>, empty_text: &str) -> Option<String> {
    match outcome {
        ApiOutcome::Ok(replies) if replies.is_empty() => Some(empty_text.to_string()),
        ApiOutcome::Ok(_) => None,
        ApiOutcome::Failed(info) => Some(info.clone()),
    }
}

async fn reply_outcome(
    bot: &Bot,
    msg: &Message,
    recent: &RecentImages,
    outcome: ApiOutcome<Vec<PixReply>>,
    empty_text: &str,
) -> ResponseResult<()> {
    if let Some(text) = outcome_text(&outcome, empty_text) {
        bot::send_reply_text(bot, msg.chat.id, msg.id, text).await?;
    } else if let ApiOutcome::Ok(replies) = outcome {
        bot::send_replies(bot, msg.chat.id, msg.id, replies, recent).await;
    }
    Ok(())
}

fn is_group(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

fn sender_id(msg: &Message) -> Option<String> {
    msg.from.as_ref().map(|user| user.id.0.to_string())
}

async fn reply_pix_error(bot: &Bot, msg: &Message, e: PixError) -> ResponseResult<()> {
    log::error!("Pix request failed in chat {}: {}", msg.chat.id, e);
    bot::send_reply_text(bot, msg.chat.id, msg.id, format!("pix图库请求失败: {}", e)).await?;
    Ok(())
}

async fn handle_star(
    bot: &Bot,
    msg: &Message,
    service: &PixService,
    text: &str,
    star: bool,
) -> ResponseResult<()> {
    let Some(user_id) = sender_id(msg) else {
        bot::send_reply_text(bot, msg.chat.id, msg.id, "无法获取用户信息。").await?;
        return Ok(());
    };
    let key: PixKey = match text.parse() {
        Ok(key) => key,
        Err(e) => {
            bot::send_reply_text(bot, msg.chat.id, msg.id, format!("{}", e)).await?;
            return Ok(());
        }
    };

    match service.set_star(&key, &user_id, star).await {
        Ok(info) => {
            bot::send_reply_text(bot, msg.chat.id, msg.id, info).await?;
        }
        Err(e) => reply_pix_error(bot, msg, e).await?,
    }
    Ok(())
}

pub async fn bot_command_handler(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    service: Arc<PixService>,
    recent: Arc<RecentImages>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    match cmd {
        BotCommand::Help => {
            bot::send_reply_text(&bot, chat_id, msg.id, BotCommand::descriptions().to_string())
                .await?;
        }
        BotCommand::Pix(text) => {
            let query = PixArgs::parse(&text).into_query(&service, is_group(&msg));
            log::info!("Pix search in chat {}: {:?}", chat_id, query);

            match service.search_blocks(&query).await {
                Ok(outcome) => reply_outcome(&bot, &msg, &recent, outcome, NO_RESULT_TEXT).await?,
                Err(e) => reply_pix_error(&bot, &msg, e).await?,
            }
        }
        BotCommand::PixStar(text) => handle_star(&bot, &msg, &service, &text, true).await?,
        BotCommand::PixUnstar(text) => handle_star(&bot, &msg, &service, &text, false).await?,
        BotCommand::PixMyStar => {
            let Some(user_id) = sender_id(&msg) else {
                bot::send_reply_text(&bot, chat_id, msg.id, "无法获取用户信息。").await?;
                return Ok(());
            };

            match service.list_stars(&user_id).await {
                Ok(text) => {
                    bot::send_reply_text(&bot, chat_id, msg.id, text).await?;
                }
                Err(e) => reply_pix_error(&bot, &msg, e).await?,
            }
        }
        BotCommand::PixRank(text) => {
            let (count, r18) = parse_rank_args(&text);
            let count = service.clamp_count(count);
            let r18 = service.effective_r18(r18, is_group(&msg));

            match service.rank_blocks(count, r18).await {
                Ok(outcome) => reply_outcome(&bot, &msg, &recent, outcome, EMPTY_RANK_TEXT).await?,
                Err(e) => reply_pix_error(&bot, &msg, e).await?,
            }
        }
        BotCommand::Info => {
            let text = match msg.reply_to_message() {
                None => INFO_USAGE_TEXT.to_string(),
                Some(replied) => match recent.find(chat_id, replied.id) {
                    Some(record) => service.info_text(&record),
                    None => INFO_MISSING_TEXT.to_string(),
                },
            };
            bot::send_reply_text(&bot, chat_id, msg.id, text).await?;
        }
    };

    Ok(())
}
