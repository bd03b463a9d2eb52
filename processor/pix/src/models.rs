use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::fmt;
use std::str::FromStr;

use crate::error::PixResult;

/// 图片分级
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NsfwLevel {
    /// 普通
    #[default]
    General,
    /// 色图
    Suggestive,
    /// r18
    Explicit,
}

impl NsfwLevel {
    /// 排行时允许的分级，r18 只有显式开启时才包含
    pub fn allowed(include_r18: bool) -> Vec<NsfwLevel> {
        if include_r18 {
            vec![Self::General, Self::Suggestive, Self::Explicit]
        } else {
            vec![Self::General, Self::Suggestive]
        }
    }
}

impl TryFrom<u8> for NsfwLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::General),
            1 => Ok(Self::Suggestive),
            2 => Ok(Self::Explicit),
            other => Err(format!("invalid nsfw level: {}", other)),
        }
    }
}

impl From<NsfwLevel> for u8 {
    fn from(level: NsfwLevel) -> Self {
        level as u8
    }
}

/// pix 图库中的一张图片
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub pid: String,
    /// 多页作品中的页码，从 0 开始
    #[serde(default, deserialize_with = "page_index")]
    pub img_p: u32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub is_multiple: bool,
    #[serde(default, rename = "nsfw_tag", alias = "nsfw_level")]
    pub nsfw_level: NsfwLevel,
    #[serde(default, rename = "star", alias = "star_count")]
    pub star_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_ai: bool,
}

impl ImageRecord {
    pub fn key(&self) -> PixKey {
        PixKey {
            pid: self.pid.clone(),
            img_p: self.img_p,
        }
    }
}

/// 图片标识，格式为 `{pid}-{img_p}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixKey {
    pub pid: String,
    pub img_p: u32,
}

impl fmt::Display for PixKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.pid, self.img_p)
    }
}

impl FromStr for PixKey {
    type Err = anyhow::Error;

    /// 支持 `123456` 与 `123456-1` 两种写法，省略页码时为 0
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (pid, img_p) = match s.split_once('-') {
            Some((pid, page)) => (
                pid,
                page.parse::<u32>()
                    .map_err(|_| anyhow!("无效的页码: {}", page))?,
            ),
            None => (s, 0),
        };

        if pid.is_empty() || !pid.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("无效的PID: {}", pid));
        }

        Ok(Self {
            pid: pid.to_string(),
            img_p,
        })
    }
}

/// API 返回的统一外层结构
///
/// `data` 先保留为原始 JSON，失败时 API 可能返回 `""`、`{}` 或直接省略。
#[derive(Debug, Deserialize)]
pub struct ApiResult {
    #[serde(rename = "suc", alias = "success")]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub info: String,
    pub data: Option<serde_json::Value>,
}

impl ApiResult {
    /// 先检查 suc，成功时才解析 data；成功但 data 为空时视为空结果
    pub fn into_outcome<T>(self) -> PixResult<ApiOutcome<T>>
    where
        T: DeserializeOwned + Default,
    {
        if !self.success {
            return Ok(ApiOutcome::Failed(self.info));
        }

        match self.data {
            None | Some(serde_json::Value::Null) => Ok(ApiOutcome::Ok(T::default())),
            Some(data) => Ok(ApiOutcome::Ok(serde_json::from_value(data)?)),
        }
    }
}

/// 业务层面的结果：成功的数据，或者 API 返回的失败信息
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Ok(T),
    Failed(String),
}

/// 收藏列表中的条目，兼容字符串与数字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarEntry(pub String);

impl<'de> Deserialize<'de> for StarEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(StarEntry)
    }
}

impl fmt::Display for StarEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 图库搜索条件
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub tags: Vec<String>,
    pub count: u32,
    pub include_r18: bool,
    /// None 表示不过滤，Some(false) 表示排除 AI 作品
    pub ai: Option<bool>,
}

impl SearchQuery {
    /// 创建搜索条件，tag 去重并保留首次出现的顺序
    pub fn new<I, S>(tags: I, count: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !tag.is_empty() && !unique.contains(&tag) {
                unique.push(tag);
            }
        }

        Self {
            tags: unique,
            count,
            include_r18: false,
            ai: None,
        }
    }

    pub fn r18(mut self, include_r18: bool) -> Self {
        self.include_r18 = include_r18;
        self
    }

    pub fn ai(mut self, ai: Option<bool>) -> Self {
        self.ai = ai;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn page_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid img_p: {}", s))),
        StringOrNumber::Number(n) => {
            u32::try_from(n).map_err(|_| D::Error::custom(format!("invalid img_p: {}", n)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_record_from_api_json() {
        let json = r#"{
            "pid": "114514",
            "img_p": "1",
            "uid": 1919810,
            "title": "夏日",
            "author": "someone",
            "url": "https://i.pximg.net/img-master/img/2024/01/01/00/00/00/114514_p1_master1200.jpg",
            "is_multiple": true,
            "nsfw_tag": 1,
            "star": 7,
            "tags": ["萝莉", "白丝"],
            "is_ai": false
        }"#;

        let record: ImageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.pid, "114514");
        assert_eq!(record.img_p, 1);
        assert_eq!(record.uid, "1919810");
        assert!(record.is_multiple);
        assert_eq!(record.nsfw_level, NsfwLevel::Suggestive);
        assert_eq!(record.star_count, 7);
        assert_eq!(record.key().to_string(), "114514-1");
    }

    #[test]
    fn test_image_record_defaults() {
        let json = r#"{"pid": 42, "url": "https://example.com/42.png"}"#;
        let record: ImageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.pid, "42");
        assert_eq!(record.img_p, 0);
        assert_eq!(record.nsfw_level, NsfwLevel::General);
        assert_eq!(record.star_count, 0);
        assert!(!record.is_multiple);
    }

    #[test]
    fn test_invalid_nsfw_level() {
        let json = r#"{"pid": "1", "url": "u", "nsfw_tag": 3}"#;
        assert!(serde_json::from_str::<ImageRecord>(json).is_err());
    }

    #[test]
    fn test_nsfw_allowed_serialization() {
        assert_eq!(
            serde_json::to_string(&NsfwLevel::allowed(false)).unwrap(),
            "[0,1]"
        );
        assert_eq!(
            serde_json::to_string(&NsfwLevel::allowed(true)).unwrap(),
            "[0,1,2]"
        );
    }

    #[test]
    fn test_pix_key_parse() {
        let key: PixKey = "123456-2".parse().unwrap();
        assert_eq!(key.pid, "123456");
        assert_eq!(key.img_p, 2);

        let key: PixKey = " 123456 ".parse().unwrap();
        assert_eq!(key.to_string(), "123456-0");

        assert!("".parse::<PixKey>().is_err());
        assert!("abc".parse::<PixKey>().is_err());
        assert!("123-x".parse::<PixKey>().is_err());
    }

    fn envelope(json: &str) -> ApiResult {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_api_result_outcome() {
        let ok = envelope(r#"{"suc": true, "code": 200, "info": "ok", "data": ["1-0", 2]}"#);
        assert_eq!(
            ok.into_outcome::<Vec<StarEntry>>().unwrap(),
            ApiOutcome::Ok(vec![
                StarEntry("1-0".to_string()),
                StarEntry("2".to_string())
            ])
        );

        let empty = envelope(r#"{"suc": true, "info": "ok", "data": null}"#);
        assert_eq!(
            empty.into_outcome::<Vec<StarEntry>>().unwrap(),
            ApiOutcome::Ok(Vec::new())
        );

        let missing = envelope(r#"{"success": true, "info": "ok"}"#);
        assert_eq!(
            missing.into_outcome::<Vec<StarEntry>>().unwrap(),
            ApiOutcome::Ok(Vec::new())
        );

        let failed = envelope(r#"{"suc": false, "code": 500, "info": "用户不存在"}"#);
        assert_eq!(
            failed.into_outcome::<Vec<StarEntry>>().unwrap(),
            ApiOutcome::Failed("用户不存在".to_string())
        );
    }

    #[test]
    fn test_failed_envelope_ignores_data_shape() {
        for data in [r#""""#, "{}", "0", r#"{"reason": "blocked"}"#] {
            let json = format!(r#"{{"suc": false, "info": "今日次数已用完", "data": {}}}"#, data);
            assert_eq!(
                envelope(&json)
                    .into_outcome::<Vec<ImageRecord>>()
                    .unwrap(),
                ApiOutcome::Failed("今日次数已用完".to_string()),
                "{}",
                data
            );
        }
    }

    #[test]
    fn test_successful_envelope_with_wrong_data_is_parse_error() {
        let result = envelope(r#"{"suc": true, "info": "ok", "data": "oops"}"#)
            .into_outcome::<Vec<ImageRecord>>();
        assert!(matches!(result, Err(crate::PixError::Parse(_))));
    }

    #[test]
    fn test_search_query_dedup() {
        let query = SearchQuery::new(["萝莉", "白丝", "萝莉", ""], 3)
            .r18(true)
            .ai(Some(false));
        assert_eq!(query.tags, vec!["萝莉".to_string(), "白丝".to_string()]);
        assert_eq!(query.count, 3);
        assert!(query.include_r18);
        assert_eq!(query.ai, Some(false));
    }
}
