//! pix 图库 API 客户端

use common::join_url;
use serde::Serialize;
use std::sync::Arc;

use crate::config::PixConfig;
use crate::error::{PixError, PixResult};
use crate::models::{
    ApiOutcome, ApiResult, ImageRecord, NsfwLevel, PixKey, SearchQuery, StarEntry,
};

const GET_PIX: &str = "pix/get_pix";
const STAR: &str = "pix/star";
const UNSTAR: &str = "pix/unstar";
const USER_STAR_LIST: &str = "pix/get_user_star_list";
const STAR_RANK: &str = "pix/star_rank";

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    tags: &'a [String],
    num: u32,
    r18: bool,
    ai: Option<bool>,
    size: &'a str,
}

#[derive(Debug, Serialize)]
struct StarPayload<'a> {
    pid: String,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct RankPayload {
    nsfw: Vec<NsfwLevel>,
    num: u32,
}

/// pix 图库 API 客户端
///
/// 所有请求共用一个连接池；传输错误直接返回，不重试。
#[derive(Clone)]
pub struct GalleryClient {
    client: reqwest::Client,
    config: Arc<PixConfig>,
}

impl GalleryClient {
    pub fn new(client: reqwest::Client, config: Arc<PixConfig>) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> PixResult<String> {
        Ok(join_url(&self.config.api, path)?)
    }

    /// 配置了 token 时附加 Bearer 认证头
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post<P>(&self, path: &str, payload: &P) -> PixResult<ApiResult>
    where
        P: Serialize + std::fmt::Debug,
    {
        let api = self.endpoint(path)?;
        log::debug!("Calling pix api: {}, payload: {:?}", api, payload);

        let request = self
            .client
            .post(&api)
            .json(payload)
            .timeout(self.config.timeout);
        self.send(self.authorize(request)).await
    }

    async fn get<Q>(&self, path: &str, query: &Q) -> PixResult<ApiResult>
    where
        Q: Serialize + std::fmt::Debug,
    {
        let api = self.endpoint(path)?;
        log::debug!("Calling pix api: {}, query: {:?}", api, query);

        let request = self
            .client
            .get(&api)
            .query(query)
            .timeout(self.config.timeout);
        self.send(self.authorize(request)).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> PixResult<ApiResult> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PixError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let text = response.text().await?;
        log::trace!("Pix api response: {}", text);

        Ok(serde_json::from_str(&text)?)
    }

    /// 按 tag 获取图片，成功时返回的数量不会超过请求数量
    pub async fn search(&self, query: &SearchQuery) -> PixResult<ApiOutcome<Vec<ImageRecord>>> {
        let payload = SearchPayload {
            tags: &query.tags,
            num: query.count,
            r18: query.include_r18,
            ai: query.ai,
            size: &self.config.image_size,
        };

        let mut outcome = self
            .post(GET_PIX, &payload)
            .await?
            .into_outcome::<Vec<ImageRecord>>();

        if let Ok(ApiOutcome::Ok(records)) = outcome.as_mut()
            && records.len() > query.count as usize
        {
            log::warn!(
                "Pix api returned {} records for {} requested, truncating",
                records.len(),
                query.count
            );
            records.truncate(query.count as usize);
        }

        outcome
    }

    /// 收藏或取消收藏，返回 API 的提示信息
    pub async fn set_star(&self, key: &PixKey, user_id: &str, star: bool) -> PixResult<String> {
        let path = if star { STAR } else { UNSTAR };
        let payload = StarPayload {
            pid: key.to_string(),
            user_id,
        };

        let result = self.post(path, &payload).await?;
        Ok(format!("⭐{}", result.info))
    }

    /// 获取用户的收藏列表文本
    pub async fn list_stars(&self, user_id: &str) -> PixResult<String> {
        let result = self.get(USER_STAR_LIST, &[("user_id", user_id)]).await?;

        Ok(match result.into_outcome::<Vec<StarEntry>>()? {
            ApiOutcome::Ok(entries) => format_star_list(&entries),
            ApiOutcome::Failed(info) => info,
        })
    }

    /// 获取收藏排行
    pub async fn rank_stars(
        &self,
        count: u32,
        include_r18: bool,
    ) -> PixResult<ApiOutcome<Vec<ImageRecord>>> {
        let payload = RankPayload {
            nsfw: NsfwLevel::allowed(include_r18),
            num: count,
        };

        self.post(STAR_RANK, &payload).await?.into_outcome()
    }
}

fn format_star_list(entries: &[StarEntry]) -> String {
    if entries.is_empty() {
        return "当前还没有收藏哦...".to_string();
    }

    let joined = entries
        .iter()
        .map(|entry| entry.0.as_str())
        .collect::<Vec<_>>()
        .join("，");
    format!("当前收藏:\n{}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_star_list() {
        let entries = vec![
            StarEntry("114514-0".to_string()),
            StarEntry("1919810-2".to_string()),
        ];
        assert_eq!(
            format_star_list(&entries),
            "当前收藏:\n114514-0，1919810-2"
        );
        assert_eq!(format_star_list(&[]), "当前还没有收藏哦...");
    }

    #[test]
    fn test_rank_payload() {
        let payload = RankPayload {
            nsfw: NsfwLevel::allowed(false),
            num: 5,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"nsfw":[0,1],"num":5}"#
        );
    }

    #[test]
    fn test_search_payload() {
        let tags = vec!["萝莉".to_string()];
        let payload = SearchPayload {
            tags: &tags,
            num: 3,
            r18: false,
            ai: None,
            size: "large",
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"tags":["萝莉"],"num":3,"r18":false,"ai":null,"size":"large"}"#
        );
    }
}
