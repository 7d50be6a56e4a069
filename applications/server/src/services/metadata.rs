/// Douban-compatible metadata client
///
/// Used to prefill album submissions from the external catalog.
use async_trait::async_trait;
use otakuy_core::{AlbumDraft, MetadataLookup, OtakuyError, Result, Suggestion};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const SERVICE: &str = "douban";

/// Client for the Douban music endpoints
#[derive(Debug, Clone)]
pub struct DoubanClient {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct SuggestItem {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    img: String,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MusicAttrs {
    #[serde(default)]
    singer: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MusicDetail {
    title: String,
    #[serde(default)]
    author: Vec<Named>,
    #[serde(default)]
    attrs: MusicAttrs,
    #[serde(default)]
    tags: Vec<Named>,
    #[serde(default)]
    image: String,
    #[serde(default)]
    summary: String,
}

impl From<MusicDetail> for AlbumDraft {
    fn from(detail: MusicDetail) -> Self {
        let artists: Vec<String> = if detail.author.is_empty() {
            detail.attrs.singer
        } else {
            detail.author.into_iter().map(|a| a.name).collect()
        };

        let mut draft = AlbumDraft::new(detail.title, artists.join(" / "));
        draft.tags = detail
            .tags
            .into_iter()
            .map(|t| t.name.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        draft.cover = Some(detail.image).filter(|c| !c.is_empty());
        draft.intro = detail.summary;
        draft
    }
}

impl DoubanClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| OtakuyError::validation(format!("Invalid metadata URL: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("OtakuyMusic/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OtakuyError::upstream(SERVICE, e.to_string()))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| OtakuyError::validation("Metadata URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(url = %url, "Metadata request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| OtakuyError::upstream(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {body}")
            };
            return Err(OtakuyError::upstream(SERVICE, message));
        }

        response
            .json()
            .await
            .map_err(|e| OtakuyError::upstream(SERVICE, format!("unexpected response: {e}")))
    }
}

#[async_trait]
impl MetadataLookup for DoubanClient {
    async fn suggest(&self, title: &str) -> Result<Vec<Suggestion>> {
        let mut url = self.endpoint(&["j", "subject_suggest"])?;
        url.query_pairs_mut().append_pair("q", title);

        let items: Vec<SuggestItem> = self.get_json(url).await?;
        Ok(items
            .into_iter()
            .map(|item| Suggestion {
                external_id: item.id,
                title: item.title,
                url: item.url,
                cover: item.img,
            })
            .collect())
    }

    async fn detail(&self, external_id: &str) -> Result<AlbumDraft> {
        let url = self.endpoint(&["v2", "music", external_id])?;
        let detail: MusicDetail = self.get_json(url).await?;
        Ok(detail.into())
    }
}
