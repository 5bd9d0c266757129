use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://noembed.com/embed";

#[derive(Deserialize)]
struct EmbedResponse {
    title: Option<String>,
}

/// Best-effort title lookup against an oEmbed-style metadata service.
/// One attempt, no retry; every failure resolves to a local placeholder.
#[derive(Clone)]
pub struct TitleResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl TitleResolver {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client for title lookup: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub async fn fetch_video_title(&self, url: &str) -> String {
        match self.lookup(url).await {
            Ok(Some(title)) => title,
            Ok(None) => fallback_title(url),
            Err(e) => {
                log::debug!("Title lookup for '{}' failed: {}", url, e);
                fallback_title(url)
            }
        }
    }

    async fn lookup(&self, url: &str) -> Result<Option<String>, reqwest::Error> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await?
            .text()
            .await?;
        Ok(title_from_response(&body))
    }
}

/// Extracts a non-empty `title` from an embed response body.
pub fn title_from_response(body: &str) -> Option<String> {
    serde_json::from_str::<EmbedResponse>(body)
        .ok()
        .and_then(|r| r.title)
        .filter(|t| !t.trim().is_empty())
}

/// `"Video (<host>)"` with a leading `www.` dropped, or `"Video Link"` when the
/// input is not a URL with a host.
pub fn fallback_title(url: &str) -> String {
    match url::Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => {
            let host = host.strip_prefix("www.").unwrap_or(&host);
            format!("Video ({})", host)
        }
        None => "Video Link".to_string(),
    }
}
