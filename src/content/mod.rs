use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub mod editor;
pub mod title_lookup;

pub use editor::BlockEditor;
pub use title_lookup::TitleResolver;

/// One discrete unit of a post body. Order in the containing `Vec` is document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text {
        body: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Video {
        url: String,
        title: String,
    },
}

impl ContentBlock {
    pub fn text(body: impl Into<String>) -> Self {
        ContentBlock::Text { body: body.into() }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text { .. })
    }

    /// Caption with the "absent" and "empty" cases folded together.
    pub fn caption(&self) -> Option<&str> {
        match self {
            ContentBlock::Image { caption: Some(c), .. } if !c.is_empty() => Some(c.as_str()),
            _ => None,
        }
    }
}

/// Result of parsing the `<l>url, title</l>` directive. A `None` title means the
/// title still has to be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDirective {
    pub url: String,
    pub title: Option<String>,
}

/// Encodes the block sequence as a JSON array for the post's `content` column.
pub fn serialize_blocks(blocks: &[ContentBlock]) -> String {
    // A Vec of plain string-keyed enums cannot fail to serialize.
    serde_json::to_string(blocks).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a stored post body. Anything that is not a JSON array of well-formed
/// blocks is legacy prose and comes back as a single text block holding the input.
pub fn deserialize_blocks(content: &str) -> Vec<ContentBlock> {
    match serde_json::from_str::<Vec<ContentBlock>>(content) {
        Ok(blocks) => blocks,
        Err(_) => vec![ContentBlock::text(content)],
    }
}

fn link_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    LINK_RE.get_or_init(|| Regex::new(r"^<l>\s*(.+?)\s*,\s*(.+?)\s*</l>$").expect("link directive regex"))
}

/// Parses `<l>url, title</l>`. Titles containing commas are not supported.
pub fn parse_link_syntax(input: &str) -> LinkDirective {
    if let Some(caps) = link_regex().captures(input) {
        return LinkDirective {
            url: caps[1].to_string(),
            title: Some(caps[2].to_string()),
        };
    }
    LinkDirective {
        url: input.trim().to_string(),
        title: None,
    }
}

/// Splits a text block into paragraphs on blank lines, dropping empty ones.
pub fn split_paragraphs(body: &str) -> Vec<&str> {
    static PARA_RE: OnceLock<Regex> = OnceLock::new();
    let re = PARA_RE.get_or_init(|| Regex::new(r"\n\n+").expect("paragraph regex"));
    re.split(body).filter(|p| !p.trim().is_empty()).collect()
}

/// True only for absolute `http`/`https` URLs; used for paste detection.
pub fn is_http_url(text: &str) -> bool {
    match url::Url::parse(text) {
        Ok(u) => u.scheme() == "http" || u.scheme() == "https",
        Err(_) => false,
    }
}

/// Player URL for YouTube and Vimeo links; other URLs are returned unchanged.
pub fn to_embed_url(url: &str) -> String {
    static YT_RE: OnceLock<Regex> = OnceLock::new();
    static VIMEO_RE: OnceLock<Regex> = OnceLock::new();
    let yt = YT_RE.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]+)").expect("youtube regex")
    });
    if let Some(caps) = yt.captures(url) {
        return format!("https://www.youtube.com/embed/{}", &caps[1]);
    }
    let vimeo = VIMEO_RE.get_or_init(|| Regex::new(r"vimeo\.com/(\d+)").expect("vimeo regex"));
    if let Some(caps) = vimeo.captures(url) {
        return format!("https://player.vimeo.com/video/{}", &caps[1]);
    }
    url.to_string()
}

/// URL-safe slug: lowercase, runs of anything but `[a-z0-9]` become `-`.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}
