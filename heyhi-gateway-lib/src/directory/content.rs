use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;
use tracing::info;

use super::text::trim_words;
use crate::error::{GatewayError, Result};

/// Words kept in a `get_posts` excerpt
pub const POST_EXCERPT_WORDS: usize = 50;
/// Words kept in a generated search excerpt
pub const SEARCH_EXCERPT_WORDS: usize = 55;

const PUBLISHED: &str = "publish";

/// One entry of the content catalog
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Hand-written excerpt; generated from `content` when absent
    #[serde(default)]
    pub excerpt: Option<String>,
    pub url: String,
    /// Publication date, `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_post_type() -> String {
    "post".to_string()
}

fn default_status() -> String {
    PUBLISHED.to_string()
}

impl ContentItem {
    pub fn is_published(&self) -> bool {
        self.status == PUBLISHED
    }
}

/// Entry returned by `get_posts`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub url: String,
    pub date: Option<String>,
}

impl From<&ContentItem> for PostSummary {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            excerpt: trim_words(&item.content, POST_EXCERPT_WORDS),
            url: item.url.clone(),
            date: item.date.clone(),
        }
    }
}

/// Entry returned by `search_content`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub url: String,
}

impl From<&ContentItem> for SearchHit {
    fn from(item: &ContentItem) -> Self {
        let excerpt = match &item.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt.trim().to_string(),
            _ => trim_words(&item.content, SEARCH_EXCERPT_WORDS),
        };
        Self { id: item.id, title: item.title.clone(), excerpt, url: item.url.clone() }
    }
}

/// Read access to published site content
pub trait ContentRepository: Send + Sync {
    /// Newest published items of `post_type`, at most `limit`
    fn recent(&self, post_type: &str, limit: usize) -> Vec<ContentItem>;

    /// Published items whose title or body contains `query`, case-insensitively
    fn search(&self, query: &str, limit: usize) -> Vec<ContentItem>;
}

/// In-memory catalog, newest item first
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    items: Vec<ContentItem>,
}

impl ContentCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_items(mut items: Vec<ContentItem>) -> Self {
        // Missing dates sort last; ties keep the higher id first.
        items.sort_by_key(|i| Reverse((i.date.clone(), i.id)));
        Self { items }
    }

    /// Load a JSON array of items
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        let items: Vec<ContentItem> = serde_json::from_str(&raw).map_err(|e| {
            GatewayError::Catalog(format!("failed to parse {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), items = items.len(), "content catalog loaded");
        Ok(Self::from_items(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn published(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|i| i.is_published())
    }
}

impl ContentRepository for ContentCatalog {
    fn recent(&self, post_type: &str, limit: usize) -> Vec<ContentItem> {
        self.published()
            .filter(|i| i.post_type == post_type)
            .take(limit)
            .cloned()
            .collect()
    }

    fn search(&self, query: &str, limit: usize) -> Vec<ContentItem> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.published()
            .filter(|i| {
                i.title.to_lowercase().contains(&needle) || i.content.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect()
    }
}
