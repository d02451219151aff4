//! Collaborators behind the `/tools` actions: published content and the
//! identity of the caller.

mod content;
mod identity;
mod text;

pub use content::{
    ContentCatalog, ContentItem, ContentRepository, PostSummary, SearchHit, POST_EXCERPT_WORDS,
    SEARCH_EXCERPT_WORDS,
};
pub use identity::{IdentityProvider, SessionDirectory, UserInfo, SESSION_HEADER};
pub use text::{sanitize_query, trim_words};
