use serde_json::{Map, Value};

use super::rejection::Rejection;
use crate::directory::{sanitize_query, ContentRepository, PostSummary, SearchHit, UserInfo};

pub const DEFAULT_POST_TYPE: &str = "post";
pub const DEFAULT_POSTS_LIMIT: usize = 10;
pub const MAX_POSTS_LIMIT: usize = 50;
pub const SEARCH_LIMIT: usize = 10;

/// Actions the `/tools` endpoint executes locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAction {
    GetPosts { post_type: String, limit: usize },
    SearchContent { query: String },
    GetUserInfo,
}

impl ToolAction {
    /// Select the action named by the body's `action` field
    pub fn parse(body: &Map<String, Value>) -> Result<Self, Rejection> {
        let name = body.get("action").and_then(Value::as_str).unwrap_or_default();
        match name {
            "get_posts" => Ok(ToolAction::GetPosts {
                post_type: body
                    .get("post_type")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(DEFAULT_POST_TYPE)
                    .to_string(),
                limit: posts_limit(body.get("limit")),
            }),
            "search_content" => Ok(ToolAction::SearchContent {
                query: sanitize_query(&text_field(body.get("query"))),
            }),
            "get_user_info" => Ok(ToolAction::GetUserInfo),
            other => Err(Rejection::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolAction::GetPosts { .. } => "get_posts",
            ToolAction::SearchContent { .. } => "search_content",
            ToolAction::GetUserInfo => "get_user_info",
        }
    }

    /// Run the action; `caller` is only consulted by `get_user_info`
    pub fn execute(&self, content: &dyn ContentRepository, caller: Option<UserInfo>) -> Value {
        match self {
            ToolAction::GetPosts { post_type, limit } => {
                let posts: Vec<PostSummary> =
                    content.recent(post_type, *limit).iter().map(PostSummary::from).collect();
                serde_json::to_value(posts).unwrap_or_else(|_| Value::Array(Vec::new()))
            }
            ToolAction::SearchContent { query } if query.is_empty() => Value::Array(Vec::new()),
            ToolAction::SearchContent { query } => {
                let hits: Vec<SearchHit> =
                    content.search(query, SEARCH_LIMIT).iter().map(SearchHit::from).collect();
                serde_json::to_value(hits).unwrap_or_else(|_| Value::Array(Vec::new()))
            }
            ToolAction::GetUserInfo => caller
                .and_then(|user| serde_json::to_value(user).ok())
                .unwrap_or_else(|| Value::Array(Vec::new())),
        }
    }
}

/// Requested page size: capped at 50, anything unusable falls back to 10
fn posts_limit(raw: Option<&Value>) -> usize {
    let requested = match raw {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match requested {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(MAX_POSTS_LIMIT).min(MAX_POSTS_LIMIT),
        _ => DEFAULT_POSTS_LIMIT,
    }
}

fn text_field(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_parse_get_posts_defaults_and_cap() {
        let action = ToolAction::parse(&object(json!({"action": "get_posts"})));
        assert_eq!(
            action,
            Ok(ToolAction::GetPosts { post_type: "post".into(), limit: DEFAULT_POSTS_LIMIT })
        );

        let action = ToolAction::parse(&object(json!({"action": "get_posts", "limit": 500})));
        assert_eq!(action, Ok(ToolAction::GetPosts { post_type: "post".into(), limit: 50 }));

        let action =
            ToolAction::parse(&object(json!({"action": "get_posts", "limit": "3", "post_type": "page"})));
        assert_eq!(action, Ok(ToolAction::GetPosts { post_type: "page".into(), limit: 3 }));
    }

    #[test]
    fn test_non_positive_limit_falls_back() {
        assert_eq!(posts_limit(Some(&json!(0))), DEFAULT_POSTS_LIMIT);
        assert_eq!(posts_limit(Some(&json!(-4))), DEFAULT_POSTS_LIMIT);
        assert_eq!(posts_limit(Some(&json!("many"))), DEFAULT_POSTS_LIMIT);
        assert_eq!(posts_limit(Some(&json!(7.9))), 7);
    }

    #[test]
    fn test_parse_search_sanitizes_query() {
        let action =
            ToolAction::parse(&object(json!({"action": "search_content", "query": " <i>hello</i>  world "})));
        assert_eq!(action, Ok(ToolAction::SearchContent { query: "hello world".into() }));
    }

    #[test]
    fn test_unknown_and_missing_action() {
        assert_eq!(
            ToolAction::parse(&object(json!({"action": "delete_site"}))),
            Err(Rejection::UnknownAction("delete_site".into()))
        );
        assert_eq!(
            ToolAction::parse(&object(json!({}))),
            Err(Rejection::UnknownAction(String::new()))
        );
    }
}
