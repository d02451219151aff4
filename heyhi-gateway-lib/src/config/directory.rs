use serde::Deserialize;

/// Content catalog backing the `get_posts` and `search_content` tools
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ContentConfig {
    /// Path to a JSON array of content items (optional)
    /// Without a catalog both content tools return empty results
    #[serde(default)]
    pub catalog_path: Option<String>,
}

/// A known user, resolved from the `X-HeyHi-Session` header by `get_user_info`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct UserConfig {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Session token identifying this user
    pub session: String,
}
