use ahash::AHashMap;
use serde::Serialize;

use crate::config::UserConfig;
use crate::gateway::GatewayRequest;

/// Header naming the caller's session
pub const SESSION_HEADER: &str = "x-heyhi-session";

/// Public profile of the calling user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&UserConfig> for UserInfo {
    fn from(user: &UserConfig) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Resolves who is making a request
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self, req: &GatewayRequest) -> Option<UserInfo>;
}

/// Users looked up by the session token in `X-HeyHi-Session`
#[derive(Debug, Clone, Default)]
pub struct SessionDirectory {
    by_session: AHashMap<String, UserInfo>,
}

impl SessionDirectory {
    pub fn new(users: &[UserConfig]) -> Self {
        let by_session = users
            .iter()
            .filter(|u| !u.session.is_empty())
            .map(|u| (u.session.clone(), UserInfo::from(u)))
            .collect();
        Self { by_session }
    }

    pub fn len(&self) -> usize {
        self.by_session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_session.is_empty()
    }
}

impl IdentityProvider for SessionDirectory {
    fn current_user(&self, req: &GatewayRequest) -> Option<UserInfo> {
        let session = req.header(SESSION_HEADER)?.trim();
        self.by_session.get(session).cloned()
    }
}
