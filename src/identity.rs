use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::UserInfo;

/// Read-only view of the account-management collaborator. Sessions register
/// the profile they authenticated with; everything else only looks handles up.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    users: RwLock<HashMap<String, UserInfo>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, info: UserInfo) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(info.handle.clone(), info);
    }

    pub fn lookup(&self, handle: &str) -> Option<UserInfo> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.get(handle).cloned()
    }

    pub fn is_known(&self, handle: &str) -> bool {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.contains_key(handle)
    }
}
