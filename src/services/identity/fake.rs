//! In-memory Identity Service for tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::client::{IdentityError, IdentityResult, IdentityService, User};

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        profile: Default::default(),
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    // token -> user
    users: HashMap<String, User>,
    // (username, password) -> token
    accounts: HashMap<(String, String), String>,
    whoami_calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn with_user(mut self, token: &str, user: User) -> Self {
        self.users.insert(token.to_string(), user);
        self
    }

    pub fn with_account(mut self, username: &str, password: &str, token: &str) -> Self {
        self.accounts
            .insert((username.to_string(), password.to_string()), token.to_string());
        self
    }

    pub fn whoami_calls(&self) -> usize {
        self.whoami_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn whoami(&self, token: &str) -> IdentityResult<User> {
        self.whoami_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                status: 401,
                message: "Unauthorized".into(),
            })
    }

    async fn login(&self, username: &str, password: &str) -> IdentityResult<String> {
        self.accounts
            .get(&(username.to_string(), password.to_string()))
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                status: 401,
                message: "Invalid email or password".into(),
            })
    }
}
