//! Shared test fixtures

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use trainee_gateway::core::cms::{
    AuthenticatedUser, CmsClient, NewAllUser, NewProfile, NewTraineeRecord, NewUser, RegisteredUser,
};
use trainee_gateway::{BatchConfig, GatewayError, Result};

/// Bearer token the scripted CMS accepts as an admin
pub const ADMIN_TOKEN: &str = "admin-token";

/// Build a batch configuration for tests.
pub fn batch_config() -> BatchConfig {
    serde_json::from_value(serde_json::json!({
        "run_stage": "dev",
        "batch": "7",
    }))
    .expect("valid test batch config")
}

/// CSV upload with the given data rows under a `name,email` header.
pub fn csv_upload(rows: &[&str]) -> Vec<u8> {
    let mut text = String::from("name,email\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text.into_bytes()
}

/// Scripted CMS double: succeeds by default, fails the configured steps
/// for the configured emails, and records every call in order.
#[derive(Default)]
pub struct ScriptedCms {
    /// Every CMS call as `operation:key`, in invocation order
    pub calls: Mutex<Vec<String>>,
    /// Emails whose user registration fails
    pub fail_register: HashSet<String>,
    /// Emails whose all-user creation fails
    pub fail_all_user: HashSet<String>,
    /// Emails whose profile creation fails
    pub fail_profile: HashSet<String>,
    /// Emails whose trainee-record creation fails
    pub fail_trainee: HashSet<String>,
    /// When set, compensating deletes fail too
    pub fail_deletes: bool,
    counter: AtomicUsize,
}

impl ScriptedCms {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, operation: &str, key: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", operation, key));
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// All recorded calls for one operation.
    pub fn calls_for(&self, operation: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(&format!("{}:", operation)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CmsClient for ScriptedCms {
    async fn register_user(&self, user: &NewUser, _confirmed: bool) -> Result<RegisteredUser> {
        self.record("register_user", &user.email);
        if self.fail_register.contains(&user.email) {
            return Err(GatewayError::cms("register_user", "scripted registration failure"));
        }
        Ok(RegisteredUser {
            id: self.next_id("user"),
            username: user.username.clone(),
            email: user.email.clone(),
        })
    }

    async fn create_all_user(&self, data: &NewAllUser) -> Result<String> {
        self.record("create_all_user", &data.email);
        if self.fail_all_user.contains(&data.email) {
            return Err(GatewayError::cms("create_all_user", "scripted alluser failure"));
        }
        Ok(self.next_id("alluser"))
    }

    async fn create_profile(&self, data: &NewProfile) -> Result<String> {
        self.record("create_profile", &data.email);
        if self.fail_profile.contains(&data.email) {
            return Err(GatewayError::cms("create_profile", "scripted profile failure"));
        }
        Ok(self.next_id("profile"))
    }

    async fn create_trainee(&self, data: &NewTraineeRecord) -> Result<String> {
        self.record("create_trainee", &data.email);
        if self.fail_trainee.contains(&data.email) {
            return Err(GatewayError::cms("create_trainee", "scripted trainee failure"));
        }
        Ok(self.next_id("trainee"))
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.record("delete_user", id);
        if self.fail_deletes {
            return Err(GatewayError::cms("delete_user", "scripted delete failure"));
        }
        Ok(())
    }

    async fn delete_all_user(&self, id: &str) -> Result<()> {
        self.record("delete_all_user", id);
        if self.fail_deletes {
            return Err(GatewayError::cms("delete_all_user", "scripted delete failure"));
        }
        Ok(())
    }

    async fn delete_profile(&self, id: &str) -> Result<()> {
        self.record("delete_profile", id);
        if self.fail_deletes {
            return Err(GatewayError::cms("delete_profile", "scripted delete failure"));
        }
        Ok(())
    }

    async fn delete_trainee(&self, id: &str) -> Result<()> {
        self.record("delete_trainee", id);
        if self.fail_deletes {
            return Err(GatewayError::cms("delete_trainee", "scripted delete failure"));
        }
        Ok(())
    }

    async fn read_batch(&self, batch: &str) -> Result<Option<String>> {
        self.record("read_batch", batch);
        Ok(Some("1".to_string()))
    }

    async fn me(&self, bearer_token: &str) -> Result<AuthenticatedUser> {
        self.record("me", bearer_token);
        match bearer_token {
            ADMIN_TOKEN => Ok(AuthenticatedUser {
                id: "1".to_string(),
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                role: "Staff".to_string(),
            }),
            "user-token" => Ok(AuthenticatedUser {
                id: "2".to_string(),
                username: "user".to_string(),
                email: "user@example.com".to_string(),
                role: "user".to_string(),
            }),
            _ => Err(GatewayError::cms("me", "invalid token")),
        }
    }
}
