//! CMS (Strapi) client
//!
//! A thin, stateless adapter over the CMS's GraphQL mutations/queries and
//! REST endpoints. One method per CMS operation; no local state is kept
//! between calls. The trait seam exists so the saga and the batch
//! orchestrator can be exercised against a scripted double in tests.

pub mod graphql;
pub mod strapi;

pub use strapi::StrapiClient;

use crate::utils::error::Result;
use async_trait::async_trait;

/// Identity registration payload
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Derived unique username (`name_email`)
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Registered identity as returned by the CMS
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// All-user record linking an identity to role/batch/group metadata
#[derive(Debug, Clone)]
pub struct NewAllUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub user_id: String,
    pub batch: String,
    pub groups: Vec<String>,
}

/// Profile record payload
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nationality: String,
    pub gender: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub bio: String,
    pub city_of_residence: String,
    pub all_user_id: String,
    pub other_info: serde_json::Value,
}

/// Trainee record payload
#[derive(Debug, Clone)]
pub struct NewTraineeRecord {
    pub email: String,
    /// Generated trainee UUID, distinct from the CMS record id
    pub trainee_id: String,
    pub status: String,
    pub batch: String,
    pub all_user_id: String,
}

/// Caller identity resolved from the CMS `me` query
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// One method per CMS operation; each is a single network call.
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Register an identity. Confirmed registration goes through the
    /// GraphQL `register` mutation (mock accounts); unconfirmed goes
    /// through the REST registration path and requires a confirmation
    /// flow outside this service.
    async fn register_user(&self, user: &NewUser, confirmed: bool) -> Result<RegisteredUser>;

    /// Link the identity to role/batch/group metadata.
    async fn create_all_user(&self, data: &NewAllUser) -> Result<String>;

    /// Store profile information.
    async fn create_profile(&self, data: &NewProfile) -> Result<String>;

    /// Store the trainee record.
    async fn create_trainee(&self, data: &NewTraineeRecord) -> Result<String>;

    /// Compensating deletes. Callers log and swallow failures so a
    /// rollback never masks the original error.
    async fn delete_user(&self, id: &str) -> Result<()>;
    async fn delete_all_user(&self, id: &str) -> Result<()>;
    async fn delete_profile(&self, id: &str) -> Result<()>;
    async fn delete_trainee(&self, id: &str) -> Result<()>;

    /// Resolve a human batch label to the CMS batch record id.
    async fn read_batch(&self, batch: &str) -> Result<Option<String>>;

    /// Validate a caller's bearer token and return their identity.
    async fn me(&self, bearer_token: &str) -> Result<AuthenticatedUser>;
}
