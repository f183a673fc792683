//! Strapi implementation of the CMS client
//!
//! Issues the fixed GraphQL mutations/queries against one deployment
//! (selected by `run_stage`) plus the REST registration and insert
//! fallbacks. Stateless: every method is a single HTTP round trip.

use super::graphql::{self, GraphqlRequest, GraphqlResponse, value_to_id};
use super::{AuthenticatedUser, CmsClient, NewAllUser, NewProfile, NewTraineeRecord, NewUser, RegisteredUser};
use crate::config::StageConfig;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

/// CMS adapter bound to one deployment
#[derive(Debug, Clone)]
pub struct StrapiClient {
    http: Client,
    api_root: String,
    token: String,
    run_stage: String,
}

impl StrapiClient {
    /// Build a client for the given run stage.
    pub fn new(http: Client, run_stage: &str, stage: &StageConfig) -> Result<Self> {
        Ok(Self {
            http,
            api_root: stage.url.trim_end_matches('/').to_string(),
            token: stage.resolve_token()?,
            run_stage: run_stage.to_string(),
        })
    }

    /// The deployment this client targets.
    pub fn run_stage(&self) -> &str {
        &self.run_stage
    }

    async fn execute(
        &self,
        operation: &'static str,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value> {
        self.execute_as(operation, query, variables, &self.token).await
    }

    /// Run a GraphQL document with an explicit bearer token (used by `me`,
    /// which authenticates the caller rather than the service account).
    async fn execute_as(
        &self,
        operation: &'static str,
        query: &str,
        variables: Option<Value>,
        token: &str,
    ) -> Result<Value> {
        debug!(operation, run_stage = %self.run_stage, "CMS GraphQL call");

        let response = self
            .http
            .post(format!("{}/graphql", self.api_root))
            .bearer_auth(token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| GatewayError::cms(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::cms(
                operation,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let envelope: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::cms(operation, e.to_string()))?;

        if let Some(message) = envelope.error_message() {
            return Err(GatewayError::cms(operation, message));
        }

        envelope
            .data
            .ok_or_else(|| GatewayError::cms(operation, "Response contained no data"))
    }

    /// REST insert into `/api/<table>` (Strapi's content API).
    async fn rest_insert(&self, operation: &'static str, table: &str, data: Value) -> Result<Value> {
        debug!(operation, table, run_stage = %self.run_stage, "CMS REST insert");

        let response = self
            .http
            .post(format!("{}/api/{}", self.api_root, table))
            .bearer_auth(&self.token)
            .json(&json!({ "data": data }))
            .send()
            .await
            .map_err(|e| GatewayError::cms(operation, e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::cms(operation, e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::cms(
                operation,
                format!("HTTP {}: {}", status, body),
            ));
        }
        Ok(body)
    }

    fn id_at(data: &Value, path: &[&str]) -> Option<String> {
        let mut node = data;
        for key in path {
            node = node.get(key)?;
        }
        value_to_id(node)
    }

    fn extract_id(
        operation: &'static str,
        data: &Value,
        path: &[&str],
    ) -> Result<String> {
        Self::id_at(data, path).ok_or_else(|| {
            GatewayError::cms(operation, format!("Response missing id at {}", path.join(".")))
        })
    }
}

#[async_trait]
impl CmsClient for StrapiClient {
    async fn register_user(&self, user: &NewUser, confirmed: bool) -> Result<RegisteredUser> {
        if confirmed {
            let data = self
                .execute(
                    "register_user",
                    graphql::REGISTER_USER,
                    Some(json!({
                        "username": user.username,
                        "email": user.email,
                        "password": user.password,
                    })),
                )
                .await?;

            let node = &data["register"]["user"];
            let id = Self::extract_id("register_user", &data, &["register", "user", "id"])?;
            Ok(RegisteredUser {
                id,
                username: node["username"].as_str().unwrap_or(&user.username).to_string(),
                email: node["email"].as_str().unwrap_or(&user.email).to_string(),
            })
        } else {
            // Unconfirmed REST registration; the confirmation email flow is
            // handled by the CMS itself.
            let response = self
                .http
                .post(format!("{}/api/auth/local/register", self.api_root))
                .json(&json!({
                    "username": user.username,
                    "email": user.email,
                    "password": user.password,
                }))
                .send()
                .await
                .map_err(|e| GatewayError::cms("register_user", e.to_string()))?;

            let status = response.status();
            let body: Value = response
                .json()
                .await
                .map_err(|e| GatewayError::cms("register_user", e.to_string()))?;

            if !status.is_success() {
                return Err(GatewayError::cms(
                    "register_user",
                    format!("HTTP {}: {}", status, body),
                ));
            }

            let id = Self::extract_id("register_user", &body, &["user", "id"])?;
            Ok(RegisteredUser {
                id,
                username: body["user"]["username"]
                    .as_str()
                    .unwrap_or(&user.username)
                    .to_string(),
                email: body["user"]["email"].as_str().unwrap_or(&user.email).to_string(),
            })
        }
    }

    async fn create_all_user(&self, data: &NewAllUser) -> Result<String> {
        let batch: Value = data
            .batch
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null);

        let response = self
            .execute(
                "create_all_user",
                graphql::CREATE_ALL_USER,
                Some(json!({
                    "email": data.email,
                    "name": data.name,
                    "role": data.role,
                    "userId": data.user_id,
                    "batch": batch,
                    "groups": data.groups,
                })),
            )
            .await?;

        Self::extract_id("create_all_user", &response, &["createAllUser", "data", "id"])
    }

    async fn create_profile(&self, data: &NewProfile) -> Result<String> {
        let response = self
            .execute(
                "create_profile",
                graphql::CREATE_PROFILE,
                Some(json!({
                    "firstName": data.first_name,
                    "surName": data.last_name,
                    "email": data.email,
                    "nationality": data.nationality,
                    "gender": data.gender,
                    "dateOfBirth": data.date_of_birth.map(|d| d.to_string()),
                    "bio": data.bio,
                    "cityOfResidence": data.city_of_residence,
                    "alluser": data.all_user_id,
                    "otherInfo": data.other_info,
                })),
            )
            .await?;

        Self::extract_id(
            "create_profile",
            &response,
            &["createProfileInformation", "data", "id"],
        )
    }

    async fn create_trainee(&self, data: &NewTraineeRecord) -> Result<String> {
        // Trainee records go through the content API rather than GraphQL.
        let response = self
            .rest_insert(
                "create_trainee",
                "trainees",
                json!({
                    "email": data.email,
                    "trainee_id": data.trainee_id,
                    "Status": data.status,
                    "batch": data.batch,
                    "all_user": data.all_user_id,
                }),
            )
            .await?;

        Self::extract_id("create_trainee", &response, &["data", "id"])
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.execute("delete_user", graphql::DELETE_USER, Some(json!({ "id": id })))
            .await
            .map(|_| ())
    }

    async fn delete_all_user(&self, id: &str) -> Result<()> {
        self.execute(
            "delete_all_user",
            graphql::DELETE_ALL_USER,
            Some(json!({ "id": id })),
        )
        .await
        .map(|_| ())
    }

    async fn delete_profile(&self, id: &str) -> Result<()> {
        self.execute(
            "delete_profile",
            graphql::DELETE_PROFILE,
            Some(json!({ "id": id })),
        )
        .await
        .map(|_| ())
    }

    async fn delete_trainee(&self, id: &str) -> Result<()> {
        self.execute(
            "delete_trainee",
            graphql::DELETE_TRAINEE,
            Some(json!({ "id": id })),
        )
        .await
        .map(|_| ())
    }

    async fn read_batch(&self, batch: &str) -> Result<Option<String>> {
        let batch_number: Value = batch.parse::<i64>().map(Value::from).unwrap_or(Value::Null);
        let response = self
            .execute("read_batch", graphql::GET_BATCH, Some(json!({ "batch": batch_number })))
            .await?;

        Ok(response["batches"]["data"]
            .as_array()
            .and_then(|entries| entries.first())
            .and_then(|entry| value_to_id(&entry["id"])))
    }

    async fn me(&self, bearer_token: &str) -> Result<AuthenticatedUser> {
        let data = self
            .execute_as("me", graphql::ME_QUERY, None, bearer_token)
            .await?;

        let me = &data["me"];
        let id = Self::extract_id("me", &data, &["me", "id"])?;
        Ok(AuthenticatedUser {
            id,
            username: me["username"].as_str().unwrap_or_default().to_string(),
            email: me["email"].as_str().unwrap_or_default().to_string(),
            role: me["role"]["name"].as_str().unwrap_or("user").to_string(),
        })
    }
}
