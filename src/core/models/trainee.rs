//! Trainee request and processed-record types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-request configuration for single trainee creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigInfo {
    /// Deployment/tenant selector
    pub run_stage: String,
    /// Batch label the trainee belongs to
    #[serde(default)]
    pub batch: String,
    /// Role assigned in the CMS
    #[serde(default = "default_role")]
    pub role: String,
    /// Optional group assignment
    #[serde(default)]
    pub group_id: Option<String>,
    /// Mock accounts are registered confirmed and may disclose passwords
    #[serde(default)]
    pub is_mock: bool,
    /// Login URL included in welcome emails
    #[serde(default)]
    pub login_url: Option<String>,
}

/// One trainee as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeInfo {
    pub name: String,
    pub email: String,
    /// Used verbatim when supplied; otherwise a password is generated
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub vulnerable: String,
    #[serde(default)]
    pub city_of_residence: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub other_info: Option<Value>,
}

/// Single trainee creation request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeCreate {
    pub config: ConfigInfo,
    pub trainee: TraineeInfo,
}

/// Normalized form of one trainee row, ready for the provisioning saga.
///
/// Invariant: `name` is non-empty with at least one alphabetic character
/// and `email` is a validated lowercase address; rows violating this never
/// reach the CMS.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTrainee {
    pub name: String,
    pub email: String,
    pub password: String,
    pub status: String,
    pub nationality: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub vulnerable: String,
    pub city_of_residence: String,
    pub bio: String,
    /// Role from the batch/request configuration
    pub role: String,
    /// Batch label from the batch/request configuration
    pub batch: String,
    /// Group assignments from the batch/request configuration
    pub groups: Vec<String>,
    /// Registration mode carried from the configuration
    pub is_mock: bool,
    /// Columns outside the fixed field set, preserved as free-form metadata
    pub other_info: Map<String, Value>,
}

impl ProcessedTrainee {
    /// Split the cleaned name into (first, rest) for the profile record.
    pub fn name_parts(&self) -> (String, String) {
        let mut parts = self.name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let last = parts.collect::<Vec<_>>().join(" ");
        (first, last)
    }

    /// Derived unique CMS username (`name_email` avoids name collisions).
    pub fn username(&self) -> String {
        format!("{}_{}", self.name, self.email)
    }
}

fn default_role() -> String {
    "trainee".to_string()
}
