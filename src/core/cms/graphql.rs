//! GraphQL documents and response envelope for the Strapi CMS

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REGISTER_USER: &str = "mutation registerUser($username: String!, $email: String!, $password: String!) { register(input: { username: $username, email: $email, password: $password }) { user { id username email } } }";

pub const CREATE_ALL_USER: &str = "mutation createAllUser($email: String, $userId: ID, $name: String, $batch: Int, $role: ENUM_ALLUSER_ROLE, $groups: [ID]) { createAllUser(data: { email: $email, user: $userId, name: $name, role: $role, Batch: $batch, groups: $groups }) { data { id } } }";

pub const CREATE_PROFILE: &str = "mutation createProfileInformation($firstName: String, $surName: String, $nationality: String, $gender: String, $email: String, $dateOfBirth: Date, $bio: String, $cityOfResidence: String, $alluser: ID, $otherInfo: JSON) { createProfileInformation(data: { first_name: $firstName, surname: $surName, nationality: $nationality, gender: $gender, email: $email, date_of_birth: $dateOfBirth, bio: $bio, city_of_residence: $cityOfResidence, all_user: $alluser, other_info: $otherInfo }) { data { id } } }";

pub const DELETE_USER: &str = "mutation deleteUser($id: ID!) { deleteUsersPermissionsUser(id: $id) { data { id } } }";

pub const DELETE_ALL_USER: &str = "mutation deleteAllUser($id: ID!) { deleteAllUser(id: $id) { data { id } } }";

pub const DELETE_PROFILE: &str = "mutation deleteProfileInformation($id: ID!) { deleteProfileInformation(id: $id) { data { id } } }";

pub const DELETE_TRAINEE: &str = "mutation deleteTrainee($id: ID!) { deleteTrainee(id: $id) { data { id } } }";

pub const GET_BATCH: &str = "query getBatch($batch: Int) { batches(filters: { Batch: { eq: $batch } }) { data { id attributes { Batch } } } }";

pub const ME_QUERY: &str = "query { me { id username email role { name } } }";

/// GraphQL request body
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<Value>,
    pub errors: Option<Vec<GraphqlError>>,
}

/// One GraphQL error entry
#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

impl GraphqlResponse {
    /// Collapse the error list into one message.
    pub fn error_message(&self) -> Option<String> {
        self.errors.as_ref().map(|errors| {
            errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        })
    }
}

/// Extract a record id from a response node; Strapi returns ids as either
/// strings or numbers depending on the content type.
pub fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
