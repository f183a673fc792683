//! Resource-creation saga
//!
//! Provisions one applicant through the ordered steps
//! user -> all-user -> profile -> trainee record. Each step's returned id is
//! recorded in a row-local [`CreatedResources`]; when a step fails, the
//! already-created resources are deleted in strict reverse order and the
//! saga terminates with a structured error naming the failed step.
//!
//! Compensation is best-effort: a failed delete is logged and swallowed so
//! it never masks the original error, which means a failed saga can leave
//! orphaned CMS records. Callers must tolerate that; no cross-service
//! transaction is possible without CMS-side support.

use crate::core::cms::{CmsClient, NewAllUser, NewProfile, NewTraineeRecord, NewUser};
use crate::core::models::{ErrorType, ProcessedTrainee, RowError};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Ids created so far for one row, consumed by compensation.
#[derive(Debug, Clone, Default)]
pub struct CreatedResources {
    pub user_id: Option<String>,
    pub alluser_id: Option<String>,
    pub profile_id: Option<String>,
    pub trainee_id: Option<String>,
}

/// All four ids of a fully provisioned trainee
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub user_id: String,
    pub alluser_id: String,
    pub profile_id: String,
    /// CMS trainee record id
    pub trainee_record_id: String,
    /// Generated trainee UUID stored on the record
    pub trainee_uuid: String,
}

/// One-row provisioning saga over a CMS client
pub struct ProvisionSaga<'a> {
    cms: &'a dyn CmsClient,
}

impl<'a> ProvisionSaga<'a> {
    pub fn new(cms: &'a dyn CmsClient) -> Self {
        Self { cms }
    }

    /// Run the full saga for one normalized trainee.
    pub async fn run(&self, trainee: &ProcessedTrainee) -> Result<Provisioned, RowError> {
        let mut resources = CreatedResources::default();

        // 1. Register the identity. Mock accounts are registered confirmed
        // through GraphQL; real accounts go through the unconfirmed REST
        // path and a confirmation flow outside this service.
        let user = NewUser {
            username: trainee.username(),
            email: trainee.email.clone(),
            password: trainee.password.clone(),
        };
        let registered = match self.cms.register_user(&user, trainee.is_mock).await {
            Ok(registered) => registered,
            Err(e) => {
                return Err(self
                    .fail(ErrorType::UserCreationError, "user_creation", e.to_string(), &resources)
                    .await
                    .with_data(serde_json::json!({ "email": trainee.email })));
            }
        };
        resources.user_id = Some(registered.id.clone());

        // 2. Link the identity to role/batch/group metadata.
        let all_user = NewAllUser {
            name: trainee.name.clone(),
            email: trainee.email.clone(),
            role: trainee.role.clone(),
            user_id: registered.id.clone(),
            batch: trainee.batch.clone(),
            groups: trainee.groups.clone(),
        };
        let alluser_id = match self.cms.create_all_user(&all_user).await {
            Ok(id) => id,
            Err(e) => {
                return Err(self
                    .fail(
                        ErrorType::AlluserCreationError,
                        "alluser_creation",
                        e.to_string(),
                        &resources,
                    )
                    .await);
            }
        };
        resources.alluser_id = Some(alluser_id.clone());

        // 3. Store the profile.
        let (first_name, last_name) = trainee.name_parts();
        let profile = NewProfile {
            first_name,
            last_name,
            email: trainee.email.clone(),
            nationality: trainee.nationality.clone(),
            gender: trainee.gender.clone(),
            date_of_birth: trainee.date_of_birth,
            bio: trainee.bio.clone(),
            city_of_residence: trainee.city_of_residence.clone(),
            all_user_id: alluser_id.clone(),
            other_info: profile_other_info(trainee),
        };
        let profile_id = match self.cms.create_profile(&profile).await {
            Ok(id) => id,
            Err(e) => {
                return Err(self
                    .fail(
                        ErrorType::ProfileCreationError,
                        "profile_creation",
                        e.to_string(),
                        &resources,
                    )
                    .await);
            }
        };
        resources.profile_id = Some(profile_id.clone());

        // 4. Store the trainee record.
        let trainee_uuid = Uuid::new_v4().to_string();
        let record = NewTraineeRecord {
            email: trainee.email.clone(),
            trainee_id: trainee_uuid.clone(),
            status: trainee.status.clone(),
            batch: trainee.batch.clone(),
            all_user_id: alluser_id.clone(),
        };
        let trainee_record_id = match self.cms.create_trainee(&record).await {
            Ok(id) => id,
            Err(e) => {
                return Err(self
                    .fail(
                        ErrorType::TraineeCreationError,
                        "trainee_creation",
                        e.to_string(),
                        &resources,
                    )
                    .await);
            }
        };

        info!(
            email = %trainee.email,
            user_id = %registered.id,
            alluser_id = %alluser_id,
            "Trainee provisioned"
        );

        Ok(Provisioned {
            user_id: registered.id,
            alluser_id,
            profile_id,
            trainee_record_id,
            trainee_uuid,
        })
    }

    /// Compensate and build the step error.
    async fn fail(
        &self,
        error_type: ErrorType,
        location: &str,
        message: String,
        resources: &CreatedResources,
    ) -> RowError {
        self.compensate(resources).await;
        RowError::new(error_type, message).with_location(location)
    }

    /// Delete created resources in strict reverse creation order, skipping
    /// ids that were never populated. Failures are logged, never raised.
    async fn compensate(&self, resources: &CreatedResources) {
        if let Some(id) = &resources.trainee_id {
            if let Err(e) = self.cms.delete_trainee(id).await {
                warn!(trainee_id = %id, error = %e, "Compensating trainee delete failed");
            }
        }
        if let Some(id) = &resources.profile_id {
            if let Err(e) = self.cms.delete_profile(id).await {
                warn!(profile_id = %id, error = %e, "Compensating profile delete failed");
            }
        }
        if let Some(id) = &resources.alluser_id {
            if let Err(e) = self.cms.delete_all_user(id).await {
                warn!(alluser_id = %id, error = %e, "Compensating alluser delete failed");
            }
        }
        if let Some(id) = &resources.user_id {
            if let Err(e) = self.cms.delete_user(id).await {
                warn!(user_id = %id, error = %e, "Compensating user delete failed");
            }
        }
    }
}

/// Profile metadata: free-form columns plus the vulnerable flag.
fn profile_other_info(trainee: &ProcessedTrainee) -> Value {
    let mut map = trainee.other_info.clone();
    map.insert(
        "vulnerable".to_string(),
        Value::String(trainee.vulnerable.clone()),
    );
    Value::Object(map)
}
