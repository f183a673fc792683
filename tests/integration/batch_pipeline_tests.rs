//! Batch pipeline end-to-end tests over the scripted CMS

use crate::common::{ScriptedCms, batch_config, csv_upload};
use std::sync::Arc;
use trainee_gateway::core::batch::BatchProcessor;
use trainee_gateway::{BatchConfig, BatchStatus, ErrorType, RowOutcome};

fn processor(cms: Arc<ScriptedCms>, config: BatchConfig) -> BatchProcessor {
    BatchProcessor::new(config, cms, reqwest::Client::new(), None)
}

#[tokio::test]
async fn test_all_success_batch_completes() {
    let cms = Arc::new(ScriptedCms::new());
    let file = csv_upload(&[
        "Trainee One,one@example.com",
        "Trainee Two,two@example.com",
        "Trainee Three,three@example.com",
        "Trainee Four,four@example.com",
        "Trainee Five,five@example.com",
    ]);

    let result = processor(cms.clone(), batch_config()).process(&file).await;

    assert_eq!(result.status, BatchStatus::Completed);
    assert_eq!(result.total_processed, 5);
    assert_eq!(result.successful, 5);
    assert_eq!(result.failed, 0);
    assert_eq!(cms.calls_for("register_user").len(), 5);
    assert_eq!(cms.calls_for("create_trainee").len(), 5);
}

#[tokio::test]
async fn test_blank_name_row_rejected_before_cms() {
    // Spec scenario: one valid row, one row with an empty name. The blank
    // row is rejected without any CMS call and the batch continues.
    let cms = Arc::new(ScriptedCms::new());
    let file = csv_upload(&["Jane Doe,JANE@EXAMPLE.com", ",bad@x"]);

    let result = processor(cms.clone(), batch_config()).process(&file).await;

    assert_eq!(result.status, BatchStatus::PartialSuccess);
    assert_eq!(result.total_processed, 2);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 1);

    let success = &result.successful_trainees[0];
    assert_eq!(success.row, 1);
    assert_eq!(success.email, "jane@example.com");

    let failure = &result.failed_trainees[0];
    assert_eq!(failure.row, 2);
    assert_eq!(failure.error().unwrap().error_type, ErrorType::ValidationError);

    // Only the valid row reached the CMS
    assert_eq!(
        cms.calls_for("register_user"),
        vec!["register_user:jane@example.com"]
    );
}

#[tokio::test]
async fn test_row_failure_does_not_abort_batch() {
    // CMS user creation fails for row 3 of 5; the other rows are still
    // attempted and no downstream call happens for the failed row.
    let mut cms = ScriptedCms::new();
    cms.fail_register.insert("three@example.com".to_string());
    let cms = Arc::new(cms);

    let file = csv_upload(&[
        "Trainee One,one@example.com",
        "Trainee Two,two@example.com",
        "Trainee Three,three@example.com",
        "Trainee Four,four@example.com",
        "Trainee Five,five@example.com",
    ]);

    let result = processor(cms.clone(), batch_config()).process(&file).await;

    assert_eq!(result.status, BatchStatus::PartialSuccess);
    assert_eq!(result.total_processed, 5);
    assert_eq!(result.successful, 4);
    assert_eq!(result.failed, 1);

    let failure = &result.failed_trainees[0];
    assert_eq!(failure.row, 3);
    assert_eq!(failure.error().unwrap().error_type, ErrorType::UserCreationError);

    // Row 3 never progressed past registration
    assert!(
        !cms.calls_for("create_all_user")
            .contains(&"create_all_user:three@example.com".to_string())
    );
    assert_eq!(cms.calls_for("register_user").len(), 5);
}

#[tokio::test]
async fn test_profile_failure_triggers_reverse_rollback() {
    let mut cms = ScriptedCms::new();
    cms.fail_profile.insert("jane@example.com".to_string());
    let cms = Arc::new(cms);

    let file = csv_upload(&["Jane Doe,jane@example.com"]);
    let result = processor(cms.clone(), batch_config()).process(&file).await;

    assert_eq!(result.status, BatchStatus::Failed);
    assert_eq!(
        result.failed_trainees[0].error().unwrap().error_type,
        ErrorType::ProfileCreationError
    );

    // Compensation deleted the alluser then the user, and nothing else
    assert_eq!(cms.calls_for("delete_all_user").len(), 1);
    assert_eq!(cms.calls_for("delete_user").len(), 1);
    assert!(cms.calls_for("delete_profile").is_empty());
    assert!(cms.calls_for("delete_trainee").is_empty());

    // Reverse order: alluser before user
    let calls = cms.calls.lock().unwrap().clone();
    let alluser_delete = calls.iter().position(|c| c.starts_with("delete_all_user")).unwrap();
    let user_delete = calls.iter().position(|c| c.starts_with("delete_user")).unwrap();
    assert!(alluser_delete < user_delete);
}

#[tokio::test]
async fn test_failed_compensation_keeps_original_error() {
    let mut cms = ScriptedCms::new();
    cms.fail_trainee.insert("jane@example.com".to_string());
    cms.fail_deletes = true;
    let cms = Arc::new(cms);

    let file = csv_upload(&["Jane Doe,jane@example.com"]);
    let result = processor(cms.clone(), batch_config()).process(&file).await;

    // The trainee-creation error survives even though every delete failed
    assert_eq!(
        result.failed_trainees[0].error().unwrap().error_type,
        ErrorType::TraineeCreationError
    );
    assert_eq!(cms.calls_for("delete_profile").len(), 1);
    assert_eq!(cms.calls_for("delete_all_user").len(), 1);
    assert_eq!(cms.calls_for("delete_user").len(), 1);
}

#[tokio::test]
async fn test_missing_required_columns_rejects_batch() {
    let cms = Arc::new(ScriptedCms::new());
    let file = b"name,phone\nJane Doe,0911000000\n".to_vec();

    let result = processor(cms.clone(), batch_config()).process(&file).await;

    assert_eq!(result.status, BatchStatus::Failed);
    let error = result.error.unwrap();
    assert_eq!(error.error_type, ErrorType::ValidationError);
    assert!(error.error_message.contains("email"));
    assert_eq!(result.total_processed, 0);
    assert!(cms.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_upload_rejected() {
    let cms = Arc::new(ScriptedCms::new());
    let result = processor(cms.clone(), batch_config()).process(&[]).await;

    assert_eq!(result.status, BatchStatus::Failed);
    assert_eq!(result.error.unwrap().error_type, ErrorType::EmptyFileError);
    assert!(cms.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_header_only_upload_completes_empty() {
    let cms = Arc::new(ScriptedCms::new());
    let result = processor(cms.clone(), batch_config())
        .process(b"name,email\n")
        .await;

    assert_eq!(result.status, BatchStatus::Completed);
    assert_eq!(result.total_processed, 0);
    assert!(result.error.is_none());
    assert!(cms.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_upload_rejected() {
    let cms = Arc::new(ScriptedCms::new());
    let result = processor(cms.clone(), batch_config())
        .process(b"name,email\nRen\xe9,rene@example.com\n")
        .await;

    assert_eq!(result.status, BatchStatus::Failed);
    assert_eq!(result.error.unwrap().error_type, ErrorType::ValidationError);
    assert!(cms.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_all_rows_failing_marks_batch_failed() {
    let mut cms = ScriptedCms::new();
    cms.fail_register.insert("one@example.com".to_string());
    cms.fail_register.insert("two@example.com".to_string());
    let cms = Arc::new(cms);

    let file = csv_upload(&["Trainee One,one@example.com", "Trainee Two,two@example.com"]);
    let result = processor(cms, batch_config()).process(&file).await;

    assert_eq!(result.status, BatchStatus::Failed);
    assert_eq!(result.successful, 0);
    assert_eq!(result.failed, 2);
}

#[tokio::test]
async fn test_mock_batch_discloses_generated_password() {
    let cms = Arc::new(ScriptedCms::new());
    let mut config = batch_config();
    config.is_mock = true;

    let file = csv_upload(&["Jane Doe,jane@example.com"]);
    let result = processor(cms, config).process(&file).await;

    match &result.successful_trainees[0].outcome {
        RowOutcome::Success { password, .. } => {
            assert!(password.as_ref().is_some_and(|p| !p.is_empty()));
        }
        RowOutcome::Failed { .. } => panic!("row should have succeeded"),
    }
}

#[tokio::test]
async fn test_real_batch_never_discloses_password() {
    let cms = Arc::new(ScriptedCms::new());
    let file = csv_upload(&["Jane Doe,jane@example.com"]);
    let result = processor(cms, batch_config()).process(&file).await;

    match &result.successful_trainees[0].outcome {
        RowOutcome::Success { password, .. } => assert!(password.is_none()),
        RowOutcome::Failed { .. } => panic!("row should have succeeded"),
    }
}

#[tokio::test]
async fn test_rows_processed_in_file_order() {
    let cms = Arc::new(ScriptedCms::new());
    let file = csv_upload(&[
        "Trainee One,one@example.com",
        "Trainee Two,two@example.com",
        "Trainee Three,three@example.com",
    ]);

    processor(cms.clone(), batch_config()).process(&file).await;

    assert_eq!(
        cms.calls_for("register_user"),
        vec![
            "register_user:one@example.com",
            "register_user:two@example.com",
            "register_user:three@example.com",
        ]
    );
}
