//! Strapi client wire behavior against a mock CMS

use serde_json::json;
use trainee_gateway::config::StageConfig;
use trainee_gateway::core::cms::{
    CmsClient, NewAllUser, NewTraineeRecord, NewUser, StrapiClient,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> StrapiClient {
    let stage = StageConfig {
        url: server.uri(),
        token: Some("service-token".to_string()),
        token_env: None,
    };
    StrapiClient::new(reqwest::Client::new(), "dev", &stage).unwrap()
}

fn new_user() -> NewUser {
    NewUser {
        username: "Jane Doe_jane@example.com".to_string(),
        email: "jane@example.com".to_string(),
        password: "Secret1!pass".to_string(),
    }
}

#[tokio::test]
async fn test_confirmed_registration_uses_graphql() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer service-token"))
        .and(body_string_contains("register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"register": {"user": {
                "id": "41",
                "username": "Jane Doe_jane@example.com",
                "email": "jane@example.com"
            }}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registered = client(&server).register_user(&new_user(), true).await.unwrap();
    assert_eq!(registered.id, "41");
    assert_eq!(registered.email, "jane@example.com");
}

#[tokio::test]
async fn test_unconfirmed_registration_uses_rest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jwt": "issued-jwt",
            "user": {"id": 42, "username": "Jane Doe_jane@example.com", "email": "jane@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registered = client(&server).register_user(&new_user(), false).await.unwrap();
    assert_eq!(registered.id, "42");
}

#[tokio::test]
async fn test_graphql_errors_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Email or Username are already taken"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .register_user(&new_user(), true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already taken"));
}

#[tokio::test]
async fn test_http_failure_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_all_user(&NewAllUser {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            role: "trainee".to_string(),
            user_id: "41".to_string(),
            batch: "7".to_string(),
            groups: vec![],
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("create_all_user"));
}

#[tokio::test]
async fn test_create_all_user_extracts_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("createAllUser"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"createAllUser": {"data": {"id": 17}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server)
        .create_all_user(&NewAllUser {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            role: "trainee".to_string(),
            user_id: "41".to_string(),
            batch: "7".to_string(),
            groups: vec!["12".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(id, "17");
}

#[tokio::test]
async fn test_create_trainee_uses_content_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trainees"))
        .and(header("Authorization", "Bearer service-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 99, "attributes": {"email": "jane@example.com"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server)
        .create_trainee(&NewTraineeRecord {
            email: "jane@example.com".to_string(),
            trainee_id: "uuid-1".to_string(),
            status: "Accepted".to_string(),
            batch: "7".to_string(),
            all_user_id: "17".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(id, "99");
}

#[tokio::test]
async fn test_me_uses_caller_token_and_parses_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer caller-token"))
        .and(body_string_contains("me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"me": {
                "id": "5",
                "username": "staff",
                "email": "staff@10academy.org",
                "role": {"name": "Staff"}
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).me("caller-token").await.unwrap();
    assert_eq!(user.role, "Staff");
    assert_eq!(user.email, "staff@10academy.org");
}

#[tokio::test]
async fn test_delete_operations_hit_graphql() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"deleteAllUser": {"data": {"id": "17"}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_all_user("17").await.unwrap();
}

#[tokio::test]
async fn test_read_batch_resolves_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"batches": {"data": [{"id": "3", "attributes": {"Batch": 7}}]}}
        })))
        .mount(&server)
        .await;

    let id = client(&server).read_batch("7").await.unwrap();
    assert_eq!(id, Some("3".to_string()));
}
