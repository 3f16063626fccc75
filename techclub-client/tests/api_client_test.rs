//! ApiClient tests against a mock HTTP server

use serde_json::{json, Value};
use techclub_client::{ApiClient, ApplicationsApi, ClientError};
use techclub_shared::models::application::{ApplicationFilter, ApplicationStatus};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn application(id: i32, status: &str) -> Value {
    json!({
        "application_id": id,
        "university_id": format!("2023/{:05}", id),
        "full_name": "Sara Ali",
        "email": "sara@uni.edu",
        "faculty": "Computer Science",
        "year": 2,
        "phone_number": "0791234567",
        "first_choice": 1,
        "second_choice": null,
        "skills": "Rust",
        "motivation": "Build things",
        "interview": "Online",
        "status": status,
        "comment": null,
        "created_at": "2025-01-15T10:00:00Z"
    })
}

fn list_body(rows: Vec<Value>) -> Value {
    json!({ "success": true, "count": rows.len(), "data": rows, "filters": {} })
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}/api/", server.uri())).unwrap()
}

async fn logged_in(server: &MockServer) -> ApiClient {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "university_id": "2023/00001", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "token": "tok-123",
            "user": {
                "user_id": 1,
                "email": "board@uni.edu",
                "full_name": "Board Member",
                "university_id": "2023/00001",
                "role": "board",
                "department_id": null,
                "is_active": true
            }
        })))
        .mount(server)
        .await;

    let client = client(server);
    let user = client.login("2023/00001", "secret").await.unwrap();
    assert_eq!(user.user_id, 1);
    client
}

#[tokio::test]
async fn test_login_stores_token_and_sends_it() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;
    assert_eq!(client.token().await.as_deref(), Some("tok-123"));

    Mock::given(method("GET"))
        .and(path("/api/applications/7"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": application(7, "pending") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = client.get_application(7).await.unwrap();
    assert_eq!(app.application_id, 7);
    assert_eq!(app.status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn test_list_is_cached_until_a_mutation() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/applications"))
        .and(query_param("status", "pending"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_body(vec![application(7, "pending")])),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/applications/7/status"))
        .and(body_json(json!({ "status": "approved", "password": "phrase" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Application approved successfully",
            "data": { "application_id": 7, "status": "approved" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = ApplicationFilter {
        status: Some(ApplicationStatus::Pending),
        ..Default::default()
    };

    assert_eq!(client.list_applications(&filter).await.unwrap().len(), 1);
    assert_eq!(client.list_applications(&filter).await.unwrap().len(), 1);

    let status = client
        .update_status(7, ApplicationStatus::Approved, "phrase")
        .await
        .unwrap();
    assert_eq!(status, ApplicationStatus::Approved);

    // Served by the server again after invalidation
    client.list_applications(&filter).await.unwrap();
}

#[tokio::test]
async fn test_cache_is_keyed_by_query() {
    let server = MockServer::start().await;
    let client = client(&server);

    Mock::given(method("GET"))
        .and(path("/api/applications"))
        .and(query_param("faculty", "Engineering"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/applications"))
        .and(query_param("faculty", "Medicine"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_body(vec![application(3, "approved")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engineering = ApplicationFilter {
        faculty: Some("Engineering".to_string()),
        ..Default::default()
    };
    let medicine = ApplicationFilter {
        faculty: Some("Medicine".to_string()),
        ..Default::default()
    };

    assert!(client.list_applications(&engineering).await.unwrap().is_empty());
    assert_eq!(client.list_applications(&medicine).await.unwrap().len(), 1);
    assert!(client.list_applications(&engineering).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_body_becomes_api_error() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/applications/7/status"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "error": "Incorrect password" })),
        )
        .mount(&server)
        .await;

    let err = client
        .update_status(7, ApplicationStatus::Rejected, "guess")
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_body_uses_reason() {
    let server = MockServer::start().await;
    let client = client(&server);

    Mock::given(method("GET"))
        .and(path("/api/applications/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.application_stats().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("Service Unavailable"));
}

#[tokio::test]
async fn test_logout_clears_token_even_on_failure() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "success": false, "error": "Internal server error" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.logout().await.is_err());
    assert_eq!(client.token().await, None);

    // Nothing to send without a token
    assert!(client.logout().await.is_ok());
}

#[tokio::test]
async fn test_submit_and_comment() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Application submitted successfully",
            "data": { "application_id": 9, "university_id": "2023/00009", "status": "pending" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/applications/9/comment"))
        .and(body_json(json!({ "comment": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Comment updated successfully",
            "data": { "application_id": 9, "comment": null }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/applications/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Application deleted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let submission = serde_json::from_value(json!({
        "university_id": "2023/00009",
        "full_name": "Omar Haddad",
        "email": "omar@uni.edu",
        "faculty": "Engineering",
        "year": "3",
        "phone_number": "0790000009",
        "first_choice": 2,
        "skills": "Design",
        "motivation": "Teach workshops",
        "interview": "In person"
    }))
    .unwrap();

    let created = client.submit_application(&submission).await.unwrap();
    assert_eq!(created.application_id, 9);
    assert_eq!(created.status, ApplicationStatus::Pending);

    assert_eq!(client.update_comment(9, None).await.unwrap(), None);
    client.delete_application(9).await.unwrap();
}
