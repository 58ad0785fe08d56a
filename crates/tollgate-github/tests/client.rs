use serde_json::json;
use tollgate_core::TollgateError;
use tollgate_github::client::{ChangedFileSource, GitHubClient, Repository};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(
        Some("test-token"),
        Some(&server.uri()),
        Repository::new("dan1hc", "fqr"),
        100,
    )
    .unwrap()
}

#[tokio::test]
async fn fetches_one_page_of_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/dan1hc/fqr/pulls/12/files"))
        .and(query_param("per_page", "100"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "filename": "pyproject.toml", "status": "modified", "additions": 1, "deletions": 1 },
            { "filename": "fqr/__init__.py", "status": "modified", "additions": 1, "deletions": 1 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let files = client_for(&server).fetch_changed_files(12).await.unwrap();

    assert_eq!(
        files.filenames().collect::<Vec<_>>(),
        ["pyproject.toml", "fqr/__init__.py"]
    );
}

#[tokio::test]
async fn full_page_is_returned_without_following_pages() {
    let server = MockServer::start().await;
    let page: Vec<_> = (0..100)
        .map(|i| json!({ "filename": format!("fqr/mod_{i}.py") }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/repos/dan1hc/fqr/pulls/3/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page)
                .insert_header(
                    "link",
                    "<https://api.github.com/repos/dan1hc/fqr/pulls/3/files?page=2>; rel=\"next\"",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let files = client_for(&server).fetch_changed_files(3).await.unwrap();
    assert_eq!(files.len(), 100);
}

#[tokio::test]
async fn api_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/dan1hc/fqr/pulls/5/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_changed_files(5).await.unwrap_err();
    assert!(matches!(err, TollgateError::GitHub(_)));
    assert!(err.to_string().contains("Bad credentials"), "{err}");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/dan1hc/fqr/pulls/1/files"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "Service Unavailable"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_changed_files(1).await.unwrap_err();
    assert!(matches!(err, TollgateError::GitHub(_)));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "failed request was retried");
}

#[tokio::test]
async fn not_found_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_changed_files(999).await.unwrap_err();
    assert!(matches!(err, TollgateError::GitHub(_)));
}

#[test]
fn invalid_api_url_is_a_config_error() {
    let result = GitHubClient::new(
        Some("t"),
        Some("not a url"),
        Repository::new("o", "r"),
        100,
    );
    assert!(matches!(result, Err(TollgateError::Config(_))));
}
