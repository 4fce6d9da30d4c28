//! The image host driving the GitHub Contents API, against a mock server.

use repopix_core::{HostError, ImageHost, RepositoryConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn host(server: &MockServer) -> ImageHost<repopix_store::GitHubStore> {
    let config = RepositoryConfig::new("octo", "pics")
        .with_token("ghp_test")
        .with_api_url(server.uri());
    ImageHost::github(config).unwrap()
}

fn written(path: &str) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap();
    json!({
        "content": { "type": "file", "name": name, "path": path, "sha": "f00d", "size": 0 },
        "commit": { "sha": "c0ffee" }
    })
}

#[tokio::test]
async fn test_categories_and_images_from_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/pics/contents/images"))
        .and(query_param("ref", "main"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "dir", "name": "Pets", "path": "images/Pets", "sha": "d1", "size": 0 },
            { "type": "file", "name": "top.PNG", "path": "images/top.PNG", "sha": "f1", "size": 3,
              "download_url": "https://raw.githubusercontent.com/octo/pics/main/images/top.PNG" },
            { "type": "file", "name": "notes.md", "path": "images/notes.md", "sha": "f2", "size": 3 }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/pics/contents/images/Pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "file", "name": ".keep", "path": "images/Pets/.keep", "sha": "k", "size": 0 },
            { "type": "file", "name": "cat.jpg", "path": "images/Pets/cat.jpg", "sha": "f3", "size": 9 }
        ])))
        .mount(&server)
        .await;

    let host = host(&server);
    let categories = host.list_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].id, "d1");

    let images = host.list_images().await.unwrap();
    let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["top.PNG", "cat.jpg"]);
    assert_eq!(
        images[1].download_url,
        "https://raw.githubusercontent.com/octo/pics/main/images/Pets/cat.jpg"
    );
}

#[tokio::test]
async fn test_rejected_credentials_are_a_configuration_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    let err = host(&server).list_categories().await.unwrap_err();
    assert!(matches!(err, HostError::Configuration(ref m) if m.contains("Bad credentials")));
}

#[tokio::test]
async fn test_upload_provisions_missing_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/pics/contents/images/Pets/2024"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/repos/octo/pics/contents/images/Pets/2024/.keep"))
        .and(body_partial_json(json!({
            "message": "Create folder: images/Pets/2024",
            "content": "",
            "branch": "main"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(written("images/Pets/2024/.keep")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/repos/octo/pics/contents/images/Pets/2024/\d+-My-File\.png$"))
        .and(body_partial_json(json!({ "content": "aGk=", "branch": "main" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(written("images/Pets/2024/1-My-File.png")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = host(&server)
        .upload(b"hi", "My File.png", Some("Pets"), Some("2024"))
        .await
        .unwrap();

    assert!(url.starts_with("https://raw.githubusercontent.com/octo/pics/main/images/Pets/2024/"));
    assert!(url.ends_with("-My-File.png"));
}

#[tokio::test]
async fn test_delete_uses_current_sha() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/pics/contents/images/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file", "name": "cat.png", "path": "images/cat.png", "sha": "abc123", "size": 4,
            "encoding": "base64", "content": "AAAA"
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/repos/octo/pics/contents/images/cat.png"))
        .and(body_partial_json(json!({
            "message": "Delete image: cat.png",
            "sha": "abc123",
            "branch": "main"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commit": { "sha": "c" } })))
        .expect(1)
        .mount(&server)
        .await;

    host(&server).delete("images/cat.png").await.unwrap();
}

#[tokio::test]
async fn test_delete_directory_sends_no_delete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/pics/contents/images/Pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = host(&server).delete("images/Pets").await.unwrap_err();
    assert!(matches!(err, HostError::NotAFile(_)));
}
