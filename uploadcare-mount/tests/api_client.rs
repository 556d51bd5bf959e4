use uploadcare_mount::api_client::{UploadcareClient, API_ACCEPT};
use uploadcare_mount::load_config::{ApiSection, Credentials};
use uploadcare_mount_core::contract::FileApi;

const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn client(base_url: String) -> UploadcareClient {
    let api = ApiSection {
        base_url,
        timeout_secs: 5,
    };
    let credentials = Credentials {
        public_key: "pub".to_string(),
        secret_key: "sec".to_string(),
    };
    UploadcareClient::new(&api, &credentials).expect("client builds")
}

#[test]
fn storage_url_ignores_trailing_slash() {
    let client = client("https://api.uploadcare.com/".to_string());
    assert_eq!(
        client.storage_url(ID),
        format!("https://api.uploadcare.com/files/{ID}/storage/")
    );
}

#[tokio::test]
async fn store_file_puts_storage_with_auth_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", format!("/files/{ID}/storage/").as_str())
        .match_header("accept", API_ACCEPT)
        .match_header("authorization", "Uploadcare.Simple pub:sec")
        .with_status(200)
        .with_body(format!(r#"{{"uuid":"{ID}","datetime_stored":"2024-01-01T00:00:00Z"}}"#))
        .create_async()
        .await;

    client(server.url())
        .store_file(ID)
        .await
        .expect("store should succeed");
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_file_deletes_storage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", format!("/files/{ID}/storage/").as_str())
        .match_header("authorization", "Uploadcare.Simple pub:sec")
        .with_status(200)
        .create_async()
        .await;

    client(server.url())
        .delete_file(ID)
        .await
        .expect("delete should succeed");
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_request_reports_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("PUT", format!("/files/{ID}/storage/").as_str())
        .with_status(403)
        .with_body(r#"{"detail":"Simple authentication over HTTP is forbidden."}"#)
        .create_async()
        .await;

    let err = client(server.url()).store_file(ID).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("403"), "got: {msg}");
    assert!(msg.contains("forbidden"), "got: {msg}");
}
