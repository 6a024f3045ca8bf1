mod common;

use axum::http::{StatusCode, header};
use common::{Script, TestApp, spawn_app};
use serde_json::json;

async fn download(app: &TestApp, cookie: &str, title: &str, id: &str) {
    app.extractor
        .set(Script::Single(title.to_string(), id.to_string()));
    let response = app
        .post(
            "/api/download-audio",
            cookie,
            json!({"youtube_url": format!("https://youtu.be/{id}")}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.json());
}

#[tokio::test]
async fn stream_serves_owned_file_with_ranges() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    download(&app, &cookie, "Song A", "abc").await;

    let full = app.get("/api/library/stream/Song%20A.mp3", &cookie).await;
    assert_eq!(full.status, StatusCode::OK);
    assert_eq!(full.bytes, b"ID3 fake audio for Song A");

    let partial = app
        .request_with_headers(
            "GET",
            "/api/library/stream/Song%20A.mp3",
            Some(&cookie),
            None,
            &[(header::RANGE, "bytes=0-2")],
        )
        .await;
    assert_eq!(partial.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(partial.bytes, b"ID3");
}

#[tokio::test]
async fn stream_rejects_bad_names() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let wrong_ext = app.get("/api/library/stream/notes.txt", &cookie).await;
    assert_eq!(wrong_ext.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong_ext.json(),
        json!({"error": "Apenas arquivos MP3 são permitidos"})
    );

    let traversal = app
        .get("/api/library/stream/..%2F..%2Fetc%2Fpasswd.mp3", &cookie)
        .await;
    assert_eq!(traversal.status, StatusCode::BAD_REQUEST);
    assert_eq!(traversal.json(), json!({"error": "Nome de arquivo inválido"}));
}

#[tokio::test]
async fn stream_hides_other_users_files() {
    let app = spawn_app().await;
    let (_, ana) = app.register_user("ana").await;
    let (_, bia) = app.register_user("bia").await;
    download(&app, &ana, "Song A", "abc").await;

    let response = app.get("/api/library/stream/Song%20A.mp3", &bia).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({"error": "Arquivo não encontrado"}));
}

#[tokio::test]
async fn listing_skips_rows_whose_file_is_gone() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    download(&app, &cookie, "Song A", "abc").await;
    download(&app, &cookie, "Song B", "def").await;

    std::fs::remove_file(app.library.join("Song A.mp3")).unwrap();

    let listed = app.get("/api/library", &cookie).await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["filename"], "Song B.mp3");

    let stream = app.get("/api/library/stream/Song%20A.mp3", &cookie).await;
    assert_eq!(stream.status, StatusCode::NOT_FOUND);

    // The dangling row can still be removed.
    let deleted = app.delete("/api/library/Song%20A.mp3", &cookie).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["message"], "Arquivo removido da biblioteca");
}

#[tokio::test]
async fn delete_removes_row_and_file() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    download(&app, &cookie, "Song A", "abc").await;

    let deleted = app.delete("/api/library/Song%20A.mp3", &cookie).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!app.library.join("Song A.mp3").exists());
    assert_eq!(app.get("/api/library", &cookie).await.json(), json!([]));

    let again = app.delete("/api/library/Song%20A.mp3", &cookie).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.json(), json!({"error": "Arquivo não encontrado"}));
}

#[tokio::test]
async fn delete_cleans_up_orphaned_files() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    std::fs::create_dir_all(&app.library).unwrap();
    std::fs::write(app.library.join("Stray.mp3"), b"orphan").unwrap();

    assert_eq!(app.get("/api/library", &cookie).await.json(), json!([]));

    let deleted = app.delete("/api/library/Stray.mp3", &cookie).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!app.library.join("Stray.mp3").exists());
}

#[tokio::test]
async fn delete_keeps_files_other_users_still_reference() {
    let app = spawn_app().await;
    let (_, ana) = app.register_user("ana").await;
    let (_, bia) = app.register_user("bia").await;
    download(&app, &ana, "Song A", "abc").await;
    download(&app, &bia, "Song A", "abc").await;

    let deleted = app.delete("/api/library/Song%20A.mp3", &ana).await;
    assert_eq!(deleted.status, StatusCode::OK);

    assert!(app.library.join("Song A.mp3").is_file());
    assert_eq!(app.get("/api/library", &ana).await.json(), json!([]));
    assert_eq!(
        app.get("/api/library", &bia).await.json().as_array().unwrap().len(),
        1
    );
}
