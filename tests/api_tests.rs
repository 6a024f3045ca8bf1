mod common;

use axum::http::{StatusCode, header};
use common::{Script, spawn_app, spawn_app_with, test_config};
use serde_json::json;

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = spawn_app().await;

    let response = app.request("GET", "/api/history", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json(),
        json!({"error": "Faça login para acessar esta página"})
    );
}

#[tokio::test]
async fn every_response_disables_caching() {
    let app = spawn_app().await;

    for response in [
        app.request("GET", "/api/health", None, None).await,
        app.request("GET", "/api/favorites", None, None).await,
        app.request("GET", "/api/does-not-exist", None, None).await,
    ] {
        assert_eq!(
            response.headers[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(response.headers[header::PRAGMA], "no-cache");
        assert_eq!(response.headers[header::EXPIRES], "0");
    }
}

#[tokio::test]
async fn register_login_logout_cycle() {
    let app = spawn_app().await;
    let (id, cookie) = app.register_user("ana").await;

    let me = app.get("/api/auth/me", &cookie).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["id"], json!(id));
    assert_eq!(me.json()["username"], "ana");
    assert_eq!(me.json()["is_admin"], false);

    let logout = app.post("/api/auth/logout", &cookie, json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);

    let me = app.get("/api/auth/me", &cookie).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_rejects_duplicates_and_short_passwords() {
    let app = spawn_app().await;
    app.register_user("ana").await;

    let duplicate = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": "ana", "email": "other@example.com", "password": "segredo123"})),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json()["error"], "Este nome de usuário já está em uso.");

    let taken_email = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": "bia", "email": "ANA@example.com", "password": "segredo123"})),
        )
        .await;
    assert_eq!(taken_email.json()["error"], "Este email já está cadastrado.");

    let short = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": "bia", "email": "bia@example.com", "password": "12345"})),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.json()["error"], "Senha deve ter no mínimo 6 caracteres");
}

#[tokio::test]
async fn login_failure_is_generic() {
    let app = spawn_app().await;
    app.register_user("ana").await;

    for (email, password) in [
        ("ana@example.com", "wrong-password"),
        ("nobody@example.com", "segredo123"),
    ] {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json()["error"], "Email ou senha inválidos");
    }
}

#[tokio::test]
async fn change_password_requires_current_one() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let wrong = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(&cookie),
            Some(json!({"current_password": "nope-nope", "new_password": "novasenha1"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.json()["error"], "Senha atual incorreta");

    let ok = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(&cookie),
            Some(json!({"current_password": "segredo123", "new_password": "novasenha1"})),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    app.login("ana@example.com", "novasenha1").await;
}

#[tokio::test]
async fn history_round_trip() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let missing = app.post("/api/history", &cookie, json!({"title": "Song"})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json(), json!({"error": "URL do YouTube é obrigatória"}));

    for i in 0..3 {
        let added = app
            .post(
                "/api/history",
                &cookie,
                json!({"title": format!("Track {i}"), "youtube_url": format!("https://youtu.be/{i}")}),
            )
            .await;
        assert_eq!(added.json()["message"], "Adicionado ao histórico");
    }

    let listed = app.get("/api/history?limit=2", &cookie).await.json();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["title"], "Track 2");

    let bad_limit = app.get("/api/history?limit=0", &cookie).await;
    assert_eq!(bad_limit.status, StatusCode::BAD_REQUEST);

    let cleared = app.delete("/api/history", &cookie).await;
    assert_eq!(cleared.json(), json!({"success": true, "message": "Histórico limpo"}));
    assert_eq!(app.get("/api/history", &cookie).await.json(), json!([]));
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let response = app
        .post("/api/favorites", &cookie, json!(["not", "an", "object"]))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({"error": "Dados inválidos"}));
    assert_eq!(app.get("/api/favorites", &cookie).await.json(), json!([]));

    let scalar = app
        .post("/api/history", &cookie, json!("https://youtu.be/abc"))
        .await;
    assert_eq!(scalar.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/api/history", &cookie).await.json(), json!([]));
}

#[tokio::test]
async fn favorite_twice_reports_already_favorited() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    let body = json!({"title": "Song A", "youtube_url": "https://youtu.be/abc"});

    let first = app.post("/api/favorites", &cookie, body.clone()).await;
    assert_eq!(
        first.json(),
        json!({"success": true, "message": "Adicionado aos favoritos"})
    );

    let second = app.post("/api/favorites", &cookie, body).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(
        second.json(),
        json!({"success": false, "message": "Já está nos favoritos"})
    );

    let favorites = app.get("/api/favorites", &cookie).await.json();
    assert_eq!(favorites.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn favorites_are_scoped_to_their_owner() {
    let app = spawn_app().await;
    let (_, ana) = app.register_user("ana").await;
    let (_, bia) = app.register_user("bia").await;

    app.post(
        "/api/favorites",
        &ana,
        json!({"title": "Song A", "youtube_url": "https://youtu.be/abc"}),
    )
    .await;
    let id = app.get("/api/favorites", &ana).await.json()[0]["id"]
        .as_i64()
        .unwrap();

    assert_eq!(app.get("/api/favorites", &bia).await.json(), json!([]));

    let foreign = app.delete(&format!("/api/favorites/{id}"), &bia).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.json(), json!({"error": "Favorito não encontrado"}));

    let own = app.delete(&format!("/api/favorites/{id}"), &ana).await;
    assert_eq!(own.json()["message"], "Removido dos favoritos");
}

#[tokio::test]
async fn playlists_create_and_delete() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let missing = app
        .post("/api/playlists", &cookie, json!({"youtube_url": "https://youtu.be/x"}))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json(), json!({"error": "Nome e URL são obrigatórios"}));

    let created = app
        .post(
            "/api/playlists",
            &cookie,
            json!({"name": "Mix", "youtube_url": "https://www.youtube.com/playlist?list=PL1", "playlist_id": "PL1"}),
        )
        .await
        .json();
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Playlist criada");
    let id = created["id"].as_i64().unwrap();

    let listed = app.get("/api/playlists", &cookie).await.json();
    assert_eq!(listed[0]["name"], "Mix");
    assert_eq!(listed[0]["playlist_id"], "PL1");

    let deleted = app.delete(&format!("/api/playlists/{id}"), &cookie).await;
    assert_eq!(deleted.json()["message"], "Playlist removida");
}

#[tokio::test]
async fn deleting_unknown_playlist_is_not_found() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let response = app.delete("/api/playlists/999", &cookie).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({"error": "Playlist não encontrada"}));
}

#[tokio::test]
async fn single_user_mode_acts_as_bootstrap_admin() {
    let mut config = test_config();
    config.auth.single_user = true;
    let app = spawn_app_with(config).await;

    let me = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["email"], "admin@admin.com");
    assert_eq!(me.json()["is_admin"], true);

    let added = app
        .request(
            "POST",
            "/api/favorites",
            None,
            Some(json!({"title": "Song A", "youtube_url": "https://youtu.be/abc"})),
        )
        .await;
    assert_eq!(added.json()["success"], true);
}

#[tokio::test]
async fn registration_can_be_disabled() {
    let mut config = test_config();
    config.auth.registration_enabled = false;
    let app = spawn_app_with(config).await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": "ana", "email": "ana@example.com", "password": "segredo123"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn download_audio_streams_attachment_and_records_it() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    app.extractor
        .set(Script::Single("Song: A!".to_string(), "abc".to_string()));

    let response = app
        .post(
            "/api/download-audio",
            &cookie,
            json!({"youtube_url": "https://youtu.be/abc"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let disposition = response.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Song A.mp3\""));
    assert_eq!(response.bytes, b"ID3 fake audio for Song: A!");
    assert!(app.library.join("Song A.mp3").is_file());

    let library = app.get("/api/library", &cookie).await.json();
    assert_eq!(library.as_array().unwrap().len(), 1);
    assert_eq!(library[0]["title"], "Song: A!");
    assert_eq!(library[0]["filename"], "Song A.mp3");

    // Staging is cleaned up.
    let staging = std::fs::read_dir(app.library.join(".staging")).unwrap().count();
    assert_eq!(staging, 0);
}

#[tokio::test]
async fn download_rejects_non_youtube_urls() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;

    let response = app
        .post("/api/download-audio", &cookie, json!({"youtube_url": "https://vimeo.com/1"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let missing = app.post("/api/download-playlist", &cookie, json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["error"], "URL do YouTube é obrigatória");
}

#[tokio::test]
async fn extraction_failure_surfaces_tool_message() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    app.extractor
        .set(Script::Fail("[youtube] abc: Video unavailable".to_string()));

    let response = app
        .post(
            "/api/download-audio",
            &cookie,
            json!({"youtube_url": "https://youtu.be/abc"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json()["error"],
        "Erro ao baixar áudio: [youtube] abc: Video unavailable"
    );
    assert_eq!(app.get("/api/library", &cookie).await.json(), json!([]));
}

#[tokio::test]
async fn playlist_skips_failed_entries_and_known_files() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    let url = json!({"youtube_url": "https://www.youtube.com/playlist?list=PL1"});

    app.extractor.set(Script::Playlist(vec![
        Some(("Track One".to_string(), "a1".to_string())),
        None,
        Some(("Track Two".to_string(), "b2".to_string())),
    ]));

    let first = app.post("/api/download-playlist", &cookie, url.clone()).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(
        first.json(),
        json!({"success": true, "message": "2 músicas baixadas com sucesso", "total": 2})
    );
    assert_eq!(app.get("/api/library", &cookie).await.json().as_array().unwrap().len(), 2);

    let again = app.post("/api/download-playlist", &cookie, url).await;
    assert_eq!(again.json()["total"], 0);
    assert_eq!(app.get("/api/library", &cookie).await.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn playlist_with_no_usable_entries_fails() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    app.extractor.set(Script::Playlist(vec![None, None]));

    let response = app
        .post(
            "/api/download-playlist",
            &cookie,
            json!({"youtube_url": "https://www.youtube.com/playlist?list=PL1"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn playlist_where_no_item_can_be_placed_fails() {
    let app = spawn_app().await;
    let (_, cookie) = app.register_user("ana").await;
    app.extractor.set(Script::Unstaged(vec![
        ("Track One".to_string(), "a1".to_string()),
        ("Track Two".to_string(), "b2".to_string()),
    ]));

    let response = app
        .post(
            "/api/download-playlist",
            &cookie,
            json!({"youtube_url": "https://www.youtube.com/playlist?list=PL1"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({"error": "Nenhuma música pôde ser baixada"})
    );
    assert_eq!(app.get("/api/library", &cookie).await.json(), json!([]));
}

#[tokio::test]
async fn malformed_path_and_query_use_error_shape() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    for (method, uri) in [
        ("DELETE", "/api/favorites/abc"),
        ("DELETE", "/api/playlists/abc"),
        ("DELETE", "/api/admin/users/abc"),
        ("POST", "/api/admin/users/abc/toggle-admin"),
    ] {
        let response = app.request(method, uri, Some(&admin), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.json(), json!({"error": "ID inválido"}), "{uri}");
    }

    let zero = app.delete("/api/favorites/0", &admin).await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    assert!(zero.json()["error"].as_str().unwrap().starts_with("ID inválido"));

    let limit = app.get("/api/history?limit=abc", &admin).await;
    assert_eq!(limit.status, StatusCode::BAD_REQUEST);
    assert_eq!(limit.json(), json!({"error": "Limite inválido"}));
}
