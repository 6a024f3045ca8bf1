#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sonora::config::{Config, SecurityConfig};
use sonora::services::{AudioExtractor, ExtractMode, ExtractedItem, Extraction, ExtractorError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// What the fake extractor produces on its next call.
#[derive(Debug, Clone)]
pub enum Script {
    /// (title, video id)
    Single(String, String),
    /// `None` entries are items the tool failed on.
    Playlist(Vec<Option<(String, String)>>),
    /// Playlist whose entries point at files that were never written.
    Unstaged(Vec<(String, String)>),
    Fail(String),
}

/// Writes small fake audio files into the staging directory instead of
/// running yt-dlp.
pub struct ScriptedExtractor {
    script: Mutex<Script>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::Fail("no script".to_string())),
        }
    }

    pub fn set(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }
}

fn stage(staging: &Path, title: &str, id: &str) -> ExtractedItem {
    let file = staging.join(format!("{id}.mp3"));
    std::fs::write(&file, format!("ID3 fake audio for {title}")).unwrap();
    ExtractedItem {
        title: title.to_string(),
        video_id: Some(id.to_string()),
        source_url: Some(format!("https://www.youtube.com/watch?v={id}")),
        file,
    }
}

#[async_trait::async_trait]
impl AudioExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _url: &str,
        staging: &Path,
        _mode: ExtractMode,
    ) -> Result<Extraction, ExtractorError> {
        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Single(title, id) => Ok(Extraction::Single(stage(staging, &title, &id))),
            Script::Playlist(entries) => Ok(Extraction::Playlist {
                title: Some("Mix".to_string()),
                entries: entries
                    .into_iter()
                    .map(|e| e.map(|(title, id)| stage(staging, &title, &id)))
                    .collect(),
            }),
            Script::Unstaged(entries) => Ok(Extraction::Playlist {
                title: Some("Mix".to_string()),
                entries: entries
                    .into_iter()
                    .map(|(title, id)| {
                        Some(ExtractedItem {
                            file: staging.join(format!("{id}.mp3")),
                            source_url: Some(format!("https://www.youtube.com/watch?v={id}")),
                            video_id: Some(id),
                            title,
                        })
                    })
                    .collect(),
            }),
            Script::Fail(message) => Err(ExtractorError::Tool(message)),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub library: PathBuf,
    pub extractor: Arc<ScriptedExtractor>,
}

pub fn test_config() -> Config {
    let root = std::env::temp_dir().join(format!("sonora-test-{}", uuid::Uuid::new_v4()));
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", root.join("sonora.db").display());
    config.library.library_path = root.join("library").display().to_string();
    config.server.secure_cookies = false;
    config.security = SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let library = PathBuf::from(&config.library.library_path);
    let extractor = Arc::new(ScriptedExtractor::new());

    let state =
        sonora::api::create_app_state_with_extractor(config, extractor.clone(), None)
            .await
            .expect("Failed to create app state");
    let router = sonora::api::router(state)
        .await
        .expect("Failed to build router");

    TestApp {
        router,
        library,
        extractor,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    /// `name=value` part of the session cookie, if one was set.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.split(';').next().map(str::to_string))
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.request_with_headers(method, uri, cookie, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
        headers: &[(header::HeaderName, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request("GET", uri, Some(cookie), None).await
    }

    pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> TestResponse {
        self.request("POST", uri, Some(cookie), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request("DELETE", uri, Some(cookie), None).await
    }

    /// Logs in and returns the session cookie.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.json());
        response.session_cookie().expect("login sets a session cookie")
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Registers a regular user and returns their id and session cookie.
    pub async fn register_user(&self, username: &str) -> (i64, String) {
        let email = format!("{username}@example.com");
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": "segredo123"
                })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "register failed: {:?}",
            response.json()
        );
        let id = response.json()["id"].as_i64().unwrap();
        (id, self.login(&email, "segredo123").await)
    }
}
