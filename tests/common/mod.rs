use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use microfavola::config::GenerationConfig;
use microfavola::history::SledSnapshotStore;

/// Request path for the default model
#[allow(dead_code)]
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

/// Generation settings pointing at a mock server, with fast retries
#[allow(dead_code)]
pub fn generation_config(api_base: &str) -> GenerationConfig {
    GenerationConfig {
        api_base: api_base.to_string(),
        api_key: "test-key".to_string(),
        timeout_seconds: 5,
        retry_backoff_ms: 10,
        ..Default::default()
    }
}

/// A `generateContent` response envelope whose text is `text`
#[allow(dead_code)]
pub fn envelope(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
}

/// A `generateContent` response envelope carrying a valid story
#[allow(dead_code)]
pub fn story_envelope(title: &str, content: &str, twist: &str) -> serde_json::Value {
    let story = json!({ "title": title, "content": content, "twist": twist });
    envelope(&story.to_string())
}

/// Mount a successful story response on `server`
#[allow(dead_code)]
pub async fn mount_story(server: &MockServer, title: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(story_envelope(
            title,
            "Il corpo della storia.",
            "Il colpo di scena.",
        )))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn create_temp_store() -> (SledSnapshotStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store =
        SledSnapshotStore::open(tmp.path().join("history")).expect("failed to open sled store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
