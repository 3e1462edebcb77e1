//! Mock upstream helpers for integration tests
//!
//! One wiremock server stands in for every upstream API; each integration
//! lives under its own path prefix.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pium::shared::config::{
    CardSettings, InstagramSettings, NtsSettings, OpenAiSettings, ServerSettings,
    StorageSettings, TossSettings,
};
use pium::shared::AppConfig;

/// Bucket used by the mocked object store
pub const TEST_BUCKET: &str = "pium-test";

/// Instagram business account id used by the mocked Graph API
pub const TEST_IG_USER: &str = "1784";

/// Frontend origin used for payment redirects
pub const TEST_FRONT: &str = "http://front.test";

/// Card font shipped under `assets/fonts`
pub fn bundled_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/card.ttf")
}

/// Configuration with every upstream pointed at `uri`
pub fn test_config(uri: &str) -> AppConfig {
    AppConfig {
        server: ServerSettings {
            port: 0,
            database_url: None,
            base_url: "http://api.test".to_string(),
            front_base_url: TEST_FRONT.to_string(),
        },
        openai: OpenAiSettings {
            api_key: Some("sk-test".to_string()),
            base_url: format!("{uri}/v1"),
            rate_limit_wait_secs: 0,
            ..OpenAiSettings::default()
        },
        storage: StorageSettings {
            endpoint: uri.to_string(),
            bucket: TEST_BUCKET.to_string(),
            access_key: Some("AK".to_string()),
            secret_key: Some("SK".to_string()),
            ..StorageSettings::default()
        },
        instagram: InstagramSettings {
            graph_base: format!("{uri}/graph"),
            user_id: Some(TEST_IG_USER.to_string()),
            access_token: Some("EAAG".to_string()),
        },
        toss: TossSettings {
            api_base: format!("{uri}/toss"),
            secret_key: Some("test_sk_abc".to_string()),
        },
        nts: NtsSettings {
            api_base: format!("{uri}/nts"),
            api_key: None,
            validate: false,
        },
        card: CardSettings {
            font_path: bundled_font_path(),
            ..CardSettings::default()
        },
        admin: None,
    }
}

/// Answer chat completions with `text` as the single choice
pub async fn mount_completion(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        })))
        .mount(server)
        .await;
}

/// Accept every object upload into the test bucket
pub async fn mount_object_store(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path_regex(format!("^/{TEST_BUCKET}/.+")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Three captions separated the way the model is asked to
pub fn three_captions() -> String {
    [
        "성수동 아침 커피 ☕ 오늘도 문 열었어요\n#성수동 #카페",
        "주말엔 브런치 세트 10% 할인!\n#성수동맛집 #브런치",
        "따뜻한 라떼 한 잔의 여유\n#라떼 #성수동",
    ]
    .join("\n<<<VARIANT_END>>>\n")
}

/// Serve `body` for a GET of `key` in the test bucket
pub async fn mount_object(server: &MockServer, key: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/{TEST_BUCKET}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// A solid-colour PNG
pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbImage::from_pixel(width, height, Rgb(color))
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
