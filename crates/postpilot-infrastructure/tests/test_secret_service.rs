use std::collections::HashMap;

use postpilot_core::secret::SecretService;
use postpilot_infrastructure::{PostPilotPaths, SecretServiceImpl};
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

const SECRET_JSON: &str = r#"{
  "gemini": { "api_key": "file-gemini" },
  "news": { "api_key": "file-news" },
  "image_worker": { "endpoint": "https://images.test/gen", "api_key": "file-worker" },
  "linkedin": {
    "proxy_url": "https://proxy.test",
    "access_token": "file-token",
    "author_urn": "urn:li:person:file"
  }
}"#;

#[tokio::test]
async fn test_loads_secret_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret.json");
    std::fs::write(&path, SECRET_JSON).unwrap();

    let service = SecretServiceImpl::with_env(&path, env_from(&[]));
    assert!(service.secret_file_exists().await);

    let secrets = service.load_secrets().await.expect("Should load secrets");
    assert_eq!(secrets.require_gemini().unwrap().api_key, "file-gemini");
    assert_eq!(secrets.require_news().unwrap().api_key, "file-news");
    assert_eq!(
        secrets.require_image_worker().unwrap().endpoint,
        "https://images.test/gen"
    );
    assert_eq!(
        secrets.require_linkedin().unwrap().author_urn,
        "urn:li:person:file"
    );
}

#[tokio::test]
async fn test_environment_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret.json");
    std::fs::write(&path, SECRET_JSON).unwrap();

    let service = SecretServiceImpl::with_env(
        &path,
        env_from(&[
            ("POSTPILOT_GEMINI_API_KEY", "env-gemini"),
            ("POSTPILOT_LINKEDIN_ACCESS_TOKEN", "env-token"),
            ("POSTPILOT_NEWS_API_KEY", "   "),
        ]),
    );
    let secrets = service.load_secrets().await.unwrap();

    assert_eq!(secrets.require_gemini().unwrap().api_key, "env-gemini");
    // blank variables do not override
    assert_eq!(secrets.require_news().unwrap().api_key, "file-news");
    let linkedin = secrets.require_linkedin().unwrap();
    assert_eq!(linkedin.access_token, "env-token");
    assert_eq!(linkedin.proxy_url, "https://proxy.test");
}

#[tokio::test]
async fn test_environment_only_without_file() {
    let temp_dir = TempDir::new().unwrap();
    let service = SecretServiceImpl::with_env(
        temp_dir.path().join("secret.json"),
        env_from(&[
            ("POSTPILOT_IMAGE_WORKER_URL", "https://images.test/gen"),
            ("POSTPILOT_IMAGE_WORKER_KEY", "env-worker"),
            ("POSTPILOT_LINKEDIN_PROXY_URL", "https://proxy.test"),
        ]),
    );

    assert!(!service.secret_file_exists().await);
    let secrets = service.load_secrets().await.unwrap();
    assert_eq!(secrets.require_image_worker().unwrap().api_key, "env-worker");
    // linkedin is incomplete without token and author
    let err = secrets.require_linkedin().unwrap_err();
    assert!(err.to_string().contains("linkedin.access_token"));
    assert!(secrets.gemini.is_none());
}

#[tokio::test]
async fn test_template_counts_as_unconfigured() {
    let temp_dir = TempDir::new().unwrap();
    let paths = PostPilotPaths::with_base(temp_dir.path());
    paths.ensure_secret_file().unwrap();

    let service = SecretServiceImpl::with_env(paths.secret_file(), env_from(&[]));
    let secrets = service.load_secrets().await.unwrap();
    assert!(secrets.require_gemini().is_err());
    assert!(secrets.require_linkedin().is_err());
}

#[tokio::test]
async fn test_secrets_are_cached() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret.json");
    std::fs::write(&path, SECRET_JSON).unwrap();

    let service = SecretServiceImpl::with_env(&path, env_from(&[]));
    service.load_secrets().await.unwrap();
    std::fs::remove_file(&path).unwrap();

    let secrets = service.load_secrets().await.unwrap();
    assert_eq!(secrets.require_gemini().unwrap().api_key, "file-gemini");
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret.json");
    std::fs::write(&path, "{ not json").unwrap();

    let service = SecretServiceImpl::with_env(&path, env_from(&[]));
    assert!(service.load_secrets().await.is_err());
}

#[tokio::test]
async fn test_partial_section_completed_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret.json");
    std::fs::write(
        &path,
        r#"{"gemini":{"api_key":"g"},"linkedin":{"proxy_url":"https://p.test","author_urn":"urn:li:person:me"},"image_worker":null}"#,
    )
    .unwrap();

    let service = SecretServiceImpl::with_env(
        &path,
        env_from(&[("POSTPILOT_LINKEDIN_ACCESS_TOKEN", "env-token")]),
    );
    let secrets = service.load_secrets().await.expect("partial sections should load");

    let linkedin = secrets.require_linkedin().unwrap();
    assert_eq!(linkedin.proxy_url, "https://p.test");
    assert_eq!(linkedin.access_token, "env-token");
    assert_eq!(linkedin.author_urn, "urn:li:person:me");
    assert!(secrets.require_image_worker().is_err());
}

#[tokio::test]
async fn test_partial_section_without_environment_is_unconfigured() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret.json");
    std::fs::write(&path, r#"{"image_worker":{"endpoint":"https://images.test/gen"}}"#).unwrap();

    let service = SecretServiceImpl::with_env(&path, env_from(&[]));
    let secrets = service.load_secrets().await.unwrap();
    assert!(secrets.image_worker.is_none());
}
