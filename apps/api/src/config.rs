use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Where rendered PDF/DOCX artifacts are kept.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactBackend {
    /// Files under `OUTPUT_DIR` on the local disk.
    Local,
    /// Objects in an S3-compatible bucket (MinIO locally, AWS in production).
    S3(S3Settings),
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub artifact_backend: ArtifactBackend,
    /// Upper bound on pipeline tasks running at the same time.
    pub max_concurrent_sessions: usize,
    /// Attempts per LLM call. 1 means a remote failure surfaces immediately.
    pub llm_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let artifact_backend = match optional_env("ARTIFACT_BACKEND", "local").as_str() {
            "local" => ArtifactBackend::Local,
            "s3" => ArtifactBackend::S3(S3Settings {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            other => bail!("ARTIFACT_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let max_concurrent_sessions = optional_env("MAX_CONCURRENT_SESSIONS", "4")
            .parse::<usize>()
            .context("MAX_CONCURRENT_SESSIONS must be a positive integer")?;
        if max_concurrent_sessions == 0 {
            bail!("MAX_CONCURRENT_SESSIONS must be at least 1");
        }

        let llm_max_attempts = optional_env("LLM_MAX_ATTEMPTS", "1")
            .parse::<u32>()
            .context("LLM_MAX_ATTEMPTS must be a positive integer")?
            .max(1);

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            upload_dir: PathBuf::from(optional_env("UPLOAD_DIR", "./data/uploads")),
            output_dir: PathBuf::from(optional_env("OUTPUT_DIR", "./data/output")),
            artifact_backend,
            max_concurrent_sessions,
            llm_max_attempts,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
