//! Server configuration
//!
//! Everything comes from environment variables, with development
//! defaults. `WORK_DIR` anchors the database and uploads directories.

use std::path::{Path, PathBuf};

use anyhow::Context;

const DEFAULT_WORK_DIR: &str = "./data";
const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub http_port: u16,
    /// Externally visible base URL, used to build image URLs
    pub public_url: String,
    pub jwt_secret: String,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let work_dir = PathBuf::from(
            std::env::var("WORK_DIR").unwrap_or_else(|_| DEFAULT_WORK_DIR.to_string()),
        );
        let http_port = match std::env::var("HTTP_PORT") {
            Ok(port) => port.parse().context("HTTP_PORT must be a port number")?,
            Err(_) => DEFAULT_HTTP_PORT,
        };
        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{http_port}"));
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => {
                if secret.len() < 32 {
                    anyhow::bail!("JWT_SECRET must be at least 32 characters long");
                }
                secret
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using a development key");
                "storefront-development-key-not-for-production".to_string()
            }
        };

        Ok(Self {
            work_dir,
            http_port,
            public_url: public_url.trim_end_matches('/').to_string(),
            jwt_secret,
            log_level: std::env::var("LOG_LEVEL").ok(),
            log_dir: std::env::var("LOG_DIR").ok(),
        })
    }

    pub fn database_dir(&self) -> PathBuf {
        self.work_dir.join("database")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.work_dir.join("uploads")
    }

    /// URL prefix the uploads directory is served under
    pub fn uploads_url(&self) -> String {
        format!("{}/uploads", self.public_url)
    }

    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [&self.database_dir(), &self.uploads_dir()] {
            ensure_dir(dir)?;
        }
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))
}
