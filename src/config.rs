//! Service settings read from the environment.
//!
//! `.env` is loaded by `main` before [`Settings::from_env`] runs.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SITE_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_PUBLIC_FILES_PATH: &str = "sites/default/files";
const DEFAULT_CONTENT_DIR: &str = "content";

/// Where entities are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBackend {
    /// JSON fixture files loaded into memory at startup.
    Fixtures { dir: PathBuf },
    /// Remote content API.
    Rest { base_url: String, token: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub site_base_url: String,
    pub public_files_path: String,
    pub backend: ContentBackend,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let var = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_addr))?;

        let backend = match var("CONTENT_API_URL") {
            Some(base_url) => ContentBackend::Rest {
                base_url,
                token: var("CONTENT_API_TOKEN"),
            },
            None => ContentBackend::Fixtures {
                dir: var("CONTENT_DIR")
                    .unwrap_or_else(|| DEFAULT_CONTENT_DIR.to_string())
                    .into(),
            },
        };

        Ok(Self {
            bind_addr,
            site_base_url: var("SITE_BASE_URL").unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string()),
            public_files_path: var("PUBLIC_FILES_PATH")
                .unwrap_or_else(|| DEFAULT_PUBLIC_FILES_PATH.to_string()),
            backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(HashMap::new()).unwrap();
        assert_eq!(settings.bind_addr.port(), 3000);
        assert_eq!(settings.site_base_url, "http://localhost:3000");
        assert_eq!(settings.public_files_path, "sites/default/files");
        assert_eq!(
            settings.backend,
            ContentBackend::Fixtures { dir: PathBuf::from("content") }
        );
    }

    #[test]
    fn test_rest_backend_selected_by_api_url() {
        let settings = Settings::from_vars(vars(&[
            ("CONTENT_API_URL", "http://content.local/api"),
            ("CONTENT_API_TOKEN", "secret"),
            ("CONTENT_DIR", "ignored"),
        ]))
        .unwrap();

        assert_eq!(
            settings.backend,
            ContentBackend::Rest {
                base_url: "http://content.local/api".to_string(),
                token: Some("secret".to_string()),
            }
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let settings = Settings::from_vars(vars(&[("SITE_BASE_URL", "  ")])).unwrap();
        assert_eq!(settings.site_base_url, "http://localhost:3000");
    }

    #[test]
    fn test_invalid_bind_addr() {
        assert!(Settings::from_vars(vars(&[("BIND_ADDR", "localhost")])).is_err());
    }
}
