//! Absolute URL generation for stored files.
//!
//! Storage URIs use stream-wrapper schemes (`public://`, `private://`).
//! Remote `http(s)` URIs are already absolute and pass through untouched.

use reqwest::Url;
use thiserror::Error;

const DEFAULT_PUBLIC_PATH: &str = "sites/default/files";
const PRIVATE_PATH: &str = "system/files";

#[derive(Debug, Error)]
pub enum FileUrlError {
    #[error("unknown stream wrapper scheme '{scheme}' in {uri}")]
    UnknownScheme { scheme: String, uri: String },
    #[error("file URI has an empty path or dot segments: '{0}'")]
    InvalidPath(String),
    #[error("invalid site base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Turns a file's storage URI into a publicly resolvable URL.
pub trait FileUrlGenerator: Send + Sync {
    fn generate_absolute_string(&self, uri: &str) -> Result<String, FileUrlError>;
}

/// Maps stream-wrapper URIs onto the site's public and private file paths.
#[derive(Debug, Clone)]
pub struct StreamWrapperUrlGenerator {
    base_url: Url,
    public_path: String,
}

impl StreamWrapperUrlGenerator {
    pub fn new(base_url: &str) -> Result<Self, FileUrlError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| FileUrlError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            base_url,
            public_path: DEFAULT_PUBLIC_PATH.to_string(),
        })
    }

    /// Override the public files directory (relative to the site root).
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_path = path.into().trim_matches('/').to_string();
        self
    }

    fn site_url(&self, prefix: &str, uri: &str, target: &str) -> Result<String, FileUrlError> {
        let parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
        // Url drops dot segments on push, which would silently rewrite the path
        if parts.is_empty() || parts.iter().any(|s| *s == "." || *s == "..") {
            return Err(FileUrlError::InvalidPath(uri.to_string()));
        }

        let mut url = self.base_url.clone();
        // new() rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(prefix.split('/').filter(|s| !s.is_empty()))
                .extend(parts);
        }
        Ok(url.to_string())
    }
}

impl FileUrlGenerator for StreamWrapperUrlGenerator {
    fn generate_absolute_string(&self, uri: &str) -> Result<String, FileUrlError> {
        let Some((scheme, target)) = uri.split_once("://") else {
            return self.site_url("", uri, uri);
        };

        match scheme.to_ascii_lowercase().as_str() {
            "public" => self.site_url(&self.public_path, uri, target),
            "private" => self.site_url(PRIVATE_PATH, uri, target),
            "http" | "https" => Ok(uri.to_string()),
            _ => Err(FileUrlError::UnknownScheme {
                scheme: scheme.to_string(),
                uri: uri.to_string(),
            }),
        }
    }
}
