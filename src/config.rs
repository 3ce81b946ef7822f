use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

pub const API_BASE_VAR: &str = "TMDB_BASE_URL";
pub const IMAGE_BASE_VAR: &str = "TMDB_IMAGE_BASE_URL";
pub const API_KEY_VAR: &str = "TMDB_API_KEY";

/// Where TMDB lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbConfig {
    pub api_base: String,
    pub image_base: String,
    /// `None` when unset or blank; requests then fail with a configuration error.
    pub api_key: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            api_key: None,
        }
    }
}

impl TmdbConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            api_base: non_empty(API_BASE_VAR)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            image_base: non_empty(IMAGE_BASE_VAR)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_IMAGE_BASE.to_string()),
            api_key: non_empty(API_KEY_VAR),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k: &String| !k.trim().is_empty());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
