use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::{TmdbConfig, API_KEY_VAR};
use crate::error::{TmdbError, TmdbResult};
use crate::models::{CreditsResponse, ErrorEnvelope, MovieDetails, MoviesResponse, VideosResponse};

/// The four curated TMDB movie listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieCategory {
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 4] = [
        MovieCategory::Popular,
        MovieCategory::TopRated,
        MovieCategory::Upcoming,
        MovieCategory::NowPlaying,
    ];

    /// Path segment used by `/movie/{category}`.
    pub fn as_path(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "popular",
            MovieCategory::TopRated => "top_rated",
            MovieCategory::Upcoming => "upcoming",
            MovieCategory::NowPlaying => "now_playing",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "popular",
            MovieCategory::TopRated => "top-rated",
            MovieCategory::Upcoming => "upcoming",
            MovieCategory::NowPlaying => "now-playing",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "Popular Movies",
            MovieCategory::TopRated => "Top Rated Movies",
            MovieCategory::Upcoming => "Upcoming Movies",
            MovieCategory::NowPlaying => "Now Playing",
        }
    }

    pub fn section_title(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "Popular Movies",
            MovieCategory::TopRated => "Top Rated",
            MovieCategory::Upcoming => "Upcoming",
            MovieCategory::NowPlaying => "Now Playing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MovieCategory::Popular => {
                "Discover the most popular movies right now based on user engagement and ratings."
            }
            MovieCategory::TopRated => {
                "Explore the highest-rated movies of all time, as voted by movie enthusiasts worldwide."
            }
            MovieCategory::Upcoming => "Get a head start on the movies arriving in theaters soon.",
            MovieCategory::NowPlaying => {
                "Check out the movies currently playing in theaters worldwide."
            }
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for MovieCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        MovieCategory::ALL
            .into_iter()
            .find(|c| c.slug() == normalized || c.as_path() == normalized)
            .ok_or_else(|| format!("unknown movie category '{}'", s.trim()))
    }
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn movies_by_category(&self, category: MovieCategory, page: u32)
        -> TmdbResult<MoviesResponse>;
    async fn movie_details(&self, id: u32) -> TmdbResult<MovieDetails>;
    async fn movie_videos(&self, id: u32) -> TmdbResult<VideosResponse>;
    async fn movie_credits(&self, id: u32) -> TmdbResult<CreditsResponse>;
    async fn search_movies(&self, query: &str, page: u32) -> TmdbResult<MoviesResponse>;
    async fn movie_recommendations(&self, id: u32, page: u32) -> TmdbResult<MoviesResponse>;
    async fn similar_movies(&self, id: u32, page: u32) -> TmdbResult<MoviesResponse>;

    async fn popular_movies(&self, page: u32) -> TmdbResult<MoviesResponse> {
        self.movies_by_category(MovieCategory::Popular, page).await
    }

    async fn top_rated_movies(&self, page: u32) -> TmdbResult<MoviesResponse> {
        self.movies_by_category(MovieCategory::TopRated, page).await
    }

    async fn upcoming_movies(&self, page: u32) -> TmdbResult<MoviesResponse> {
        self.movies_by_category(MovieCategory::Upcoming, page).await
    }

    async fn now_playing_movies(&self, page: u32) -> TmdbResult<MoviesResponse> {
        self.movies_by_category(MovieCategory::NowPlaying, page).await
    }
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
    missing_key_warned: OnceCell<()>,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> TmdbResult<Self> {
        let user_agent = format!("cinescope/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TmdbError::Transport(format!("failed to build HTTP client: {e}")))?;
        let tmdb = Self {
            client,
            config,
            missing_key_warned: OnceCell::new(),
        };
        // Missing key is reported at startup but stays non-fatal.
        let _ = tmdb.credential();
        Ok(tmdb)
    }

    pub fn from_env() -> TmdbResult<Self> {
        Self::new(TmdbConfig::from_env())
    }

    fn credential(&self) -> TmdbResult<&str> {
        match self.config.api_key.as_deref() {
            Some(key) => Ok(key),
            None => {
                self.missing_key_warned.get_or_init(|| {
                    warn!(
                        "TMDB API key is not configured. Please add {} to your environment variables.",
                        API_KEY_VAR
                    );
                });
                Err(TmdbError::MissingCredential)
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> TmdbResult<T> {
        let api_key = self.credential()?;
        let url = build_url(&self.config.api_base, api_key, path, params);
        debug!(path = %path, "TMDB request");

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TmdbError::Transport(e.without_url().to_string()))?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| TmdbError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .ok()
                .and_then(|e| e.status_message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(path = %path, status = status.as_u16(), "TMDB request failed: {}", message);
            return Err(TmdbError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %path, "TMDB response did not match the expected shape: {}", e);
            TmdbError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn movies_by_category(
        &self,
        category: MovieCategory,
        page: u32,
    ) -> TmdbResult<MoviesResponse> {
        let path = format!("/movie/{}", category.as_path());
        self.get_json(&path, &[("page", page.to_string())]).await
    }

    async fn movie_details(&self, id: u32) -> TmdbResult<MovieDetails> {
        self.get_json(&format!("/movie/{id}"), &[]).await
    }

    async fn movie_videos(&self, id: u32) -> TmdbResult<VideosResponse> {
        self.get_json(&format!("/movie/{id}/videos"), &[]).await
    }

    async fn movie_credits(&self, id: u32) -> TmdbResult<CreditsResponse> {
        self.get_json(&format!("/movie/{id}/credits"), &[]).await
    }

    async fn search_movies(&self, query: &str, page: u32) -> TmdbResult<MoviesResponse> {
        self.get_json(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn movie_recommendations(&self, id: u32, page: u32) -> TmdbResult<MoviesResponse> {
        self.get_json(
            &format!("/movie/{id}/recommendations"),
            &[("page", page.to_string())],
        )
        .await
    }

    async fn similar_movies(&self, id: u32, page: u32) -> TmdbResult<MoviesResponse> {
        self.get_json(&format!("/movie/{id}/similar"), &[("page", page.to_string())])
            .await
    }
}

pub fn build_url(base: &str, api_key: &str, path: &str, params: &[(&str, String)]) -> String {
    let mut url = format!(
        "{}{}?api_key={}",
        base.trim_end_matches('/'),
        path,
        urlencoding::encode(api_key)
    );
    for (key, value) in params {
        url.push('&');
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_url_carries_segment_and_exact_page() {
        for category in MovieCategory::ALL {
            for page in [1u32, 2, 17, 500] {
                let url = build_url(
                    "https://api.themoviedb.org/3",
                    "k",
                    &format!("/movie/{}", category.as_path()),
                    &[("page", page.to_string())],
                );
                assert!(url.contains(&format!("/movie/{}?", category.as_path())));
                assert!(url.ends_with(&format!("&page={page}")), "{url}");
            }
        }
    }

    #[test]
    fn search_query_is_percent_encoded() {
        let url = build_url(
            "https://api.themoviedb.org/3/",
            "secret key",
            "/search/movie",
            &[("query", "Amélie & co".to_string()), ("page", "1".to_string())],
        );
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/search/movie?api_key=secret%20key&query=Am%C3%A9lie%20%26%20co&page=1"
        );
    }

    #[test]
    fn category_parses_from_slug_or_path() {
        assert_eq!("top-rated".parse::<MovieCategory>(), Ok(MovieCategory::TopRated));
        assert_eq!("now_playing".parse::<MovieCategory>(), Ok(MovieCategory::NowPlaying));
        assert_eq!(" Popular ".parse::<MovieCategory>(), Ok(MovieCategory::Popular));
        assert!("trending".parse::<MovieCategory>().is_err());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        // Port 9 (discard) would fail loudly if a request were attempted.
        let config = TmdbConfig::default().with_api_base("http://127.0.0.1:9");
        let client = TmdbClient::new(config).expect("client builds without key");
        let err = client
            .movies_by_category(MovieCategory::Popular, 1)
            .await
            .expect_err("must fail fast");
        assert_eq!(err, TmdbError::MissingCredential);
        let err = client.search_movies("alien", 1).await.expect_err("fail fast");
        assert_eq!(err, TmdbError::MissingCredential);
    }
}
