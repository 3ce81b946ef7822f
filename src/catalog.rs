use std::sync::Arc;

use crate::cache::{
    fetcher, CachePolicy, KeepPrevious, QueryState, RequestCache, RequestKey, RevalidateEvent,
};
use crate::error::TmdbError;
use crate::models::{CastMember, CrewMember, Movie, MovieDetails, MoviesResponse, Video};
use crate::models::{CreditsResponse, VideosResponse};
use crate::tmdb::{MovieCategory, TmdbApi};

/// One page of movies as the pages consume it.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
    /// Page reported by the server, not the one requested.
    pub current_page: u32,
    pub is_loading: bool,
    pub error: Option<TmdbError>,
    pub key: Option<RequestKey>,
}

impl MovieList {
    fn from_state(key: Option<RequestKey>, state: QueryState<MoviesResponse>) -> Self {
        let QueryState {
            data,
            error,
            is_loading,
            ..
        } = state;
        match data {
            Some(page) => Self {
                movies: page.results,
                total_pages: page.total_pages,
                total_results: page.total_results,
                current_page: page.page,
                is_loading,
                error,
                key,
            },
            None => Self {
                movies: Vec::new(),
                total_pages: 0,
                total_results: 0,
                current_page: 1,
                is_loading,
                error,
                key,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub movie: Option<MovieDetails>,
    pub is_loading: bool,
    pub error: Option<TmdbError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieVideos {
    pub videos: Vec<Video>,
    pub is_loading: bool,
    pub error: Option<TmdbError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieCredits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub is_loading: bool,
    pub error: Option<TmdbError>,
}

/// The four home-page sections, first page each.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub popular: MovieList,
    pub top_rated: MovieList,
    pub upcoming: MovieList,
    pub now_playing: MovieList,
    pub is_loading: bool,
    pub has_errors: bool,
}

impl Dashboard {
    pub fn sections(&self) -> [(MovieCategory, &MovieList); 4] {
        [
            (MovieCategory::Popular, &self.popular),
            (MovieCategory::TopRated, &self.top_rated),
            (MovieCategory::Upcoming, &self.upcoming),
            (MovieCategory::NowPlaying, &self.now_playing),
        ]
    }
}

pub fn category_key(category: MovieCategory, page: u32) -> RequestKey {
    RequestKey::new(format!("movies/{}", category.as_path())).param(page)
}

pub fn details_key(id: Option<u32>) -> Option<RequestKey> {
    live_id(id).map(|id| RequestKey::new(format!("movie/{id}")))
}

pub fn videos_key(id: Option<u32>) -> Option<RequestKey> {
    live_id(id).map(|id| RequestKey::new(format!("movie/{id}/videos")))
}

pub fn credits_key(id: Option<u32>) -> Option<RequestKey> {
    live_id(id).map(|id| RequestKey::new(format!("movie/{id}/credits")))
}

/// `None` for a blank query, which keeps search disabled.
pub fn search_key(query: &str, page: u32) -> Option<RequestKey> {
    let query = query.trim();
    (!query.is_empty()).then(|| RequestKey::new("search/movie").param(query).param(page))
}

pub fn recommendations_key(id: Option<u32>, page: u32) -> Option<RequestKey> {
    live_id(id).map(|id| RequestKey::new(format!("movie/{id}/recommendations")).param(page))
}

pub fn similar_key(id: Option<u32>, page: u32) -> Option<RequestKey> {
    live_id(id).map(|id| RequestKey::new(format!("movie/{id}/similar")).param(page))
}

fn live_id(id: Option<u32>) -> Option<u32> {
    id.filter(|id| *id != 0)
}

/// Cached, deduplicated access to TMDB for the browsing screens.
///
/// Every method is a non-blocking render: it starts whatever request the key
/// needs and returns the state as it is now. Await [`Catalog::idle`] to let
/// in-flight work land, then call the method again.
#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn TmdbApi>,
    lists: RequestCache<MoviesResponse>,
    details: RequestCache<MovieDetails>,
    videos: RequestCache<VideosResponse>,
    credits: RequestCache<CreditsResponse>,
}

impl Catalog {
    pub fn new(api: Arc<dyn TmdbApi>, policy: CachePolicy) -> Self {
        Self {
            api,
            lists: RequestCache::new(policy),
            details: RequestCache::new(policy),
            videos: RequestCache::new(policy),
            credits: RequestCache::new(policy),
        }
    }

    pub fn movies_by_category(&self, category: MovieCategory, page: u32) -> MovieList {
        let key = category_key(category, page);
        let api = Arc::clone(&self.api);
        let state = self.lists.fetch(
            Some(key.clone()),
            fetcher(move || {
                let api = Arc::clone(&api);
                async move { api.movies_by_category(category, page).await }
            }),
        );
        MovieList::from_state(Some(key), state)
    }

    pub fn popular(&self, page: u32) -> MovieList {
        self.movies_by_category(MovieCategory::Popular, page)
    }

    pub fn top_rated(&self, page: u32) -> MovieList {
        self.movies_by_category(MovieCategory::TopRated, page)
    }

    pub fn upcoming(&self, page: u32) -> MovieList {
        self.movies_by_category(MovieCategory::Upcoming, page)
    }

    pub fn now_playing(&self, page: u32) -> MovieList {
        self.movies_by_category(MovieCategory::NowPlaying, page)
    }

    pub fn movie_details(&self, id: Option<u32>) -> MovieDetail {
        let key = details_key(id);
        let state = match live_id(id) {
            Some(id) => {
                let api = Arc::clone(&self.api);
                self.details.fetch(
                    key,
                    fetcher(move || {
                        let api = Arc::clone(&api);
                        async move { api.movie_details(id).await }
                    }),
                )
            }
            None => QueryState::idle(),
        };
        MovieDetail {
            movie: state.data,
            is_loading: state.is_loading,
            error: state.error,
        }
    }

    pub fn movie_videos(&self, id: Option<u32>) -> MovieVideos {
        let key = videos_key(id);
        let state = match live_id(id) {
            Some(id) => {
                let api = Arc::clone(&self.api);
                self.videos.fetch(
                    key,
                    fetcher(move || {
                        let api = Arc::clone(&api);
                        async move { api.movie_videos(id).await }
                    }),
                )
            }
            None => QueryState::idle(),
        };
        MovieVideos {
            videos: state.data.map(|v| v.results).unwrap_or_default(),
            is_loading: state.is_loading,
            error: state.error,
        }
    }

    pub fn movie_credits(&self, id: Option<u32>) -> MovieCredits {
        let key = credits_key(id);
        let state = match live_id(id) {
            Some(id) => {
                let api = Arc::clone(&self.api);
                self.credits.fetch(
                    key,
                    fetcher(move || {
                        let api = Arc::clone(&api);
                        async move { api.movie_credits(id).await }
                    }),
                )
            }
            None => QueryState::idle(),
        };
        let (cast, crew) = state
            .data
            .map(|c| (c.cast, c.crew))
            .unwrap_or_default();
        MovieCredits {
            cast,
            crew,
            is_loading: state.is_loading,
            error: state.error,
        }
    }

    /// Search keeps the previous results on screen while a new query loads.
    pub fn movie_search(
        &self,
        query: &str,
        page: u32,
        previous: &mut KeepPrevious<MoviesResponse>,
    ) -> MovieList {
        let key = search_key(query, page);
        let state = match &key {
            Some(_) => {
                let api = Arc::clone(&self.api);
                let query = query.trim().to_string();
                self.lists.fetch(
                    key.clone(),
                    fetcher(move || {
                        let api = Arc::clone(&api);
                        let query = query.clone();
                        async move { api.search_movies(&query, page).await }
                    }),
                )
            }
            None => QueryState::idle(),
        };
        let state = previous.apply(key.is_some(), state);
        MovieList::from_state(key, state)
    }

    pub fn movie_recommendations(&self, id: Option<u32>, page: u32) -> MovieList {
        let key = recommendations_key(id, page);
        let state = match live_id(id) {
            Some(id) => {
                let api = Arc::clone(&self.api);
                self.lists.fetch(
                    key.clone(),
                    fetcher(move || {
                        let api = Arc::clone(&api);
                        async move { api.movie_recommendations(id, page).await }
                    }),
                )
            }
            None => QueryState::idle(),
        };
        MovieList::from_state(key, state)
    }

    pub fn similar_movies(&self, id: Option<u32>, page: u32) -> MovieList {
        let key = similar_key(id, page);
        let state = match live_id(id) {
            Some(id) => {
                let api = Arc::clone(&self.api);
                self.lists.fetch(
                    key.clone(),
                    fetcher(move || {
                        let api = Arc::clone(&api);
                        async move { api.similar_movies(id, page).await }
                    }),
                )
            }
            None => QueryState::idle(),
        };
        MovieList::from_state(key, state)
    }

    pub fn categories(&self) -> Dashboard {
        let popular = self.popular(1);
        let top_rated = self.top_rated(1);
        let upcoming = self.upcoming(1);
        let now_playing = self.now_playing(1);
        let all = [&popular, &top_rated, &upcoming, &now_playing];
        let is_loading = all.iter().any(|l| l.is_loading);
        let has_errors = all.iter().any(|l| l.error.is_some());
        Dashboard {
            popular,
            top_rated,
            upcoming,
            now_playing,
            is_loading,
            has_errors,
        }
    }

    /// Waits until no request is in flight in any cache.
    pub async fn idle(&self) {
        tokio::join!(
            self.lists.wait_all(),
            self.details.wait_all(),
            self.videos.wait_all(),
            self.credits.wait_all(),
        );
    }

    /// Explicit user retry of a single key. Returns false for an unknown key.
    pub async fn mutate(&self, key: &RequestKey) -> bool {
        if self.lists.contains(key) {
            self.lists.mutate(key).await;
        } else if self.details.contains(key) {
            self.details.mutate(key).await;
        } else if self.videos.contains(key) {
            self.videos.mutate(key).await;
        } else if self.credits.contains(key) {
            self.credits.mutate(key).await;
        } else {
            return false;
        }
        true
    }

    pub fn reconnect(&self) -> usize {
        self.notify(RevalidateEvent::Reconnect)
    }

    pub fn focus(&self) -> usize {
        self.notify(RevalidateEvent::Focus)
    }

    fn notify(&self, event: RevalidateEvent) -> usize {
        self.lists.notify(event)
            + self.details.notify(event)
            + self.videos.notify(event)
            + self.credits.notify(event)
    }
}
