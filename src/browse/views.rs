//! Screen view-models built from the catalog hooks.
//!
//! Views are plain data: they decide which state a screen is in and carry the
//! formatted strings and image URLs it shows. Rendering lives in `render`.

use crate::browse::pager::{Pager, PaginationView};
use crate::catalog::{Dashboard, MovieCredits, MovieDetail, MovieList, MovieVideos};
use crate::format::{
    format_count, format_money, format_release_date, format_runtime, format_vote_average,
    year_from_date,
};
use crate::images::{BackdropSize, ImageUrls, PosterSize, ProfileSize};
use crate::models::{find_director, select_trailer, top_producers, Movie};
use crate::tmdb::MovieCategory;

pub const SECTION_LIMIT: usize = 20;
pub const CAST_LIMIT: usize = 12;

pub const CONFIG_BANNER: &str =
    "TMDB API key is not configured. Set TMDB_API_KEY in your environment or .env file.";
pub const HOME_ERROR_BANNER: &str =
    "Having trouble loading movies? Make sure your TMDB API key is configured.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieCardView {
    pub id: u32,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub poster_url: String,
}

impl MovieCardView {
    pub fn new(movie: &Movie, images: &ImageUrls) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            year: year_from_date(&movie.release_date),
            rating: format_vote_average(movie.vote_average),
            poster_url: images.poster(movie.poster_path.as_deref(), PosterSize::default()),
        }
    }
}

fn cards(movies: &[Movie], images: &ImageUrls) -> Vec<MovieCardView> {
    movies.iter().map(|m| MovieCardView::new(m, images)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    Loading,
    Failed(String),
    Empty,
    Results {
        cards: Vec<MovieCardView>,
        pagination: Option<PaginationView>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
    pub category: MovieCategory,
    pub state: ListingState,
}

impl ListingView {
    pub fn new(category: MovieCategory, list: &MovieList, pager: &Pager, images: &ImageUrls) -> Self {
        let state = if let Some(err) = &list.error {
            ListingState::Failed(err.to_string())
        } else if list.is_loading {
            ListingState::Loading
        } else if list.movies.is_empty() {
            ListingState::Empty
        } else {
            ListingState::Results {
                cards: cards(&list.movies, images),
                pagination: PaginationView::new(pager, list),
            }
        };
        Self { category, state }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    NoQuery,
    Loading,
    Failed(String),
    NoResults,
    Results {
        cards: Vec<MovieCardView>,
        total_results: u32,
        pagination: Option<PaginationView>,
        /// Previous results shown while the new query loads.
        refreshing: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub query: String,
    pub state: SearchState,
}

impl SearchView {
    pub fn new(query: &str, list: &MovieList, pager: &Pager, images: &ImageUrls) -> Self {
        let query = query.trim();
        let state = if query.is_empty() || list.key.is_none() {
            SearchState::NoQuery
        } else if let Some(err) = &list.error {
            SearchState::Failed(err.to_string())
        } else if list.is_loading && list.movies.is_empty() {
            SearchState::Loading
        } else if list.movies.is_empty() {
            SearchState::NoResults
        } else {
            SearchState::Results {
                cards: cards(&list.movies, images),
                total_results: list.total_results,
                pagination: PaginationView::new(pager, list),
                refreshing: list.is_loading,
            }
        };
        Self {
            query: query.to_string(),
            state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionState {
    Loading,
    Failed(String),
    Empty,
    Movies(Vec<MovieCardView>),
}

impl SectionState {
    fn from_list(list: &MovieList, images: &ImageUrls) -> Self {
        if let Some(err) = &list.error {
            SectionState::Failed(err.to_string())
        } else if list.is_loading {
            SectionState::Loading
        } else if list.movies.is_empty() {
            SectionState::Empty
        } else {
            let shown = &list.movies[..list.movies.len().min(SECTION_LIMIT)];
            SectionState::Movies(cards(shown, images))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub title: String,
    /// Listing command for "view all", absent for sections without one.
    pub more: Option<MovieCategory>,
    pub state: SectionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub banner: Option<&'static str>,
    pub sections: Vec<SectionView>,
    pub is_loading: bool,
}

impl HomeView {
    pub fn new(dashboard: &Dashboard, images: &ImageUrls) -> Self {
        let sections = dashboard
            .sections()
            .into_iter()
            .map(|(category, list)| SectionView {
                title: category.section_title().to_string(),
                more: Some(category),
                state: SectionState::from_list(list, images),
            })
            .collect();
        Self {
            banner: (dashboard.has_errors && !dashboard.is_loading).then_some(HOME_ERROR_BANNER),
            sections,
            is_loading: dashboard.is_loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastView {
    pub name: String,
    pub character: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieView {
    pub id: u32,
    pub title: String,
    pub tagline: Option<String>,
    pub release_date: String,
    pub runtime: Option<String>,
    pub rating: String,
    pub vote_count: String,
    pub genres: Vec<String>,
    pub overview: Option<String>,
    pub trailer_url: Option<String>,
    pub cast: Vec<CastView>,
    pub poster_url: String,
    pub backdrop_url: Option<String>,
    pub director: Option<String>,
    pub producers: Vec<String>,
    pub status: String,
    pub original_language: String,
    pub budget: Option<String>,
    pub revenue: Option<String>,
    pub homepage: Option<String>,
    pub similar: Option<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Failed(String),
    Movie(Box<MovieView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: u32,
    pub state: DetailState,
}

/// Everything the detail screen reads for one movie.
pub struct DetailParts<'a> {
    pub detail: &'a MovieDetail,
    pub videos: &'a MovieVideos,
    pub credits: &'a MovieCredits,
    pub similar: &'a MovieList,
}

impl DetailView {
    pub fn new(id: u32, parts: DetailParts<'_>, images: &ImageUrls) -> Self {
        let DetailParts {
            detail,
            videos,
            credits,
            similar,
        } = parts;
        let loading = detail.is_loading || videos.is_loading || credits.is_loading;
        let state = match (&detail.error, &detail.movie) {
            (Some(err), _) => DetailState::Failed(err.to_string()),
            (None, Some(movie)) if !loading => {
                let summary = &movie.summary;
                let similar = (!similar.movies.is_empty()).then(|| SectionView {
                    title: "Similar Movies".to_string(),
                    more: None,
                    state: SectionState::from_list(similar, images),
                });
                DetailState::Movie(Box::new(MovieView {
                    id: summary.id,
                    title: summary.title.clone(),
                    tagline: movie.tagline.clone().filter(|t| !t.trim().is_empty()),
                    release_date: format_release_date(&summary.release_date),
                    runtime: movie
                        .runtime
                        .filter(|m| *m > 0)
                        .map(|m| format_runtime(Some(m))),
                    rating: format_vote_average(summary.vote_average),
                    vote_count: format_count(summary.vote_count),
                    genres: movie.genres.iter().map(|g| g.name.clone()).collect(),
                    overview: Some(summary.overview.clone()).filter(|o| !o.trim().is_empty()),
                    trailer_url: select_trailer(&videos.videos).map(|v| v.embed_url()),
                    cast: credits
                        .cast
                        .iter()
                        .take(CAST_LIMIT)
                        .map(|c| CastView {
                            name: c.name.clone(),
                            character: c.character.clone(),
                            profile_url: images
                                .profile(c.profile_path.as_deref(), ProfileSize::default()),
                        })
                        .collect(),
                    poster_url: images
                        .poster(summary.poster_path.as_deref(), PosterSize::default()),
                    backdrop_url: summary
                        .backdrop_path
                        .as_deref()
                        .filter(|p| !p.is_empty())
                        .map(|p| images.backdrop(Some(p), BackdropSize::default())),
                    director: find_director(&credits.crew).map(|c| c.name.clone()),
                    producers: top_producers(&credits.crew)
                        .into_iter()
                        .map(|c| c.name.clone())
                        .collect(),
                    status: movie.status.clone(),
                    original_language: summary.original_language.to_uppercase(),
                    budget: (movie.budget > 0).then(|| format_money(movie.budget)),
                    revenue: (movie.revenue > 0).then(|| format_money(movie.revenue)),
                    homepage: movie.homepage.clone().filter(|h| !h.trim().is_empty()),
                    similar,
                }))
            }
            _ => DetailState::Loading,
        };
        Self { id, state }
    }
}

/// What a screen shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home(HomeView),
    Listing(ListingView),
    Search(SearchView),
    Detail(DetailView),
}

impl View {
    pub fn is_loading(&self) -> bool {
        match self {
            View::Home(home) => home.is_loading,
            View::Listing(listing) => matches!(listing.state, ListingState::Loading),
            View::Search(search) => match &search.state {
                SearchState::Loading => true,
                SearchState::Results { refreshing, .. } => *refreshing,
                _ => false,
            },
            View::Detail(detail) => matches!(detail.state, DetailState::Loading),
        }
    }
}
