use serde::{Deserialize, Serialize};

pub const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    /// `YYYY-MM-DD`, or empty when TMDB has no date yet.
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: Movie,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub status: String,
    pub homepage: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub tagline: Option<String>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
}

impl Video {
    pub fn embed_url(&self) -> String {
        format!("{YOUTUBE_EMBED_BASE}/{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub results: Vec<Video>,
}

impl VideosResponse {
    pub fn trailer(&self) -> Option<&Video> {
        select_trailer(&self.results)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsResponse {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl CreditsResponse {
    pub fn director(&self) -> Option<&CrewMember> {
        find_director(&self.crew)
    }

    pub fn producers(&self) -> Vec<&CrewMember> {
        top_producers(&self.crew)
    }
}

/// TMDB's page envelope; `results` keeps server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

pub type MoviesResponse = Paginated<Movie>;

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub status_code: Option<i32>,
    pub status_message: Option<String>,
    pub success: Option<bool>,
}

const MAX_PRODUCERS: usize = 3;

pub fn find_director(crew: &[CrewMember]) -> Option<&CrewMember> {
    crew.iter().find(|c| c.job == "Director")
}

pub fn top_producers(crew: &[CrewMember]) -> Vec<&CrewMember> {
    crew.iter()
        .filter(|c| c.job == "Producer")
        .take(MAX_PRODUCERS)
        .collect()
}

/// YouTube trailer first, then any YouTube clip.
pub fn select_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
        .or_else(|| videos.iter().find(|v| v.site == "YouTube"))
}
