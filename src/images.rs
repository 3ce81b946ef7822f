use std::fmt;

use crate::config::TmdbConfig;

/// Local asset shown when TMDB has no image for an entity.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-movie.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosterSize {
    W185,
    W342,
    #[default]
    W500,
    W780,
    Original,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackdropSize {
    W300,
    W780,
    #[default]
    W1280,
    Original,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileSize {
    W45,
    #[default]
    W185,
    H632,
    Original,
}

/// A TMDB size token such as `w500`.
pub trait SizeToken: Copy {
    fn token(&self) -> &'static str;
}

impl SizeToken for PosterSize {
    fn token(&self) -> &'static str {
        match self {
            PosterSize::W185 => "w185",
            PosterSize::W342 => "w342",
            PosterSize::W500 => "w500",
            PosterSize::W780 => "w780",
            PosterSize::Original => "original",
        }
    }
}

impl SizeToken for BackdropSize {
    fn token(&self) -> &'static str {
        match self {
            BackdropSize::W300 => "w300",
            BackdropSize::W780 => "w780",
            BackdropSize::W1280 => "w1280",
            BackdropSize::Original => "original",
        }
    }
}

impl SizeToken for ProfileSize {
    fn token(&self) -> &'static str {
        match self {
            ProfileSize::W45 => "w45",
            ProfileSize::W185 => "w185",
            ProfileSize::H632 => "h632",
            ProfileSize::Original => "original",
        }
    }
}

macro_rules! display_token {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        })*
    };
}

display_token!(PosterSize, BackdropSize, ProfileSize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &TmdbConfig) -> Self {
        Self::new(config.image_base.clone())
    }

    pub fn image(&self, path: Option<&str>, size: impl SizeToken) -> String {
        match path.filter(|p| !p.is_empty()) {
            Some(p) => format!("{}/{}{}", self.base, size.token(), p),
            None => PLACEHOLDER_IMAGE.to_string(),
        }
    }

    pub fn poster(&self, path: Option<&str>, size: PosterSize) -> String {
        self.image(path, size)
    }

    pub fn backdrop(&self, path: Option<&str>, size: BackdropSize) -> String {
        self.image(path, size)
    }

    pub fn profile(&self, path: Option<&str>, size: ProfileSize) -> String {
        self.image(path, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_path_uses_placeholder() {
        let urls = ImageUrls::new("https://image.tmdb.org/t/p");
        assert_eq!(urls.poster(None, PosterSize::default()), PLACEHOLDER_IMAGE);
        assert_eq!(urls.profile(Some(""), ProfileSize::default()), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn joins_base_size_and_path() {
        let urls = ImageUrls::new("https://image.tmdb.org/t/p/");
        assert_eq!(
            urls.poster(Some("/abc.jpg"), PosterSize::W500),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            urls.backdrop(Some("/b.jpg"), BackdropSize::default()),
            "https://image.tmdb.org/t/p/w1280/b.jpg"
        );
        assert_eq!(
            urls.profile(Some("/p.jpg"), ProfileSize::H632),
            "https://image.tmdb.org/t/p/h632/p.jpg"
        );
    }

    #[test]
    fn default_sizes_match_tmdb_conventions() {
        assert_eq!(PosterSize::default().to_string(), "w500");
        assert_eq!(BackdropSize::default().to_string(), "w1280");
        assert_eq!(ProfileSize::default().to_string(), "w185");
    }
}
