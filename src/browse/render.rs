use std::fmt;

use crate::browse::pager::PaginationView;
use crate::browse::views::{
    DetailState, DetailView, HomeView, ListingState, ListingView, MovieCardView, SearchState,
    SearchView, SectionState, SectionView, View,
};
use crate::format::format_count;

impl fmt::Display for MovieCardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>7}] {}", self.id, self.title)?;
        if !self.year.is_empty() {
            write!(f, " ({})", self.year)?;
        }
        write!(f, "  * {}", self.rating)
    }
}

impl fmt::Display for PaginationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prev = if self.has_prev { "< prev" } else { "      " };
        let next = if self.has_next { "next >" } else { "" };
        write!(
            f,
            "{prev}  Page {} of {}  {next}",
            self.current_page,
            format_count(u64::from(self.total_pages))
        )
    }
}

fn write_cards(f: &mut fmt::Formatter<'_>, cards: &[MovieCardView]) -> fmt::Result {
    for card in cards {
        writeln!(f, "  {card}")?;
    }
    Ok(())
}

impl fmt::Display for ListingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.category.title())?;
        writeln!(f, "{}", self.category.description())?;
        match &self.state {
            ListingState::Loading => writeln!(f, "Loading..."),
            ListingState::Failed(msg) => {
                writeln!(f, "Failed to load movies")?;
                writeln!(f, "{msg}")
            }
            ListingState::Empty => writeln!(f, "No movies found."),
            ListingState::Results { cards, pagination } => {
                write_cards(f, cards)?;
                if let Some(p) = pagination {
                    writeln!(f, "{p}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SearchView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Search Movies ==")?;
        if !self.query.is_empty() {
            writeln!(f, "Search Results for \"{}\"", self.query)?;
        }
        match &self.state {
            SearchState::NoQuery => {
                writeln!(f, "Search for Movies")?;
                writeln!(f, "Enter a movie title with 'search <title>' to find your favorite films.")
            }
            SearchState::Loading => writeln!(f, "Searching..."),
            SearchState::Failed(msg) => {
                writeln!(f, "Search failed")?;
                writeln!(f, "{msg}")
            }
            SearchState::NoResults => {
                writeln!(f, "No movies found")?;
                writeln!(f, "Try adjusting your search terms or check for typos. ('clear' resets)")
            }
            SearchState::Results {
                cards,
                total_results,
                pagination,
                refreshing,
            } => {
                if *refreshing {
                    writeln!(f, "Updating results...")?;
                } else if *total_results > 0 {
                    writeln!(f, "Found {} movies", format_count(u64::from(*total_results)))?;
                }
                write_cards(f, cards)?;
                if let Some(p) = pagination {
                    writeln!(f, "{p}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- {} --", self.title)?;
        match (&self.more, &self.state) {
            (Some(category), SectionState::Movies(_) | SectionState::Empty) => {
                writeln!(f, "  (view all: {})", category.slug())?
            }
            _ => writeln!(f)?,
        }
        match &self.state {
            SectionState::Loading => writeln!(f, "  Loading..."),
            SectionState::Failed(msg) => {
                writeln!(f, "  Failed to load {}", self.title.to_lowercase())?;
                writeln!(f, "  {msg}")
            }
            SectionState::Empty => writeln!(f, "  No movies found in this category."),
            SectionState::Movies(cards) => write_cards(f, cards),
        }
    }
}

impl fmt::Display for HomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Discover Movies ==")?;
        if let Some(banner) = self.banner {
            writeln!(f, "! {banner}")?;
        }
        for section in &self.sections {
            writeln!(f)?;
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let movie = match &self.state {
            DetailState::Loading => return writeln!(f, "Loading movie {}...", self.id),
            DetailState::Failed(msg) => {
                writeln!(f, "Failed to load movie details")?;
                writeln!(f, "{msg}")?;
                return writeln!(f, "('home' to return)");
            }
            DetailState::Movie(movie) => movie,
        };

        writeln!(f, "== {} ==", movie.title)?;
        if let Some(tagline) = &movie.tagline {
            writeln!(f, "\"{tagline}\"")?;
        }
        write!(f, "{}", movie.release_date)?;
        if let Some(runtime) = &movie.runtime {
            write!(f, " | {runtime}")?;
        }
        writeln!(f, " | * {} ({} votes)", movie.rating, movie.vote_count)?;
        if !movie.genres.is_empty() {
            writeln!(f, "Genres: {}", movie.genres.join(", "))?;
        }
        if let Some(overview) = &movie.overview {
            writeln!(f)?;
            writeln!(f, "{overview}")?;
        }
        if let Some(trailer) = &movie.trailer_url {
            writeln!(f)?;
            writeln!(f, "Trailer: {trailer}")?;
        }
        if !movie.cast.is_empty() {
            writeln!(f)?;
            writeln!(f, "Cast:")?;
            for actor in &movie.cast {
                writeln!(f, "  {} as {}  {}", actor.name, actor.character, actor.profile_url)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Poster: {}", movie.poster_url)?;
        if let Some(backdrop) = &movie.backdrop_url {
            writeln!(f, "Backdrop: {backdrop}")?;
        }
        if let Some(director) = &movie.director {
            writeln!(f, "Director: {director}")?;
        }
        if !movie.producers.is_empty() {
            writeln!(f, "Producers: {}", movie.producers.join(", "))?;
        }
        writeln!(f, "Status: {}", movie.status)?;
        writeln!(f, "Original Language: {}", movie.original_language)?;
        if let Some(budget) = &movie.budget {
            writeln!(f, "Budget: {budget}")?;
        }
        if let Some(revenue) = &movie.revenue {
            writeln!(f, "Revenue: {revenue}")?;
        }
        if let Some(homepage) = &movie.homepage {
            writeln!(f, "Official Website: {homepage}")?;
        }
        if let Some(similar) = &movie.similar {
            writeln!(f)?;
            write!(f, "{similar}")?;
        }
        Ok(())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Home(v) => fmt::Display::fmt(v, f),
            View::Listing(v) => fmt::Display::fmt(v, f),
            View::Search(v) => fmt::Display::fmt(v, f),
            View::Detail(v) => fmt::Display::fmt(v, f),
        }
    }
}
