use std::io::{self, Write};

use tracing::{debug, info};

use crate::browse::command::{Command, HELP};
use crate::browse::pager::Pager;
use crate::browse::views::{
    DetailParts, DetailView, HomeView, ListingView, SearchView, View, CONFIG_BANNER,
};
use crate::cache::{KeepPrevious, RequestKey};
use crate::catalog::{
    category_key, credits_key, details_key, search_key, similar_key, videos_key, Catalog,
};
use crate::images::ImageUrls;
use crate::models::MoviesResponse;
use crate::tmdb::MovieCategory;

#[derive(Debug, Clone)]
pub enum Screen {
    Home,
    Listing {
        category: MovieCategory,
        pager: Pager,
    },
    Search {
        query: String,
        pager: Pager,
        previous: KeepPrevious<MoviesResponse>,
    },
    Movie(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal navigator over the catalog screens.
pub struct Browser {
    catalog: Catalog,
    images: ImageUrls,
    credential_configured: bool,
    screen: Screen,
}

impl Browser {
    pub fn new(catalog: Catalog, images: ImageUrls, credential_configured: bool) -> Self {
        Self {
            catalog,
            images,
            credential_configured,
            screen: Screen::Home,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Renders the current screen, starting any request it needs.
    pub fn view(&mut self) -> View {
        let images = &self.images;
        match &mut self.screen {
            Screen::Home => View::Home(HomeView::new(&self.catalog.categories(), images)),
            Screen::Listing { category, pager } => {
                let list = self.catalog.movies_by_category(*category, pager.page());
                pager.observe(&list);
                View::Listing(ListingView::new(*category, &list, pager, images))
            }
            Screen::Search {
                query,
                pager,
                previous,
            } => {
                let list = self.catalog.movie_search(query, pager.page(), previous);
                pager.observe(&list);
                View::Search(SearchView::new(query, &list, pager, images))
            }
            Screen::Movie(id) => {
                let id = Some(*id);
                let detail = self.catalog.movie_details(id);
                let videos = self.catalog.movie_videos(id);
                let credits = self.catalog.movie_credits(id);
                let similar = self.catalog.similar_movies(id, 1);
                View::Detail(DetailView::new(
                    id.unwrap_or_default(),
                    DetailParts {
                        detail: &detail,
                        videos: &videos,
                        credits: &credits,
                        similar: &similar,
                    },
                    images,
                ))
            }
        }
    }

    /// Cache keys the current screen reads.
    pub fn screen_keys(&self) -> Vec<RequestKey> {
        match &self.screen {
            Screen::Home => MovieCategory::ALL
                .iter()
                .map(|c| category_key(*c, 1))
                .collect(),
            Screen::Listing { category, pager } => vec![category_key(*category, pager.page())],
            Screen::Search { query, pager, .. } => {
                search_key(query, pager.page()).into_iter().collect()
            }
            Screen::Movie(id) => {
                let id = Some(*id);
                [
                    details_key(id),
                    videos_key(id),
                    credits_key(id),
                    similar_key(id, 1),
                ]
                .into_iter()
                .flatten()
                .collect()
            }
        }
    }

    /// Writes the current screen. A loading screen gets a first frame, then
    /// the settled one once in-flight requests have landed.
    pub async fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let view = self.view();
        self.write_frame(out, &view)?;
        if view.is_loading() {
            self.catalog.idle().await;
            let settled = self.view();
            self.write_frame(out, &settled)?;
        }
        out.flush()
    }

    fn write_frame<W: Write>(&self, out: &mut W, view: &View) -> io::Result<()> {
        if !self.credential_configured {
            writeln!(out, "! {CONFIG_BANNER}")?;
        }
        write!(out, "{view}")?;
        writeln!(out)
    }

    pub async fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        debug!(command = ?command, "dispatching command");
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Command::Home => self.screen = Screen::Home,
            Command::Category { category, page } => {
                self.screen = Screen::Listing {
                    category,
                    pager: Pager::at(page.unwrap_or(1)),
                }
            }
            Command::Movie(id) => self.screen = Screen::Movie(id),
            Command::Search(terms) => {
                let terms = terms.trim();
                if terms.is_empty() {
                    writeln!(out, "Enter a movie title to search.")?;
                    return Ok(Flow::Continue);
                }
                let previous = match &mut self.screen {
                    Screen::Search { previous, .. } => std::mem::take(previous),
                    _ => KeepPrevious::new(),
                };
                self.screen = Screen::Search {
                    query: terms.to_string(),
                    pager: Pager::default(),
                    previous,
                };
            }
            Command::Clear => {
                self.screen = Screen::Search {
                    query: String::new(),
                    pager: Pager::default(),
                    previous: KeepPrevious::new(),
                }
            }
            Command::Next | Command::Prev => {
                let pager = match &mut self.screen {
                    Screen::Listing { pager, .. } | Screen::Search { pager, .. } => pager,
                    _ => {
                        writeln!(out, "Nothing to page through here.")?;
                        return Ok(Flow::Continue);
                    }
                };
                if !pager.is_live() {
                    writeln!(out, "No pages to move through on this screen.")?;
                    return Ok(Flow::Continue);
                }
                let moved = if command == Command::Next {
                    pager.next()
                } else {
                    pager.prev()
                };
                if !moved {
                    let edge = if command == Command::Next { "last" } else { "first" };
                    writeln!(out, "Already on the {edge} page.")?;
                    return Ok(Flow::Continue);
                }
            }
            Command::Retry => {
                for key in self.screen_keys() {
                    if self.catalog.mutate(&key).await {
                        debug!(key = %key, "retried");
                    }
                }
            }
            Command::Reconnect => {
                let revalidated = self.catalog.reconnect();
                info!(revalidated, "network reconnected, revalidating cached requests");
                writeln!(out, "Revalidating {revalidated} cached request(s).")?;
            }
            Command::Focus => {
                let revalidated = self.catalog.focus();
                writeln!(out, "Focus revalidated {revalidated} request(s).")?;
                return Ok(Flow::Continue);
            }
        }
        self.render(out).await?;
        Ok(Flow::Continue)
    }
}
