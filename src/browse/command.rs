use std::str::FromStr;

use crate::tmdb::MovieCategory;

pub const HELP: &str = "\
Commands:
  home                                  curated sections
  popular | top-rated | upcoming | now-playing [page]
  next, prev                            page through the current listing
  search <title>                        search movies (clear to reset)
  movie <id>                            movie details
  retry                                 re-request what is on screen
  reconnect                             revalidate everything cached
  focus                                 window-focus revalidation (disabled)
  help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Home,
    Category {
        category: MovieCategory,
        page: Option<u32>,
    },
    Next,
    Prev,
    Search(String),
    Clear,
    Movie(u32),
    Retry,
    Reconnect,
    Focus,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "" => return Err("empty command".to_string()),
            "home" | "h" => Command::Home,
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "search" | "s" | "/" => Command::Search(rest.to_string()),
            "clear" => Command::Clear,
            "movie" | "m" => {
                let id = rest
                    .parse::<u32>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| format!("'{rest}' is not a movie id"))?;
                Command::Movie(id)
            }
            "retry" | "r" => Command::Retry,
            "reconnect" => Command::Reconnect,
            "focus" => Command::Focus,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                let category = other
                    .parse::<MovieCategory>()
                    .map_err(|_| format!("unknown command '{other}', try 'help'"))?;
                let page = match rest {
                    "" => None,
                    p => Some(
                        p.parse::<u32>()
                            .ok()
                            .filter(|p| *p > 0)
                            .ok_or_else(|| format!("'{p}' is not a page number"))?,
                    ),
                };
                Command::Category { category, page }
            }
        };
        Ok(command)
    }
}
