//! Fetch one TMDB endpoint through the typed client and print it with the
//! values the browsing screens derive from it.
//! Usage:
//!   cargo run --bin tmdb_probe -- movie <tmdb_id>
//!   cargo run --bin tmdb_probe -- list <popular|top-rated|upcoming|now-playing> [page]
//!   cargo run --bin tmdb_probe -- search <page> <query...>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinescope::format::{format_money, format_release_date, format_runtime, year_from_date};
use cinescope::images::{ImageUrls, PosterSize};
use cinescope::models::MoviesResponse;
use cinescope::{MovieCategory, TmdbApi, TmdbClient, TmdbConfig};
use dotenvy::dotenv;
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run --bin tmdb_probe -- movie <tmdb_id>");
        eprintln!("       cargo run --bin tmdb_probe -- list <category> [page]");
        eprintln!("       cargo run --bin tmdb_probe -- search <page> <query...>");
        std::process::exit(1);
    }

    let config = TmdbConfig::from_env();
    let images = ImageUrls::from_config(&config);
    let client = TmdbClient::new(config).context("failed to build TMDB client")?;

    match args[1].as_str() {
        "movie" => {
            let id: u32 = args[2].parse().context("tmdb_id must be an integer")?;
            probe_movie(&client, &images, id).await?
        }
        "list" => {
            let category: MovieCategory = args[2].parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let page = match args.get(3) {
                Some(p) => p.parse().context("page must be an integer")?,
                None => 1,
            };
            let list = client.movies_by_category(category, page).await?;
            print_list(&list, &images)?
        }
        "search" => {
            let page: u32 = args[2].parse().context("page must be an integer")?;
            let query = args[3..].join(" ");
            let query = query.trim();
            if query.is_empty() {
                anyhow::bail!("search needs a non-empty query");
            }
            let list = client.search_movies(query, page).await?;
            print_list(&list, &images)?
        }
        other => anyhow::bail!("unknown probe '{}', expected movie, list or search", other),
    }
    Ok(())
}

async fn probe_movie(client: &TmdbClient, images: &ImageUrls, id: u32) -> Result<()> {
    let (details, videos, credits) = tokio::try_join!(
        client.movie_details(id),
        client.movie_videos(id),
        client.movie_credits(id),
    )?;
    let summary = &details.summary;

    let output = json!({
        "id": summary.id,
        "title": summary.title,
        "release_date": format_release_date(&summary.release_date),
        "year": year_from_date(&summary.release_date),
        "runtime": format_runtime(details.runtime),
        "budget": (details.budget > 0).then(|| format_money(details.budget)),
        "revenue": (details.revenue > 0).then(|| format_money(details.revenue)),
        "language": summary.original_language.to_uppercase(),
        "genres": details.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
        "director": credits.director().map(|c| c.name.as_str()),
        "producers": credits.producers().iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "trailer": videos.trailer().map(|v| v.embed_url()),
        "poster": images.poster(summary.poster_path.as_deref(), PosterSize::default()),
        "raw": details,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_list(list: &MoviesResponse, images: &ImageUrls) -> Result<()> {
    let output = json!({
        "page": list.page,
        "total_pages": list.total_pages,
        "total_results": list.total_results,
        "results": list.results.iter().map(|m| json!({
            "id": m.id,
            "title": m.title,
            "year": year_from_date(&m.release_date),
            "poster": images.poster(m.poster_path.as_deref(), PosterSize::default()),
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
