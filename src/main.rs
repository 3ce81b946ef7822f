use std::env;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use cinescope::browse::{Browser, Command, Flow};
use cinescope::images::ImageUrls;
use cinescope::{CachePolicy, Catalog, TmdbClient, TmdbConfig};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let config = TmdbConfig::from_env();
    info!(api_base = %config.api_base, image_base = %config.image_base, "starting cinescope");
    let images = ImageUrls::from_config(&config);
    let configured = config.has_credential();
    let client = TmdbClient::new(config).context("failed to build TMDB client")?;
    let catalog = Catalog::new(Arc::new(client), CachePolicy::default());
    let mut browser = Browser::new(catalog, images, configured);
    let mut stdout = io::stdout();

    let initial = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let first = if initial.trim().is_empty() {
        Command::Home
    } else {
        initial
            .parse::<Command>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("invalid initial command")?
    };
    if browser.dispatch(first, &mut stdout).await? == Flow::Quit {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, exiting");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if browser.dispatch(command, &mut stdout).await? == Flow::Quit {
                    break;
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}
