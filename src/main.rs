mod config;
mod content_loader;
mod markdown;
mod models;
mod page;
mod render;
mod site;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::site::{build_site, BuildOptions};

/// Builds the portfolio landing page and post pages into static HTML.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `layout.html` and `posts/`
    #[arg(long, default_value = "content", env = "BLOG_CONTENT_DIR")]
    content_dir: PathBuf,

    /// Where the rendered site is written
    #[arg(long, default_value = "out", env = "BLOG_OUTPUT_DIR")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Variables already in the environment take precedence over `.env`.
    let dotenv_path = dotenv::dotenv().ok();

    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = dotenv_path {
        debug!(path = %path.display(), "loaded .env");
    }

    let args = Args::parse();
    info!(content = %args.content_dir.display(), out = %args.output_dir.display(), "building site");

    let options = BuildOptions {
        content_dir: args.content_dir,
        output_dir: args.output_dir,
    };
    let report = build_site(&options).context("site build failed")?;
    if report.slug_collisions > 0 {
        warn!(
            collisions = report.slug_collisions,
            "some post pages overwrote each other"
        );
    }
    Ok(())
}
